//! Session against the integration API: login, device discovery, data refresh
use log::{debug, info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::api::{Api, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::device::Device;
use crate::errors::{Error, Result};
use crate::models::{default_user_settings, DeviceMetadata, UserSettings};
use crate::utils::format_datetime;

/// First attempt plus one retry after logging in again
const MAX_ATTEMPTS: usize = 2;

pub struct Client<T: Transport = HttpTransport> {
    config: ClientConfig,
    api: Api<T>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    devices: HashMap<String, Device>,
    user_settings: UserSettings,
}

impl Client<HttpTransport> {
    /// Client with default settings over a caller-owned reqwest session
    pub fn new<S: Into<String>>(api_key: S, websession: reqwest::Client) -> Self {
        Self::with_config(ClientConfig::new(api_key), websession)
    }

    pub fn with_config(config: ClientConfig, websession: reqwest::Client) -> Self {
        Self::with_transport(config, HttpTransport::new(websession))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Client {
            config,
            api: Api::new(transport),
            access_token: None,
            refresh_token: None,
            devices: HashMap::new(),
            user_settings: default_user_settings(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn user_settings(&self) -> &UserSettings {
        &self.user_settings
    }

    pub fn set_user_settings(&mut self, user_settings: UserSettings) {
        self.user_settings = user_settings;
    }

    /// The live device collection, keyed by serial number
    pub fn get_devices(&self) -> &HashMap<String, Device> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut HashMap<String, Device> {
        &mut self.devices
    }

    /// Exchange the API key for tokens
    ///
    /// A response without an access token leaves the session anonymous.
    pub async fn login(&mut self) -> Result<()> {
        let token = self.api.generate_token(self.config.api_key()).await?;

        match token {
            Some(token) => {
                if self.config.debug {
                    debug!(
                        "Token response: type={:?}, expires_in={:?}",
                        token.token_type, token.expires_in
                    );
                }
                self.api.set_bearer_token(Some(token.access_token.clone()));
                self.access_token = Some(token.access_token);
                self.refresh_token = token.refresh_token;
                info!("Logged in to the integration API");
            }
            None => {
                warn!("Login returned no access token");
                self.access_token = None;
                self.refresh_token = None;
                self.api.set_bearer_token(None);
            }
        }

        Ok(())
    }

    /// Rebuild the device collection from the account's device list
    pub async fn setup_devices(&mut self) -> Result<()> {
        let mut attempt = 1;
        let entries = loop {
            match self.api.get_device_list().await {
                Err(e) if e.is_auth_failure() && attempt < MAX_ATTEMPTS => {
                    warn!("Device list request rejected ({}), logging in again", e);
                    self.login().await?;
                    attempt += 1;
                }
                result => break result?,
            }
        };

        if self.config.debug {
            debug!("Device list: {:?}", entries);
        }

        self.devices = build_devices(entries);
        info!("Found {} devices", self.devices.len());

        Ok(())
    }

    /// Fetch the latest samples for one device and average them into it
    pub async fn get_latest_data(&mut self, serial_number: &str) -> Result<()> {
        if !self.devices.contains_key(serial_number) {
            return Err(Error::DeviceNotFound(serial_number.to_string()));
        }

        let mode = self.config.mode;
        let limit = self.config.limit;

        let mut attempt = 1;
        let samples = loop {
            match self.api.get_device_data(serial_number, mode, limit).await {
                Err(e) if e.is_auth_failure() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        "Data request for {} rejected ({}), logging in again",
                        serial_number, e
                    );
                    self.login().await?;
                    attempt += 1;
                }
                result => break result?,
            }
        };

        let Some(samples) = samples else {
            warn!("No data returned for {}, keeping previous readings", serial_number);
            return Ok(());
        };

        if self.config.debug {
            debug!("Samples for {}: {:?}", serial_number, samples);
        }

        if samples.is_empty() {
            debug!("Empty sample batch for {}", serial_number);
            return Ok(());
        }

        let device = self
            .devices
            .get_mut(serial_number)
            .ok_or_else(|| Error::DeviceNotFound(serial_number.to_string()))?;
        device.update_data(&samples, &self.user_settings);

        match device.last_updated() {
            Some(at) => debug!(
                "Updated {} from {} samples, latest at {}",
                serial_number,
                samples.len(),
                format_datetime(&at)
            ),
            None => debug!("Updated {} from {} samples", serial_number, samples.len()),
        }

        Ok(())
    }
}

/// One record per serial number, first occurrence wins
fn build_devices(entries: Vec<DeviceMetadata>) -> HashMap<String, Device> {
    let mut devices = HashMap::new();

    for metadata in entries {
        match devices.entry(metadata.serial_number.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(Device::new(metadata));
            }
            Entry::Occupied(_) => {
                warn!(
                    "Duplicate serial number {} in device list, keeping the first",
                    metadata.serial_number
                );
            }
        }
    }

    devices
}
