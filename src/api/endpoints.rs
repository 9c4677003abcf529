//! Named calls against the integration API
use log::debug;
use reqwest::Method;
use serde_json::Value;

use crate::api::transport::{Form, Transport};
use crate::errors::{Error, Result};
use crate::models::{DeviceMetadata, Mode, Sample, TokenResponse};

pub const BASE_URL: &str = "https://api.uhooinc.com/integration";

const GENERATE_TOKEN: &str = "generatetoken";
const DEVICE_LIST: &str = "getdeviceslist";
const DEVICE_DATA: &str = "getdata";

fn endpoint_url(path: &str) -> String {
    format!("{}/{}", BASE_URL, path)
}

/// Null, or a blank non-JSON body
fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub struct Api<T: Transport> {
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T) -> Self {
        Api { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.transport.set_bearer_token(token);
    }

    async fn post(&self, path: &str, data: Option<Form>) -> Result<Value> {
        self.transport
            .request(Method::POST, BASE_URL, path, data)
            .await
    }

    /// Exchange an API key for an access/refresh token pair
    ///
    /// Returns `None` when the service answers without a usable access token.
    pub async fn generate_token(&self, code: &str) -> Result<Option<TokenResponse>> {
        let response = self
            .post(GENERATE_TOKEN, Some(vec![("code", code.to_string())]))
            .await?;

        if !response.is_object() {
            debug!("Token response carried no object");
            return Ok(None);
        }

        Ok(serde_json::from_value::<TokenResponse>(response)
            .ok()
            .filter(|token| !token.access_token.is_empty()))
    }

    /// Metadata of every device on the account
    pub async fn get_device_list(&self) -> Result<Vec<DeviceMetadata>> {
        let response = self.post(DEVICE_LIST, None).await?;

        match response {
            value if is_empty_body(&value) => Ok(Vec::new()),
            Value::Array(entries) => entries
                .into_iter()
                .map(|entry| {
                    serde_json::from_value(entry).map_err(|e| {
                        Error::request(endpoint_url(DEVICE_LIST), format!("Malformed device: {}", e))
                    })
                })
                .collect(),
            other => Err(Error::request(
                endpoint_url(DEVICE_LIST),
                format!("Unexpected device list payload: {}", other),
            )),
        }
    }

    /// Most recent samples of one device
    ///
    /// `None` means the service returned no wrapping object at all, which the
    /// caller treats as "nothing to apply". A wrapper without `data` is an
    /// empty batch.
    pub async fn get_device_data(
        &self,
        serial_number: &str,
        mode: Mode,
        limit: u32,
    ) -> Result<Option<Vec<Sample>>> {
        let form = vec![
            ("serialNumber", serial_number.to_string()),
            ("mode", mode.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        let response = self.post(DEVICE_DATA, Some(form)).await?;

        match response {
            value if is_empty_body(&value) => Ok(None),
            Value::Object(mut body) => match body.remove("data") {
                Some(Value::Array(samples)) => Ok(Some(
                    samples
                        .into_iter()
                        .filter_map(|sample| match sample {
                            Value::Object(fields) => Some(fields),
                            _ => None,
                        })
                        .collect(),
                )),
                Some(Value::Null) | None => Ok(Some(Vec::new())),
                Some(other) => Err(Error::request(
                    endpoint_url(DEVICE_DATA),
                    format!("Unexpected data payload: {}", other),
                )),
            },
            other => Err(Error::request(
                endpoint_url(DEVICE_DATA),
                format!("Unexpected data payload: {}", other),
            )),
        }
    }
}
