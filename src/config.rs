use log::debug;
use std::env;

use crate::errors::{Error, Result};
use crate::models::Mode;

pub const DEFAULT_LIMIT: u32 = 5;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    pub mode: Mode,
    pub limit: u32,
    pub debug: bool,
}

impl ClientConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            mode: Mode::default(),
            limit: DEFAULT_LIMIT,
            debug: false,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Load configuration from the environment, reading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from `UHOO_API_KEY`, `UHOO_MODE`, `UHOO_LIMIT`
    /// and `UHOO_DEBUG` as resolved by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("UHOO_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("UHOO_API_KEY environment variable not set".into()))?;

        let mut config = ClientConfig::new(api_key);

        if let Some(mode) = lookup("UHOO_MODE") {
            config.mode = mode.parse()?;
        }

        if let Some(limit) = lookup("UHOO_LIMIT") {
            config.limit = limit
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid UHOO_LIMIT '{}'", limit)))?;
        }

        if let Some(flag) = lookup("UHOO_DEBUG") {
            config.debug = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config.validate()?;
        debug!(
            "Loaded client configuration: mode={}, limit={}, debug={}",
            config.mode, config.limit, config.debug
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::Config("limit must be at least 1".into()));
        }
        Ok(())
    }
}
