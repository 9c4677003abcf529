//! Async client for the uHoo air-quality integration API
//!
//! Log in with an API key, discover the account's devices, then poll each
//! device for its latest readings, averaged over the most recent samples.

pub mod api;
pub mod client;
pub mod config;
pub mod device;
pub mod errors;
pub mod models;
pub mod utils;

pub use api::{Api, HttpTransport, Transport, BASE_URL};
pub use client::Client;
pub use config::ClientConfig;
pub use device::{Device, SensorField, SENSOR_FIELDS};
pub use errors::{Error, Result};
pub use models::{default_user_settings, DeviceMetadata, Mode, Sample, TokenResponse, UserSettings};
