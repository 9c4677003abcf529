use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;
use crate::utils::whole_number;

/// One raw reading: sensor API name -> number, plus an integer `timestamp`
pub type Sample = Map<String, Value>;

/// Sensor API name -> unit string
pub type UserSettings = HashMap<String, String>;

// Field decoders that never fail: null or an unexpected type becomes the
// default, so one odd value can't drop a token or a whole device list.

fn string_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn integer_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(optional_integer(d)?.unwrap_or_default())
}

fn optional_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(whole_number))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    #[serde(deserialize_with = "string_or_default")]
    pub access_token: String,
    #[serde(deserialize_with = "optional_string")]
    pub refresh_token: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub token_type: Option<String>,
    /// Seconds; whole floats and numeric strings are accepted
    #[serde(deserialize_with = "optional_integer")]
    pub expires_in: Option<i64>,
}

/// Device metadata as returned by `getdeviceslist`. Missing or null keys default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(deserialize_with = "string_or_default")]
    pub device_name: String,
    #[serde(deserialize_with = "string_or_default")]
    pub mac_address: String,
    #[serde(deserialize_with = "string_or_default")]
    pub serial_number: String,
    #[serde(deserialize_with = "integer_or_default")]
    pub floor_number: i64,
    #[serde(deserialize_with = "string_or_default")]
    pub room_name: String,
    #[serde(deserialize_with = "string_or_default")]
    pub timezone: String,
    #[serde(deserialize_with = "string_or_default")]
    pub utc_offset: String,
    #[serde(deserialize_with = "string_or_default")]
    pub ssid: String,
}

/// Sample granularity requested from `getdata`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Minute,
    Hour,
    Day,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Minute => "minute",
            Mode::Hour => "hour",
            Mode::Day => "day",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(Mode::Minute),
            "hour" => Ok(Mode::Hour),
            "day" => Ok(Mode::Day),
            other => Err(Error::Config(format!("unknown mode '{}'", other))),
        }
    }
}

/// Units the vendor reports its readings in
pub fn default_user_settings() -> UserSettings {
    [
        ("temperature", "°C"),
        ("temp", "c"),
        ("humidity", "%"),
        ("pm25", "µg/m^3"),
        ("dust", "µg/m^3"),
        ("tvoc", "ppb"),
        ("voc", "ppb"),
        ("co2", "ppm"),
        ("co", "ppm"),
        ("airPressure", "mbar"),
        ("ozone", "ppb"),
        ("no2", "ppb"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
