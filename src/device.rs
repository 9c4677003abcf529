//! Device record and the sensor field table
use time::OffsetDateTime;

use crate::models::{DeviceMetadata, Sample, UserSettings};
use crate::utils::{average_field, latest_timestamp};

/// Sensor readings reported by the integration API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    VirusIndex,
    MoldIndex,
    Temperature,
    Humidity,
    Pm25,
    Tvoc,
    Co2,
    Co,
    AirPressure,
    Ozone,
    No2,
    Pm1,
    Pm4,
    Pm10,
    Ch2o,
    Light,
    Sound,
    H2s,
    No,
    So2,
    Nh3,
    Oxygen,
}

pub const SENSOR_FIELDS: [SensorField; 22] = [
    SensorField::VirusIndex,
    SensorField::MoldIndex,
    SensorField::Temperature,
    SensorField::Humidity,
    SensorField::Pm25,
    SensorField::Tvoc,
    SensorField::Co2,
    SensorField::Co,
    SensorField::AirPressure,
    SensorField::Ozone,
    SensorField::No2,
    SensorField::Pm1,
    SensorField::Pm4,
    SensorField::Pm10,
    SensorField::Ch2o,
    SensorField::Light,
    SensorField::Sound,
    SensorField::H2s,
    SensorField::No,
    SensorField::So2,
    SensorField::Nh3,
    SensorField::Oxygen,
];

impl SensorField {
    /// (API name, attribute name)
    const fn names(&self) -> (&'static str, &'static str) {
        match self {
            SensorField::VirusIndex => ("virusIndex", "virus_index"),
            SensorField::MoldIndex => ("moldIndex", "mold_index"),
            SensorField::Temperature => ("temperature", "temperature"),
            SensorField::Humidity => ("humidity", "humidity"),
            SensorField::Pm25 => ("pm25", "pm25"),
            SensorField::Tvoc => ("tvoc", "tvoc"),
            SensorField::Co2 => ("co2", "co2"),
            SensorField::Co => ("co", "co"),
            SensorField::AirPressure => ("airPressure", "air_pressure"),
            SensorField::Ozone => ("ozone", "ozone"),
            SensorField::No2 => ("no2", "no2"),
            SensorField::Pm1 => ("pm1", "pm1"),
            SensorField::Pm4 => ("pm4", "pm4"),
            SensorField::Pm10 => ("pm10", "pm10"),
            SensorField::Ch2o => ("ch2o", "ch2o"),
            SensorField::Light => ("light", "light"),
            SensorField::Sound => ("sound", "sound"),
            SensorField::H2s => ("h2s", "h2s"),
            SensorField::No => ("no", "no"),
            SensorField::So2 => ("so2", "so2"),
            SensorField::Nh3 => ("nh3", "nh3"),
            SensorField::Oxygen => ("oxygen", "oxygen"),
        }
    }

    /// camelCase key used in `getdata` samples
    pub const fn api_name(&self) -> &'static str {
        self.names().0
    }

    /// snake_case name of the matching `Device` field
    pub const fn attr_name(&self) -> &'static str {
        self.names().1
    }

    pub fn from_api_name(name: &str) -> Option<SensorField> {
        SENSOR_FIELDS.into_iter().find(|f| f.api_name() == name)
    }

    pub fn from_attr_name(name: &str) -> Option<SensorField> {
        SENSOR_FIELDS.into_iter().find(|f| f.attr_name() == name)
    }
}

/// One air-quality monitor and its latest averaged readings
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub device_name: String,
    pub mac_address: String,
    pub serial_number: String,
    pub floor_number: i64,
    pub room_name: String,
    pub timezone: String,
    pub utc_offset: String,
    pub ssid: String,

    pub virus_index: f64,
    pub mold_index: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub pm25: f64,
    pub tvoc: f64,
    pub co2: f64,
    pub co: f64,
    pub air_pressure: f64,
    pub ozone: f64,
    pub no2: f64,
    pub pm1: f64,
    pub pm4: f64,
    pub pm10: f64,
    pub ch2o: f64,
    pub light: f64,
    pub sound: f64,
    pub h2s: f64,
    pub no: f64,
    pub so2: f64,
    pub nh3: f64,
    pub oxygen: f64,

    /// Unix seconds of the last sample applied, -1 until the first update
    pub timestamp: i64,
    units: UserSettings,
}

impl Default for Device {
    fn default() -> Self {
        Device {
            device_name: String::new(),
            mac_address: String::new(),
            serial_number: String::new(),
            floor_number: 0,
            room_name: String::new(),
            timezone: String::new(),
            utc_offset: String::new(),
            ssid: String::new(),
            virus_index: 0.0,
            mold_index: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            pm25: 0.0,
            tvoc: 0.0,
            co2: 0.0,
            co: 0.0,
            air_pressure: 0.0,
            ozone: 0.0,
            no2: 0.0,
            pm1: 0.0,
            pm4: 0.0,
            pm10: 0.0,
            ch2o: 0.0,
            light: 0.0,
            sound: 0.0,
            h2s: 0.0,
            no: 0.0,
            so2: 0.0,
            nh3: 0.0,
            oxygen: 0.0,
            timestamp: -1,
            units: UserSettings::new(),
        }
    }
}

impl Device {
    pub fn new(metadata: DeviceMetadata) -> Self {
        let mut device = Device::default();
        device.update_device(metadata);
        device
    }

    /// Replace all metadata. Keys missing from the payload were already
    /// defaulted during deserialization, so nothing is carried over.
    pub fn update_device(&mut self, metadata: DeviceMetadata) {
        let DeviceMetadata {
            device_name,
            mac_address,
            serial_number,
            floor_number,
            room_name,
            timezone,
            utc_offset,
            ssid,
        } = metadata;

        self.device_name = device_name;
        self.mac_address = mac_address;
        self.serial_number = serial_number;
        self.floor_number = floor_number;
        self.room_name = room_name;
        self.timezone = timezone;
        self.utc_offset = utc_offset;
        self.ssid = ssid;
    }

    /// Average a sample batch into the sensor fields
    ///
    /// Every known field is overwritten, fields missing from the whole batch
    /// become 0.0. An empty batch leaves the record untouched.
    pub fn update_data(&mut self, samples: &[Sample], user_settings: &UserSettings) {
        if samples.is_empty() {
            return;
        }

        for field in SENSOR_FIELDS {
            *self.sensor_mut(field) = average_field(samples, field.api_name());
        }

        if let Some(timestamp) = latest_timestamp(samples) {
            self.timestamp = timestamp;
        }

        self.units = user_settings.clone();
    }

    pub fn sensor(&self, field: SensorField) -> f64 {
        match field {
            SensorField::VirusIndex => self.virus_index,
            SensorField::MoldIndex => self.mold_index,
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Pm25 => self.pm25,
            SensorField::Tvoc => self.tvoc,
            SensorField::Co2 => self.co2,
            SensorField::Co => self.co,
            SensorField::AirPressure => self.air_pressure,
            SensorField::Ozone => self.ozone,
            SensorField::No2 => self.no2,
            SensorField::Pm1 => self.pm1,
            SensorField::Pm4 => self.pm4,
            SensorField::Pm10 => self.pm10,
            SensorField::Ch2o => self.ch2o,
            SensorField::Light => self.light,
            SensorField::Sound => self.sound,
            SensorField::H2s => self.h2s,
            SensorField::No => self.no,
            SensorField::So2 => self.so2,
            SensorField::Nh3 => self.nh3,
            SensorField::Oxygen => self.oxygen,
        }
    }

    fn sensor_mut(&mut self, field: SensorField) -> &mut f64 {
        match field {
            SensorField::VirusIndex => &mut self.virus_index,
            SensorField::MoldIndex => &mut self.mold_index,
            SensorField::Temperature => &mut self.temperature,
            SensorField::Humidity => &mut self.humidity,
            SensorField::Pm25 => &mut self.pm25,
            SensorField::Tvoc => &mut self.tvoc,
            SensorField::Co2 => &mut self.co2,
            SensorField::Co => &mut self.co,
            SensorField::AirPressure => &mut self.air_pressure,
            SensorField::Ozone => &mut self.ozone,
            SensorField::No2 => &mut self.no2,
            SensorField::Pm1 => &mut self.pm1,
            SensorField::Pm4 => &mut self.pm4,
            SensorField::Pm10 => &mut self.pm10,
            SensorField::Ch2o => &mut self.ch2o,
            SensorField::Light => &mut self.light,
            SensorField::Sound => &mut self.sound,
            SensorField::H2s => &mut self.h2s,
            SensorField::No => &mut self.no,
            SensorField::So2 => &mut self.so2,
            SensorField::Nh3 => &mut self.nh3,
            SensorField::Oxygen => &mut self.oxygen,
        }
    }

    /// Unit reported with the last applied batch, if the unit table has one
    pub fn unit(&self, field: SensorField) -> Option<&str> {
        self.units.get(field.api_name()).map(String::as_str)
    }

    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        if self.timestamp < 0 {
            return None;
        }
        OffsetDateTime::from_unix_timestamp(self.timestamp).ok()
    }
}
