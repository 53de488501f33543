// Device telemetry domain models
use serde::{Deserialize, Serialize};

/// Device categories the map and gauges poll for, in polling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Hydrogen,
    Geothermal,
    Wind,
    Solar,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Hydrogen,
        DeviceType::Geothermal,
        DeviceType::Wind,
        DeviceType::Solar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Hydrogen => "hydrogen",
            DeviceType::Geothermal => "geothermal",
            DeviceType::Wind => "wind",
            DeviceType::Solar => "solar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            DeviceType::Hydrogen => "energy.hydrogen",
            DeviceType::Geothermal => "energy.geothermal",
            DeviceType::Wind => "energy.wind",
            DeviceType::Solar => "energy.solar",
        }
    }

    pub fn gauge_range(&self) -> GaugeRange {
        match self {
            DeviceType::Geothermal => GaugeRange::new(100.0, 200.0),
            DeviceType::Wind => GaugeRange::new(100.0, 420.0),
            DeviceType::Solar => GaugeRange::new(300.0, 500.0),
            DeviceType::Hydrogen => GaugeRange::new(0.0, 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeRange {
    pub min_value: f64,
    pub max_value: f64,
}

impl GaugeRange {
    pub fn new(min_value: f64, max_value: f64) -> Self {
        Self { min_value, max_value }
    }

    /// Five evenly spaced tick marks ending at the maximum.
    pub fn ticks(&self) -> Vec<f64> {
        let step = (self.max_value - self.min_value) / 5.0;
        (1..=5).map(|i| self.min_value + step * i as f64).collect()
    }
}

/// Marker colour for a reported device type; unknown types are gray.
pub fn marker_color(device_type: &str) -> &'static str {
    match DeviceType::parse(device_type) {
        Some(DeviceType::Hydrogen) => "blue",
        Some(DeviceType::Geothermal) => "red",
        Some(DeviceType::Wind) => "green",
        Some(DeviceType::Solar) => "yellow",
        None => "gray",
    }
}

/// A telemetry-reporting unit as returned by the multiple-device endpoint.
///
/// `device_type` stays a string because the backend may report categories
/// this dashboard does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub device_id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub device_type: String,
    #[serde(default, deserialize_with = "number_or_none")]
    pub power: Option<f64>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub gps_lat: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub gps_lon: String,
}

impl Device {
    /// Parsed `(lat, lon)`, or `None` when either is not a finite number.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = parse_coordinate(&self.gps_lat)?;
        let lon = parse_coordinate(&self.gps_lon)?;
        Some((lat, lon))
    }

    pub fn popup(&self) -> String {
        let power = self.power.map_or_else(|| "null".to_string(), |p| p.to_string());
        format!(
            "{}\nID: {}\nPower: {} kW",
            self.device_type, self.device_id, power
        )
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Response of `/get-latest-multiple-device-power`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBatch {
    #[serde(default, deserialize_with = "number_or_none")]
    pub total_power: Option<f64>,
    #[serde(default)]
    pub devices: Vec<Device>,
}

fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

/// Strings pass through, numbers are rendered, anything else becomes empty.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Response of `/get-latest-power`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPower {
    #[serde(default)]
    pub latest_power: f64,
    #[serde(default)]
    pub gps_lat: String,
    #[serde(default)]
    pub gps_lon: String,
}
