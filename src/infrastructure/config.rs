use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub polling: PollingSettings,
    pub display: DisplaySettings,
    pub map: MapSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub interval_ms: u64,
}

impl PollingSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    /// Hours added to backend timestamps when labelling charts.
    pub offset_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapSettings {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub settings_path: String,
}

fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("api.base_url", "http://localhost:8000")?
        .set_default("api.timeout_secs", 10)?
        .set_default("polling.interval_ms", 3000)?
        .set_default("display.offset_hours", 9)?
        .set_default("map.center_lat", 35.10324)?
        .set_default("map.center_lon", 137.14731)?
        .set_default("map.zoom", 20)?
        .set_default("storage.settings_path", "data/settings.toml")
}

/// Defaults, then `config/dashboard.toml` if present, then `DASHBOARD__*`
/// environment variables (e.g. `DASHBOARD__API__BASE_URL`).
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: DashboardConfig = builder().unwrap().build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.polling.period(), Duration::from_secs(3));
        assert_eq!(config.display.offset_hours, 9);
        assert_eq!(config.map.zoom, 20);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config: DashboardConfig = builder()
            .unwrap()
            .add_source(config::File::from_str(
                "[api]\nbase_url = \"http://game.local\"\n[polling]\ninterval_ms = 500\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api.base_url, "http://game.local");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.polling.period(), Duration::from_millis(500));
    }
}
