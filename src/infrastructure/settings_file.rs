// TOML file store for the dashboard's team settings
use crate::application::settings_store::SettingsStore;
use crate::domain::settings::{SettingsError, TeamSettings};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for SettingsFile {
    async fn load(&self) -> Result<TeamSettings, SettingsError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TeamSettings::default()),
            Err(e) => return Err(SettingsError::Storage(e.to_string())),
        };

        toml::from_str(&text).map_err(|e| {
            SettingsError::Storage(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, settings: &TeamSettings) -> Result<(), SettingsError> {
        let text =
            toml::to_string(settings).map_err(|e| SettingsError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::Storage(e.to_string()))?;
        }

        // replace atomically
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))
    }
}
