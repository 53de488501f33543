// Port for persisting the dashboard's team settings
use crate::domain::settings::{SettingsError, TeamSettings};
use async_trait::async_trait;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or defaults when nothing has been saved yet.
    async fn load(&self) -> Result<TeamSettings, SettingsError>;

    async fn save(&self, settings: &TeamSettings) -> Result<(), SettingsError>;
}
