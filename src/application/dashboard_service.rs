// Dashboard service - Team configuration and the per-team pollers it drives
use crate::application::map_service::DeviceBoard;
use crate::application::recording_service::RecordingSession;
use crate::application::settings_store::SettingsStore;
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::device::{DeviceType, LatestPower};
use crate::domain::i18n::{Language, Translator};
use crate::domain::settings::{SettingsError, TeamInput, TeamSettings, TeamSlot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Live chart and device board for one configured team.
pub struct TeamPollers {
    pub slot: TeamSlot,
    pub team_name: String,
    pub session_id: String,
    pub chart: RecordingSession,
    pub board: DeviceBoard,
}

pub struct DashboardService {
    api: Arc<dyn TelemetryApi>,
    store: Arc<dyn SettingsStore>,
    poll_period: Duration,
    settings: RwLock<TeamSettings>,
    teams: RwLock<Vec<Arc<TeamPollers>>>,
}

impl DashboardService {
    /// Load stored settings and, if the configuration is complete, start
    /// polling for both teams.
    pub async fn start(
        api: Arc<dyn TelemetryApi>,
        store: Arc<dyn SettingsStore>,
        poll_period: Duration,
    ) -> Result<Self, SettingsError> {
        let settings = store.load().await?;
        let teams = Self::spawn_teams(&api, &settings, poll_period);
        tracing::info!(
            "Loaded dashboard settings (complete: {}, language: {})",
            settings.is_complete(),
            settings.language.code()
        );

        Ok(Self {
            api,
            store,
            poll_period,
            settings: RwLock::new(settings),
            teams: RwLock::new(teams),
        })
    }

    pub async fn settings(&self) -> TeamSettings {
        self.settings.read().await.clone()
    }

    pub async fn translator(&self) -> Translator {
        Translator::new(self.settings.read().await.language)
    }

    pub async fn team(&self, slot: TeamSlot) -> Option<Arc<TeamPollers>> {
        self.teams
            .read()
            .await
            .iter()
            .find(|t| t.slot == slot)
            .cloned()
    }

    pub async fn save(&self, input: TeamInput) -> Result<TeamSettings, SettingsError> {
        let mut settings = self.settings.write().await;
        let updated = settings.saved(input)?;
        self.store.save(&updated).await?;
        *settings = updated.clone();

        let teams = Self::spawn_teams(&self.api, &updated, self.poll_period);
        *self.teams.write().await = teams;
        tracing::info!(
            "Saved team settings: {} ({}) vs {} ({})",
            updated.team1_name,
            updated.session_id1,
            updated.team2_name,
            updated.session_id2
        );
        Ok(updated)
    }

    pub async fn reset(&self) -> Result<TeamSettings, SettingsError> {
        let mut settings = self.settings.write().await;
        let cleared = settings.reset();
        self.store.save(&cleared).await?;
        *settings = cleared.clone();

        self.teams.write().await.clear();
        tracing::info!("Team settings reset");
        Ok(cleared)
    }

    pub async fn toggle_language(&self) -> Result<Language, SettingsError> {
        let mut settings = self.settings.write().await;
        let mut updated = settings.clone();
        updated.language = settings.language.toggled();
        self.store.save(&updated).await?;
        *settings = updated;
        Ok(settings.language)
    }

    /// `None` when the team has no session configured.
    pub async fn latest_power(
        &self,
        slot: TeamSlot,
        device_type: DeviceType,
    ) -> Option<Result<LatestPower, ApiError>> {
        let session_id = self.settings.read().await.session_id(slot)?.to_string();
        Some(self.api.latest_power(device_type, &session_id).await)
    }

    fn spawn_teams(
        api: &Arc<dyn TelemetryApi>,
        settings: &TeamSettings,
        poll_period: Duration,
    ) -> Vec<Arc<TeamPollers>> {
        if !settings.is_complete() {
            return Vec::new();
        }

        TeamSlot::ALL
            .iter()
            .filter_map(|&slot| {
                let session_id = settings.session_id(slot)?.to_string();
                Some(Arc::new(TeamPollers {
                    slot,
                    team_name: settings.team_name(slot).to_string(),
                    chart: RecordingSession::spawn(api.clone(), session_id.clone(), poll_period),
                    board: DeviceBoard::spawn(api.clone(), session_id.clone(), poll_period),
                    session_id,
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::settings_store::memory::MemoryStore;
    use crate::application::testing::FakeApi;

    fn input() -> TeamInput {
        TeamInput {
            team1_name: "Sushi".to_string(),
            team2_name: "Tempura".to_string(),
            session_id1: "s1".to_string(),
            session_id2: "s2".to_string(),
        }
    }

    async fn service(store: Arc<MemoryStore>) -> DashboardService {
        DashboardService::start(Arc::new(FakeApi::new()), store, Duration::from_secs(3))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_pollers_until_configured() {
        let service = service(Arc::new(MemoryStore::default())).await;
        assert!(service.team(TeamSlot::One).await.is_none());
        assert!(service.latest_power(TeamSlot::One, DeviceType::Wind).await.is_none());
    }

    #[tokio::test]
    async fn test_save_starts_pollers_and_persists() {
        let store = Arc::new(MemoryStore::default());
        let service = service(store.clone()).await;

        service.save(input()).await.unwrap();

        let team = service.team(TeamSlot::Two).await.unwrap();
        assert_eq!(team.session_id, "s2");
        assert_eq!(team.chart.session_id(), "s2");
        assert!(store.saved.lock().await.as_ref().unwrap().is_complete());

        let latest = service
            .latest_power(TeamSlot::One, DeviceType::Wind)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.latest_power, 120.0);
    }

    #[tokio::test]
    async fn test_invalid_save_changes_nothing() {
        let store = Arc::new(MemoryStore::default());
        let service = service(store.clone()).await;

        let mut bad = input();
        bad.session_id2 = String::new();
        assert_eq!(service.save(bad).await.unwrap_err(), SettingsError::Incomplete);
        assert!(store.saved.lock().await.is_none());
        assert!(service.team(TeamSlot::One).await.is_none());
    }

    #[tokio::test]
    async fn test_reset_stops_pollers() {
        let service = service(Arc::new(MemoryStore::default())).await;
        service.save(input()).await.unwrap();
        service.reset().await.unwrap();

        assert!(service.team(TeamSlot::One).await.is_none());
        assert!(!service.settings().await.is_complete());
    }

    #[tokio::test]
    async fn test_stored_settings_resume_on_start() {
        let store = Arc::new(MemoryStore::default());
        *store.saved.lock().await = Some(TeamSettings::default().saved(input()).unwrap());

        let service = service(store).await;
        assert_eq!(service.team(TeamSlot::One).await.unwrap().team_name, "Sushi");
    }

    #[tokio::test]
    async fn test_toggle_language_persists() {
        let store = Arc::new(MemoryStore::default());
        let service = service(store.clone()).await;

        assert_eq!(service.toggle_language().await.unwrap(), Language::En);
        assert_eq!(store.saved.lock().await.as_ref().unwrap().language, Language::En);
        assert_eq!(service.translator().await.t("chart.buttons.stop"), "Stop");
    }
}
