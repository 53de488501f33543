// Result service - Use case for the post-game result screen
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::game_result::GameResult;
use crate::domain::power::{EnergyMix, PowerSample};
use crate::domain::settings::{TeamSettings, TeamSlot, DEFAULT_SESSION};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryState {
    Loaded(PowerSample),
    /// The backend returned no samples.
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub slot: u8,
    pub team_name: String,
    pub session_id: String,
    pub result: GameResult,
    pub energy_mix: Option<EnergyMix>,
    pub history: HistoryState,
}

#[derive(Clone)]
pub struct ResultService {
    api: Arc<dyn TelemetryApi>,
    display_offset_hours: i64,
}

impl ResultService {
    pub fn new(api: Arc<dyn TelemetryApi>, display_offset_hours: i64) -> Self {
        Self {
            api,
            display_offset_hours,
        }
    }

    /// Results for both teams. Either game result failing fails the whole
    /// screen; a failed history only affects that team's chart.
    pub async fn load(
        &self,
        settings: &TeamSettings,
        from: Option<&str>,
    ) -> Result<Vec<TeamResult>, ApiError> {
        let sessions: Vec<(TeamSlot, String)> = TeamSlot::ALL
            .iter()
            .map(|&slot| {
                let session = settings.session_id(slot).unwrap_or(DEFAULT_SESSION);
                (slot, session.to_string())
            })
            .collect();

        let mut results = Vec::with_capacity(sessions.len());
        for (slot, session_id) in &sessions {
            let result = self.api.game_result(session_id).await.map_err(|e| {
                tracing::error!("Game result for team {} ({}) failed: {}", slot.number(), session_id, e);
                e
            })?;
            results.push(result);
        }

        let mut teams = Vec::with_capacity(sessions.len());
        for ((slot, session_id), result) in sessions.into_iter().zip(results) {
            let history = self.history(&session_id, from).await;
            let energy_mix = match &history {
                HistoryState::Loaded(sample) => Some(sample.energy_mix()),
                _ => None,
            };

            teams.push(TeamResult {
                slot: slot.number(),
                team_name: settings.team_name(slot).to_string(),
                session_id,
                result,
                energy_mix,
                history,
            });
        }

        Ok(teams)
    }

    async fn history(&self, session_id: &str, from: Option<&str>) -> HistoryState {
        match self.api.power_history(session_id).await {
            Ok(sample) if sample.is_empty() => HistoryState::NoData,
            Ok(sample) => {
                let sample = sample.normalized();
                let sample = match from.map(str::trim).filter(|f| !f.is_empty()) {
                    Some(from) => sample.from_clock_time(from, self.display_offset_hours),
                    None => sample,
                };
                if sample.is_empty() {
                    HistoryState::NoData
                } else {
                    HistoryState::Loaded(sample)
                }
            }
            Err(e) => {
                tracing::warn!("Result history for {} failed: {}", session_id, e);
                HistoryState::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{history, FakeApi, Scripted};
    use std::time::Duration;

    fn settings() -> TeamSettings {
        TeamSettings {
            team1_name: "Sushi".to_string(),
            team2_name: "Tempura".to_string(),
            session_id1: "s1".to_string(),
            session_id2: "s2".to_string(),
            config_complete: true,
            ..TeamSettings::default()
        }
    }

    fn result(total: f64) -> Scripted<GameResult> {
        Scripted::Ok(GameResult {
            total_power_generation: total,
            ..GameResult::default()
        })
    }

    #[tokio::test]
    async fn test_loads_both_teams() {
        let api = Arc::new(FakeApi::new());
        api.set_result("s1", result(10.0)).await;
        api.set_result("s2", result(20.0)).await;
        api.push_history(
            Duration::ZERO,
            Scripted::Ok(history(&["2024-01-01T00:00:00Z", "2024-01-01T00:05:00Z"], None)),
        )
        .await;

        let service = ResultService::new(api, 9);
        let teams = service.load(&settings(), None).await.unwrap();

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team_name, "Sushi");
        assert_eq!(teams[1].result.total_power_generation, 20.0);
        assert!(matches!(&teams[0].history, HistoryState::Loaded(s) if s.len() == 2));
        assert_eq!(teams[0].energy_mix.as_ref().unwrap().total, 20.0);
    }

    #[tokio::test]
    async fn test_clock_filter_uses_display_time() {
        let api = Arc::new(FakeApi::new());
        api.set_result("s1", result(1.0)).await;
        api.set_result("s2", result(2.0)).await;
        api.push_history(
            Duration::ZERO,
            Scripted::Ok(history(&["2024-01-01T00:00:00Z", "2024-01-01T00:05:00Z"], None)),
        )
        .await;

        let service = ResultService::new(api, 9);
        let teams = service.load(&settings(), Some("09:01")).await.unwrap();
        assert!(matches!(&teams[0].history, HistoryState::Loaded(s) if s.len() == 1));

        let teams = service.load(&settings(), Some("10:00")).await.unwrap();
        assert_eq!(teams[1].history, HistoryState::NoData);
    }

    #[tokio::test]
    async fn test_any_result_failure_fails_the_screen() {
        let api = Arc::new(FakeApi::new());
        api.set_result("s1", result(1.0)).await;
        api.set_result("s2", Scripted::Down).await;

        let service = ResultService::new(api, 9);
        assert!(matches!(
            service.load(&settings(), None).await,
            Err(ApiError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_sessions_fall_back_to_default() {
        let api = Arc::new(FakeApi::new());
        api.set_result(DEFAULT_SESSION, result(3.0)).await;

        let service = ResultService::new(api, 9);
        let teams = service.load(&TeamSettings::default(), None).await.unwrap();

        assert!(teams.iter().all(|t| t.session_id == DEFAULT_SESSION));
        assert_eq!(teams[0].history, HistoryState::NoData);
    }
}
