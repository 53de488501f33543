// Team configuration entered on the dashboard
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::i18n::Language;

/// Session used by the result screen when a team has none configured.
pub const DEFAULT_SESSION: &str = "default_session";

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("all of team1Name, team2Name, sessionId1 and sessionId2 are required")]
    Incomplete,
    #[error("settings storage failed: {0}")]
    Storage(String),
}

/// Persisted dashboard configuration, keyed the way the browser dashboard
/// stored it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    #[serde(rename = "team1Name")]
    pub team1_name: String,
    #[serde(rename = "team2Name")]
    pub team2_name: String,
    #[serde(rename = "sessionId1")]
    pub session_id1: String,
    #[serde(rename = "sessionId2")]
    pub session_id2: String,
    #[serde(rename = "configComplete")]
    pub config_complete: bool,
    #[serde(rename = "uiLanguage")]
    pub language: Language,
}

/// Input of a save action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInput {
    pub team1_name: String,
    pub team2_name: String,
    pub session_id1: String,
    pub session_id2: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSlot {
    One,
    Two,
}

impl TeamSlot {
    pub const ALL: [TeamSlot; 2] = [TeamSlot::One, TeamSlot::Two];

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(TeamSlot::One),
            2 => Some(TeamSlot::Two),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            TeamSlot::One => 1,
            TeamSlot::Two => 2,
        }
    }
}

impl TeamSettings {
    /// Configuration counts as complete only when flagged and every value is
    /// present.
    pub fn is_complete(&self) -> bool {
        self.config_complete
            && !self.team1_name.is_empty()
            && !self.team2_name.is_empty()
            && !self.session_id1.is_empty()
            && !self.session_id2.is_empty()
    }

    pub fn saved(&self, input: TeamInput) -> Result<Self, SettingsError> {
        let fields = [
            &input.team1_name,
            &input.team2_name,
            &input.session_id1,
            &input.session_id2,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(SettingsError::Incomplete);
        }

        Ok(Self {
            team1_name: input.team1_name,
            team2_name: input.team2_name,
            session_id1: input.session_id1,
            session_id2: input.session_id2,
            config_complete: true,
            language: self.language,
        })
    }

    /// Names, sessions and completion are dropped; the language survives.
    pub fn reset(&self) -> Self {
        Self {
            language: self.language,
            ..Self::default()
        }
    }

    pub fn team_name(&self, slot: TeamSlot) -> &str {
        match slot {
            TeamSlot::One => &self.team1_name,
            TeamSlot::Two => &self.team2_name,
        }
    }

    pub fn session_id(&self, slot: TeamSlot) -> Option<&str> {
        let id = match slot {
            TeamSlot::One => &self.session_id1,
            TeamSlot::Two => &self.session_id2,
        };
        (!id.is_empty()).then_some(id.as_str())
    }
}
