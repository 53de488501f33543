// Port to the game backend's telemetry API
use crate::domain::device::{DeviceBatch, DeviceType, LatestPower};
use crate::domain::game_result::GameResult;
use crate::domain::power::PowerSample;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),
    /// Non-2xx status; `body` is the response text.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },
    /// The response body was not JSON of the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// `GET /get-latest-power`
    async fn latest_power(
        &self,
        device_type: DeviceType,
        session_id: &str,
    ) -> Result<LatestPower, ApiError>;

    /// `GET /get-latest-multiple-device-power`
    async fn latest_devices(
        &self,
        device_type: DeviceType,
        session_id: &str,
    ) -> Result<DeviceBatch, ApiError>;

    /// `GET /get-power-history`; a body missing its fields decodes as an
    /// empty sample rather than an error.
    async fn power_history(&self, session_id: &str) -> Result<PowerSample, ApiError>;

    /// `GET /get-game-result`
    async fn game_result(&self, session_id: &str) -> Result<GameResult, ApiError>;

    /// `POST /delete-session`
    async fn delete_session(&self, session_id: &str, password: &str) -> Result<(), ApiError>;
}
