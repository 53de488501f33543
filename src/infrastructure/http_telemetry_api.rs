// HTTP adapter for the game backend's telemetry API
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::device::{DeviceBatch, DeviceType, LatestPower};
use crate::domain::game_result::GameResult;
use crate::domain::power::PowerSample;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetryApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSessionBody<'a> {
    session_id: &'a str,
    password: &'a str,
}

impl HttpTelemetryApi {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();

        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query.join("&"))
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path, params);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl TelemetryApi for HttpTelemetryApi {
    async fn latest_power(
        &self,
        device_type: DeviceType,
        session_id: &str,
    ) -> Result<LatestPower, ApiError> {
        self.get_json(
            "/get-latest-power",
            &[("device_type", device_type.as_str()), ("session_id", session_id)],
        )
        .await
    }

    async fn latest_devices(
        &self,
        device_type: DeviceType,
        session_id: &str,
    ) -> Result<DeviceBatch, ApiError> {
        self.get_json(
            "/get-latest-multiple-device-power",
            &[("device_type", device_type.as_str()), ("session_id", session_id)],
        )
        .await
    }

    async fn power_history(&self, session_id: &str) -> Result<PowerSample, ApiError> {
        // `null` or a non-object body is an empty history, not an error
        let value: serde_json::Value = self
            .get_json("/get-power-history", &[("session_id", session_id)])
            .await?;
        if !value.is_object() {
            return Ok(PowerSample::empty());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn game_result(&self, session_id: &str) -> Result<GameResult, ApiError> {
        self.get_json("/get-game-result", &[("session_id", session_id)])
            .await
    }

    async fn delete_session(&self, session_id: &str, password: &str) -> Result<(), ApiError> {
        let url = self.build_url("/delete-session", &[]);
        let response = self
            .client
            .post(&url)
            .json(&DeleteSessionBody {
                session_id,
                password,
            })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }
}
