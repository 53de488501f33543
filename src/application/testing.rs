// In-memory telemetry API for service tests
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::device::{Device, DeviceBatch, DeviceType, LatestPower};
use crate::domain::game_result::GameResult;
use crate::domain::power::PowerSample;

#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    Status(u16, String),
    Down,
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T, ApiError> {
        match self {
            Scripted::Ok(value) => Ok(value),
            Scripted::Status(status, body) => Err(ApiError::Status { status, body }),
            Scripted::Down => Err(ApiError::Transport("connection refused".to_string())),
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    /// Consumed front to back; the last entry repeats.
    history: Mutex<VecDeque<(Duration, Scripted<PowerSample>)>>,
    devices: Mutex<HashMap<DeviceType, Scripted<DeviceBatch>>>,
    results: Mutex<HashMap<String, Scripted<GameResult>>>,
    delete: Mutex<Option<Scripted<()>>>,
    pub history_calls: AtomicUsize,
    pub device_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_history(&self, delay: Duration, response: Scripted<PowerSample>) {
        self.history.lock().await.push_back((delay, response));
    }

    pub async fn set_devices(&self, device_type: DeviceType, response: Scripted<DeviceBatch>) {
        self.devices.lock().await.insert(device_type, response);
    }

    pub async fn set_result(&self, session_id: &str, response: Scripted<GameResult>) {
        self.results
            .lock()
            .await
            .insert(session_id.to_string(), response);
    }

    pub async fn set_delete(&self, response: Scripted<()>) {
        *self.delete.lock().await = Some(response);
    }
}

pub fn device(id: &str, device_type: DeviceType, lat: &str, lon: &str) -> Device {
    Device {
        device_id: id.to_string(),
        device_type: device_type.as_str().to_string(),
        power: Some(5.0),
        gps_lat: lat.to_string(),
        gps_lon: lon.to_string(),
    }
}

pub fn history(labels: &[&str], total_power: Option<f64>) -> PowerSample {
    let n = labels.len();
    PowerSample {
        time_labels: labels.iter().map(|s| s.to_string()).collect(),
        geothermal: vec![1.0; n],
        hydro: vec![2.0; n],
        wind: vec![3.0; n],
        solar: vec![4.0; n],
        total_power,
    }
}

#[async_trait]
impl TelemetryApi for FakeApi {
    async fn latest_power(
        &self,
        device_type: DeviceType,
        _session_id: &str,
    ) -> Result<LatestPower, ApiError> {
        Ok(LatestPower {
            latest_power: match device_type {
                DeviceType::Wind => 120.0,
                _ => 0.0,
            },
            gps_lat: "35.1".to_string(),
            gps_lon: "137.1".to_string(),
        })
    }

    async fn latest_devices(
        &self,
        device_type: DeviceType,
        _session_id: &str,
    ) -> Result<DeviceBatch, ApiError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        self.devices
            .lock()
            .await
            .get(&device_type)
            .cloned()
            .unwrap_or(Scripted::Ok(DeviceBatch::default()))
            .into_result()
    }

    async fn power_history(&self, _session_id: &str) -> Result<PowerSample, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, response) = {
            let mut queue = self.history.lock().await;
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        }
        .unwrap_or((Duration::ZERO, Scripted::Ok(PowerSample::empty())));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response.into_result()
    }

    async fn game_result(&self, session_id: &str) -> Result<GameResult, ApiError> {
        self.results
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or(Scripted::Status(404, "unknown session".to_string()))
            .into_result()
    }

    async fn delete_session(&self, _session_id: &str, _password: &str) -> Result<(), ApiError> {
        self.delete
            .lock()
            .await
            .clone()
            .unwrap_or(Scripted::Ok(()))
            .into_result()
    }
}
