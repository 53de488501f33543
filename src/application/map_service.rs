// Device board poller - live map markers and per-type gauges for one session
use crate::application::telemetry_api::TelemetryApi;
use crate::domain::device::{DeviceType, GaugeRange};
use crate::domain::markers::{DevicePoll, MarkerRegistry, MarkerSpec, MarkerSurface};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A marker as drawn on the map. `marker_id` is stable for the lifetime of
/// the marker, across position and popup updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerView {
    pub marker_id: u64,
    pub device_id: String,
    pub device_type: String,
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    pub popup: String,
}

/// Owned by the registry; the only way to move or remove a marker.
#[derive(Debug)]
pub struct MarkerHandle(u64);

/// In-memory map layer the registry draws on.
#[derive(Debug, Default)]
pub struct MapLayer {
    next_id: u64,
    markers: BTreeMap<u64, MarkerView>,
}

impl MapLayer {
    pub fn markers(&self) -> Vec<MarkerView> {
        self.markers.values().cloned().collect()
    }
}

impl MarkerSurface for MapLayer {
    type Handle = MarkerHandle;

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle {
        self.next_id += 1;
        self.markers.insert(
            self.next_id,
            MarkerView {
                marker_id: self.next_id,
                device_id: spec.device_id.clone(),
                device_type: spec.device_type.clone(),
                lat: spec.lat,
                lon: spec.lon,
                color: spec.color,
                popup: spec.popup.clone(),
            },
        );
        MarkerHandle(self.next_id)
    }

    fn update_marker(&mut self, handle: &mut MarkerHandle, spec: &MarkerSpec) {
        if let Some(marker) = self.markers.get_mut(&handle.0) {
            marker.lat = spec.lat;
            marker.lon = spec.lon;
            marker.popup = spec.popup.clone();
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeReading {
    pub device_type: DeviceType,
    pub value: f64,
    pub range: GaugeRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub markers: Vec<MarkerView>,
    pub gauges: Vec<GaugeReading>,
    /// Sum of `totalPower` over the device types fetched in the last poll.
    pub grand_total_power: f64,
    pub failed_types: Vec<DeviceType>,
}

#[derive(Default)]
struct BoardState {
    registry: MarkerRegistry<MarkerHandle>,
    layer: MapLayer,
    gauges: HashMap<DeviceType, f64>,
    grand_total_power: f64,
    failed_types: Vec<DeviceType>,
}

impl BoardState {
    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            markers: self.layer.markers(),
            gauges: DeviceType::ALL
                .iter()
                .map(|&t| GaugeReading {
                    device_type: t,
                    value: self.gauges.get(&t).copied().unwrap_or(0.0),
                    range: t.gauge_range(),
                })
                .collect(),
            grand_total_power: self.grand_total_power,
            failed_types: self.failed_types.clone(),
        }
    }
}

struct Shared {
    session_id: String,
    api: Arc<dyn TelemetryApi>,
    state: Mutex<BoardState>,
    updates: watch::Sender<BoardSnapshot>,
}

/// Map and gauges for one session, refreshed on its own timer.
pub struct DeviceBoard {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl DeviceBoard {
    pub fn spawn(api: Arc<dyn TelemetryApi>, session_id: String, period: Duration) -> Self {
        let state = BoardState::default();
        let (updates, _) = watch::channel(state.snapshot());

        let shared = Arc::new(Shared {
            session_id,
            api,
            state: Mutex::new(state),
            updates,
        });

        let task = tokio::spawn(run(shared.clone(), period));
        Self { shared, task }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.shared.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.shared.updates.subscribe()
    }
}

impl Drop for DeviceBoard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        shared.poll_cycle().await;
    }
}

impl Shared {
    async fn poll_cycle(&self) {
        let mut poll = DevicePoll::default();
        let mut totals: Vec<(DeviceType, Option<f64>)> = Vec::new();
        let mut failed: Vec<DeviceType> = Vec::new();

        for device_type in DeviceType::ALL {
            match self.api.latest_devices(device_type, &self.session_id).await {
                Ok(batch) => {
                    totals.push((device_type, batch.total_power));
                    poll.reports.push((device_type, batch.devices));
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch {} devices for {}: {}",
                        device_type.as_str(),
                        self.session_id,
                        e
                    );
                    failed.push(device_type);
                }
            }
        }

        let snapshot = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let plan = state.registry.sync(&poll, &mut state.layer);
            tracing::debug!(
                "Markers for {}: +{} ~{} -{}",
                self.session_id,
                plan.to_add.len(),
                plan.to_update.len(),
                plan.to_remove.len()
            );

            let mut grand_total = 0.0;
            for (device_type, total) in totals {
                match total {
                    Some(value) => {
                        state.gauges.insert(device_type, value);
                        grand_total += value;
                    }
                    None => tracing::warn!(
                        "[{}] Invalid totalPower in response for {}",
                        device_type.as_str(),
                        self.session_id
                    ),
                }
            }
            state.grand_total_power = grand_total;
            state.failed_types = failed;

            tracing::debug!("Grand total power for {}: {}", self.session_id, grand_total);
            state.snapshot()
        };

        self.updates.send_replace(snapshot);
    }
}
