// Recording chart poller - drives a RecordingController from the power history endpoint
use crate::application::telemetry_api::TelemetryApi;
use crate::domain::power::PowerSample;
use crate::domain::recording::{Applied, PollOutcome, PollTicket, RecordingController, RecordingMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    Start,
    Stop,
    Clear,
    FullView,
}

impl RecordingCommand {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "start" => Some(RecordingCommand::Start),
            "stop" => Some(RecordingCommand::Stop),
            "clear" => Some(RecordingCommand::Clear),
            "full-view" => Some(RecordingCommand::FullView),
            _ => None,
        }
    }
}

/// What the chart shows right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub mode: RecordingMode,
    pub start_time: Option<DateTime<Utc>>,
    pub total_power: f64,
    pub error: Option<String>,
    /// Displayed series, padded for drawing. `None` until the first
    /// successful poll and after a clear.
    pub series: Option<PowerSample>,
}

impl ChartSnapshot {
    fn of(controller: &RecordingController) -> Self {
        Self {
            mode: controller.mode(),
            start_time: controller.start_time(),
            total_power: controller.total_power(),
            error: controller.error().map(str::to_string),
            series: controller.displayed().map(PowerSample::padded),
        }
    }
}

struct Shared {
    session_id: String,
    api: Arc<dyn TelemetryApi>,
    controller: Mutex<RecordingController>,
    updates: watch::Sender<ChartSnapshot>,
    wake: Notify,
}

/// One chart instance: owns its controller and its poll timer. Dropping it
/// stops the timer; fetches already in flight are left to finish.
pub struct RecordingSession {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl RecordingSession {
    pub fn spawn(api: Arc<dyn TelemetryApi>, session_id: String, period: Duration) -> Self {
        let controller = RecordingController::new();
        let (updates, _) = watch::channel(ChartSnapshot::of(&controller));

        let shared = Arc::new(Shared {
            session_id,
            api,
            controller: Mutex::new(controller),
            updates,
            wake: Notify::new(),
        });

        let task = tokio::spawn(run(shared.clone(), period));
        Self { shared, task }
    }

    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    pub async fn command(&self, command: RecordingCommand, now: DateTime<Utc>) -> ChartSnapshot {
        let (snapshot, fetch_now) = {
            let mut controller = self.shared.controller.lock().await;
            let fetch_now = match command {
                RecordingCommand::Start => {
                    controller.start(now);
                    true
                }
                RecordingCommand::Stop => {
                    controller.stop();
                    false
                }
                RecordingCommand::Clear => {
                    controller.clear();
                    false
                }
                RecordingCommand::FullView => controller.full_view(),
            };
            (ChartSnapshot::of(&controller), fetch_now)
        };

        tracing::info!(
            "Chart for session {}: {:?} -> {:?}",
            self.shared.session_id,
            command,
            snapshot.mode
        );

        self.shared.updates.send_replace(snapshot.clone());
        if fetch_now {
            self.shared.wake.notify_one();
        }
        snapshot
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        self.shared.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChartSnapshot> {
        self.shared.updates.subscribe()
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shared.wake.notified() => ticker.reset(),
        }

        let Some(ticket) = shared.controller.lock().await.begin_poll() else {
            continue;
        };

        // each tick gets its own request; a slow one does not hold up the next
        let shared = shared.clone();
        tokio::spawn(async move { shared.poll_once(ticket).await });
    }
}

impl Shared {
    async fn poll_once(&self, ticket: PollTicket) {
        let outcome = match self.api.power_history(&self.session_id).await {
            Ok(sample) => PollOutcome::Snapshot(sample),
            Err(e) => {
                tracing::warn!("Power history fetch for {} failed: {}", self.session_id, e);
                PollOutcome::Failed(e.to_string())
            }
        };

        let snapshot = {
            let mut controller = self.controller.lock().await;
            match controller.apply(ticket, outcome) {
                Applied::Updated => ChartSnapshot::of(&controller),
                Applied::Stale => {
                    tracing::debug!("Dropping stale power history for {}", self.session_id);
                    return;
                }
            }
        };

        self.updates.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{history, FakeApi, Scripted};

    const PERIOD: Duration = Duration::from_secs(3);

    async fn next_change(rx: &mut watch::Receiver<ChartSnapshot>) -> ChartSnapshot {
        tokio::time::timeout(Duration::from_secs(30), rx.changed())
            .await
            .expect("snapshot update")
            .expect("sender alive");
        rx.borrow_and_update().clone()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_happens_on_spawn() {
        let api = Arc::new(FakeApi::new());
        api.push_history(
            Duration::ZERO,
            Scripted::Ok(history(&["2024-01-01T00:00:00Z", "2024-01-01T00:00:03Z"], Some(9.5))),
        )
        .await;

        let session = RecordingSession::spawn(api.clone(), "s1".to_string(), PERIOD);
        let mut rx = session.subscribe();
        let snapshot = next_change(&mut rx).await;

        assert_eq!(snapshot.mode, RecordingMode::FullView);
        assert_eq!(snapshot.series.unwrap().len(), 2);
        assert_eq!(snapshot.total_power, 9.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_point_is_padded_in_snapshot() {
        let api = Arc::new(FakeApi::new());
        api.push_history(
            Duration::ZERO,
            Scripted::Ok(history(&["2024-01-01T00:00:00Z"], None)),
        )
        .await;

        let session = RecordingSession::spawn(api, "s1".to_string(), PERIOD);
        let mut rx = session.subscribe();
        let series = next_change(&mut rx).await.series.unwrap();

        assert_eq!(series.time_labels[0], "2023-12-31T23:59:00.000Z");
        assert_eq!(series.geothermal, vec![0.0, 1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_polling() {
        let api = Arc::new(FakeApi::new());
        api.push_history(Duration::ZERO, Scripted::Ok(history(&["2024-01-01T00:00:00Z"], None)))
            .await;

        let session = RecordingSession::spawn(api.clone(), "s1".to_string(), PERIOD);
        let mut rx = session.subscribe();
        next_change(&mut rx).await;

        session.command(RecordingCommand::Stop, Utc::now()).await;
        let calls = api.history_calls.load(std::sync::atomic::Ordering::SeqCst);

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(
            api.history_calls.load(std::sync::atomic::Ordering::SeqCst),
            calls
        );
        assert_eq!(session.snapshot().mode, RecordingMode::Stopped);
        assert!(session.snapshot().series.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fetches_immediately_and_filters() {
        let api = Arc::new(FakeApi::new());
        api.push_history(
            Duration::ZERO,
            Scripted::Ok(history(
                &["2024-01-01T00:00:00Z", "2024-01-01T00:00:03Z", "2024-01-01T00:00:06Z"],
                None,
            )),
        )
        .await;

        let session = RecordingSession::spawn(api.clone(), "s1".to_string(), Duration::from_secs(3600));
        let mut rx = session.subscribe();
        next_change(&mut rx).await;

        session.command(RecordingCommand::Start, at("2024-01-01T00:00:04Z")).await;
        // the command itself publishes once
        let commanded = next_change(&mut rx).await;
        assert_eq!(commanded.mode, RecordingMode::Recording);
        assert_eq!(
            commanded.series.unwrap().time_labels.last().map(String::as_str),
            Some("2024-01-01T00:00:06Z")
        );

        let polled = next_change(&mut rx).await;
        assert_eq!(
            polled.series.unwrap().time_labels,
            vec!["2023-12-31T23:59:06.000Z".to_string(), "2024-01-01T00:00:06Z".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_surfaces_error_then_recovers() {
        let api = Arc::new(FakeApi::new());
        api.push_history(Duration::ZERO, Scripted::Status(500, "boom".to_string())).await;
        api.push_history(Duration::ZERO, Scripted::Ok(history(&["2024-01-01T00:00:00Z"], None)))
            .await;

        let session = RecordingSession::spawn(api, "s1".to_string(), PERIOD);
        let mut rx = session.subscribe();

        let failed = next_change(&mut rx).await;
        assert_eq!(failed.error.as_deref(), Some("HTTP error! status: 500"));

        let recovered = next_change(&mut rx).await;
        assert!(recovered.error.is_none());
        assert!(recovered.series.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_does_not_overwrite_newer_state() {
        let api = Arc::new(FakeApi::new());
        // the mount poll is slow and returns old data
        api.push_history(
            Duration::from_secs(10),
            Scripted::Ok(history(&["2024-01-01T00:00:00Z", "2024-01-01T00:00:03Z"], None)),
        )
        .await;
        api.push_history(Duration::ZERO, Scripted::Ok(history(&["2024-01-01T00:00:09Z"], None)))
            .await;

        let session = RecordingSession::spawn(api, "s1".to_string(), Duration::from_secs(3600));
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        session.command(RecordingCommand::Start, at("2024-01-01T00:00:00Z")).await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, RecordingMode::Recording);
        let series = snapshot.series.unwrap();
        assert_eq!(series.time_labels.last().unwrap(), "2024-01-01T00:00:09Z");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(RecordingCommand::parse("full-view"), Some(RecordingCommand::FullView));
        assert_eq!(RecordingCommand::parse("pause"), None);
    }
}
