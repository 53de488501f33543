// Recording controller - start/stop/clear/full-view state machine for a power chart
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::power::PowerSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingMode {
    /// Whole unfiltered history, polling.
    FullView,
    /// History since `start_time`, polling.
    Recording,
    /// Frozen on the last displayed series, not polling.
    Stopped,
    /// Nothing displayed, not polling, no start time.
    Cleared,
}

impl RecordingMode {
    pub fn is_polling(&self) -> bool {
        matches!(self, RecordingMode::FullView | RecordingMode::Recording)
    }
}

/// Issued when a poll begins; the response is only applied if the ticket is
/// still current when it comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    seq: u64,
    epoch: u64,
}

/// Result of one history fetch, as seen by the controller.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Snapshot(PowerSample),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The ticket predates a mode change or a newer applied response.
    Stale,
}

#[derive(Debug, Clone)]
pub struct RecordingController {
    mode: RecordingMode,
    start_time: Option<DateTime<Utc>>,
    cached: Option<PowerSample>,
    // last successful payload, unfiltered, so a mode change can re-project it
    latest: Option<PowerSample>,
    total_power: f64,
    error: Option<String>,
    // bumped on every transition that changes what a response would mean
    epoch: u64,
    next_seq: u64,
    last_applied_seq: u64,
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingController {
    pub fn new() -> Self {
        Self {
            mode: RecordingMode::FullView,
            start_time: None,
            cached: None,
            latest: None,
            total_power: 0.0,
            error: None,
            epoch: 0,
            next_seq: 1,
            last_applied_seq: 0,
        }
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Series currently on screen; `None` before the first successful poll
    /// or after a clear.
    pub fn displayed(&self) -> Option<&PowerSample> {
        self.cached.as_ref()
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        let changed = self.mode != RecordingMode::Recording || self.start_time.is_none();
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.mode = RecordingMode::Recording;
        if changed {
            self.epoch += 1;
            self.cached = self.latest.as_ref().map(|s| self.view_of(s));
        }
    }

    pub fn stop(&mut self) {
        if self.mode.is_polling() {
            self.mode = RecordingMode::Stopped;
            self.epoch += 1;
        }
    }

    pub fn clear(&mut self) {
        if self.mode == RecordingMode::Cleared {
            return;
        }
        self.mode = RecordingMode::Cleared;
        self.start_time = None;
        self.cached = None;
        self.latest = None;
        self.error = None;
        self.epoch += 1;
    }

    /// Returns true when the caller should fetch immediately.
    pub fn full_view(&mut self) -> bool {
        if self.mode == RecordingMode::FullView {
            return false;
        }
        self.mode = RecordingMode::FullView;
        self.epoch += 1;
        self.cached = self.latest.clone();
        true
    }

    /// Hand out a ticket for a new fetch, or `None` when polling is halted.
    pub fn begin_poll(&mut self) -> Option<PollTicket> {
        if !self.mode.is_polling() {
            return None;
        }
        let ticket = PollTicket {
            seq: self.next_seq,
            epoch: self.epoch,
        };
        self.next_seq += 1;
        Some(ticket)
    }

    pub fn apply(&mut self, ticket: PollTicket, outcome: PollOutcome) -> Applied {
        if ticket.epoch != self.epoch
            || ticket.seq <= self.last_applied_seq
            || !self.mode.is_polling()
        {
            return Applied::Stale;
        }
        self.last_applied_seq = ticket.seq;

        match outcome {
            PollOutcome::Failed(message) => {
                self.error = Some(message);
            }
            PollOutcome::Snapshot(sample) => {
                self.error = None;
                self.cached = Some(self.project(sample));
            }
        }
        Applied::Updated
    }

    fn project(&mut self, sample: PowerSample) -> PowerSample {
        if sample.is_empty() {
            self.latest = Some(PowerSample::empty());
            return PowerSample::empty();
        }

        if let Some(total) = sample.total_power {
            self.total_power = total;
        }

        let sample = sample.normalized();
        let view = self.view_of(&sample);
        self.latest = Some(sample);
        view
    }

    fn view_of(&self, sample: &PowerSample) -> PowerSample {
        match (self.mode, self.start_time) {
            (RecordingMode::Recording, Some(start)) => sample.since(start),
            _ => sample.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn history(labels: &[&str]) -> PowerSample {
        let n = labels.len();
        PowerSample {
            time_labels: labels.iter().map(|s| s.to_string()).collect(),
            geothermal: vec![1.0; n],
            hydro: vec![2.0; n],
            wind: vec![3.0; n],
            solar: vec![4.0; n],
            total_power: Some(42.0),
        }
    }

    fn poll(controller: &mut RecordingController, sample: PowerSample) -> Applied {
        let ticket = controller.begin_poll().expect("polling");
        controller.apply(ticket, PollOutcome::Snapshot(sample))
    }

    const LABELS: [&str; 3] = [
        "2024-01-01T00:00:00Z",
        "2024-01-01T00:00:03Z",
        "2024-01-01T00:00:06Z",
    ];

    #[test]
    fn test_initial_state_is_full_view() {
        let c = RecordingController::new();
        assert_eq!(c.mode(), RecordingMode::FullView);
        assert_eq!(c.start_time(), None);
        assert!(c.displayed().is_none());
    }

    #[test]
    fn test_full_view_displays_verbatim() {
        let mut c = RecordingController::new();
        assert_eq!(poll(&mut c, history(&LABELS)), Applied::Updated);
        assert_eq!(c.displayed().unwrap().len(), 3);
        assert_eq!(c.total_power(), 42.0);
    }

    #[test]
    fn test_recording_filters_from_start_time() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:02Z"));
        poll(&mut c, history(&LABELS));

        let shown = c.displayed().unwrap();
        assert_eq!(shown.time_labels, vec![LABELS[1], LABELS[2]]);
        assert_eq!(shown.solar, vec![4.0, 4.0]);
    }

    #[test]
    fn test_start_filters_displayed_series_immediately() {
        let mut c = RecordingController::new();
        poll(&mut c, history(&LABELS));
        c.start(at("2024-01-01T00:00:05Z"));

        assert_eq!(c.mode(), RecordingMode::Recording);
        assert_eq!(c.displayed().unwrap().time_labels, vec![LABELS[2]]);
    }

    #[test]
    fn test_full_view_restores_unfiltered_series_immediately() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:05Z"));
        poll(&mut c, history(&LABELS));
        assert_eq!(c.displayed().unwrap().len(), 1);

        c.stop();
        assert!(c.full_view());
        assert_eq!(c.displayed().unwrap().len(), 3);
    }

    #[test]
    fn test_start_keeps_existing_start_time() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:02Z"));
        c.stop();
        c.start(at("2024-01-01T01:00:00Z"));
        assert_eq!(c.start_time(), Some(at("2024-01-01T00:00:02Z")));
    }

    #[test]
    fn test_stop_freezes_and_halts_polling() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:00Z"));
        poll(&mut c, history(&LABELS));
        c.stop();

        assert_eq!(c.mode(), RecordingMode::Stopped);
        assert!(c.begin_poll().is_none());
        assert_eq!(c.displayed().unwrap().len(), 3);
    }

    #[test]
    fn test_full_view_is_idempotent() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:02Z"));
        c.full_view();
        let once = (c.mode(), c.start_time(), c.epoch);
        assert!(!c.full_view());
        assert_eq!((c.mode(), c.start_time(), c.epoch), once);
        assert_eq!(c.start_time(), Some(at("2024-01-01T00:00:02Z")));
    }

    #[test]
    fn test_clear_resets_fully() {
        let mut c = RecordingController::new();
        c.start(at("2024-01-01T00:00:02Z"));
        poll(&mut c, history(&LABELS));
        c.clear();

        assert_eq!(c.mode(), RecordingMode::Cleared);
        assert_eq!(c.start_time(), None);
        assert!(c.displayed().is_none());
        assert!(c.begin_poll().is_none());

        c.start(at("2024-01-01T00:00:05Z"));
        assert_eq!(c.start_time(), Some(at("2024-01-01T00:00:05Z")));
        assert!(c.displayed().is_none());

        poll(&mut c, history(&LABELS));
        assert_eq!(c.displayed().unwrap().time_labels, vec![LABELS[2]]);
    }

    #[test]
    fn test_empty_payload_shows_empty_series() {
        let mut c = RecordingController::new();
        poll(&mut c, history(&LABELS));
        poll(&mut c, PowerSample::empty());

        assert!(c.displayed().unwrap().is_empty());
        assert!(c.error().is_none());
        // total from the earlier payload is kept
        assert_eq!(c.total_power(), 42.0);
    }

    #[test]
    fn test_failure_sets_error_until_next_success() {
        let mut c = RecordingController::new();
        let ticket = c.begin_poll().unwrap();
        c.apply(ticket, PollOutcome::Failed("HTTP error! status: 500".into()));
        assert_eq!(c.error(), Some("HTTP error! status: 500"));

        poll(&mut c, history(&LABELS));
        assert!(c.error().is_none());
    }

    #[test]
    fn test_out_of_order_response_is_dropped() {
        let mut c = RecordingController::new();
        let slow = c.begin_poll().unwrap();
        let fast = c.begin_poll().unwrap();

        assert_eq!(
            c.apply(fast, PollOutcome::Snapshot(history(&LABELS))),
            Applied::Updated
        );
        assert_eq!(
            c.apply(slow, PollOutcome::Snapshot(history(&LABELS[..1]))),
            Applied::Stale
        );
        assert_eq!(c.displayed().unwrap().len(), 3);
    }

    #[test]
    fn test_response_after_mode_change_is_dropped() {
        let mut c = RecordingController::new();
        let in_flight = c.begin_poll().unwrap();
        c.start(at("2024-01-01T00:00:05Z"));

        assert_eq!(
            c.apply(in_flight, PollOutcome::Snapshot(history(&LABELS))),
            Applied::Stale
        );

        let in_flight = c.begin_poll().unwrap();
        c.stop();
        assert_eq!(
            c.apply(in_flight, PollOutcome::Snapshot(history(&LABELS))),
            Applied::Stale
        );
        assert!(c.displayed().is_none());
    }
}
