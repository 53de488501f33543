// Localized view models rendered from application snapshots
use crate::application::map_service::{BoardSnapshot, GaugeReading, MarkerView};
use crate::application::recording_service::ChartSnapshot;
use crate::application::result_service::{HistoryState, TeamResult};
use crate::domain::device::{DeviceType, LatestPower};
use crate::domain::game_result::GameResult;
use crate::domain::i18n::Translator;
use crate::domain::power::{EnergyMix, PowerSample, PowerSource};
use crate::domain::recording::RecordingMode;
use crate::domain::settings::TeamSlot;
use crate::domain::time_label::shift_time_label_by_hours;
use crate::infrastructure::config::MapSettings;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity of the team a view belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamHeader {
    pub team: u8,
    pub team_name: String,
    pub session_id: String,
}

impl TeamHeader {
    pub fn new(slot: TeamSlot, team_name: &str, session_id: &str) -> Self {
        Self {
            team: slot.number(),
            team_name: team_name.to_string(),
            session_id: session_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetView {
    pub source: PowerSource,
    pub label: String,
    pub color: &'static str,
    pub data: Vec<f64>,
}

/// Series ready for a line chart: raw labels, shifted display labels and
/// one dataset per power source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub time_labels: Vec<String>,
    pub display_labels: Vec<String>,
    pub datasets: Vec<DatasetView>,
}

impl SeriesView {
    pub fn render(sample: &PowerSample, tr: &Translator, offset_hours: i64) -> Self {
        Self {
            time_labels: sample.time_labels.clone(),
            display_labels: sample
                .time_labels
                .iter()
                .map(|label| shift_time_label_by_hours(label, offset_hours))
                .collect(),
            datasets: PowerSource::ALL
                .iter()
                .map(|&source| DatasetView {
                    source,
                    label: tr.t(source.label_key()),
                    color: source.color(),
                    data: sample.series(source).to_vec(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonLabels {
    pub start: String,
    pub stop: String,
    pub clear: String,
    pub full_view: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    #[serde(flatten)]
    pub header: TeamHeader,
    pub mode: RecordingMode,
    pub start_time: Option<DateTime<Utc>>,
    pub total_power: f64,
    pub total_power_label: String,
    pub loading: bool,
    pub error: Option<ErrorView>,
    pub title: String,
    pub axis: AxisLabels,
    pub buttons: ButtonLabels,
    pub series: Option<SeriesView>,
}

impl ChartView {
    pub fn render(
        header: &TeamHeader,
        snapshot: &ChartSnapshot,
        tr: &Translator,
        offset_hours: i64,
    ) -> Self {
        let total = format!("{:.2}", snapshot.total_power);
        Self {
            header: header.clone(),
            mode: snapshot.mode,
            start_time: snapshot.start_time,
            total_power: snapshot.total_power,
            total_power_label: tr.translate("chart.totalPower", &[("value", &total)]),
            loading: snapshot.series.is_none()
                && snapshot.error.is_none()
                && snapshot.mode.is_polling(),
            error: snapshot.error.as_ref().map(|message| ErrorView {
                title: tr.t("chart.errorTitle"),
                message: message.clone(),
            }),
            title: tr.t("chart.title"),
            axis: axis_labels(tr),
            buttons: ButtonLabels {
                start: tr.t("chart.buttons.start"),
                stop: tr.t("chart.buttons.stop"),
                clear: tr.t("chart.buttons.clear"),
                full_view: tr.t("chart.buttons.fullView"),
            },
            // an error replaces the chart until the next successful poll
            series: snapshot
                .series
                .as_ref()
                .filter(|_| snapshot.error.is_none())
                .map(|s| SeriesView::render(s, tr, offset_hours)),
        }
    }
}

fn axis_labels(tr: &Translator) -> AxisLabels {
    AxisLabels {
        x: tr.t("chart.axis.time"),
        y: tr.t("chart.axis.power"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    #[serde(flatten)]
    pub header: TeamHeader,
    pub center: MapCenter,
    pub zoom: u8,
    pub markers: Vec<MarkerView>,
    pub grand_total_power: f64,
    pub failed_types: Vec<DeviceType>,
}

impl MapView {
    pub fn render(header: TeamHeader, board: BoardSnapshot, map: &MapSettings) -> Self {
        Self {
            header,
            center: MapCenter {
                lat: map.center_lat,
                lon: map.center_lon,
            },
            zoom: map.zoom,
            markers: board.markers,
            grand_total_power: board.grand_total_power,
            failed_types: board.failed_types,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeView {
    pub device_type: DeviceType,
    pub label: String,
    pub value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub ticks: Vec<f64>,
}

impl GaugeView {
    fn render(reading: &GaugeReading, tr: &Translator) -> Self {
        Self {
            device_type: reading.device_type,
            label: tr.t(reading.device_type.label_key()),
            value: reading.value,
            min_value: reading.range.min_value,
            max_value: reading.range.max_value,
            ticks: reading.range.ticks(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugesView {
    #[serde(flatten)]
    pub header: TeamHeader,
    pub title: String,
    pub gauges: Vec<GaugeView>,
}

impl GaugesView {
    pub fn render(header: TeamHeader, board: &BoardSnapshot, tr: &Translator) -> Self {
        Self {
            title: tr.translate("dashboard.section.teamTitle", &[("teamName", &header.team_name)]),
            header,
            gauges: board.gauges.iter().map(|g| GaugeView::render(g, tr)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPowerView {
    #[serde(flatten)]
    pub header: TeamHeader,
    pub device_type: DeviceType,
    pub label: String,
    #[serde(flatten)]
    pub reading: LatestPower,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyShareView {
    pub source: PowerSource,
    pub label: String,
    pub color: &'static str,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMixView {
    pub title: String,
    pub total_label: String,
    pub total: f64,
    pub shares: Vec<EnergyShareView>,
}

impl EnergyMixView {
    fn render(mix: &EnergyMix, tr: &Translator) -> Self {
        Self {
            title: tr.t("result.summary.energyMixTitle"),
            total_label: tr.t("result.summary.totalPowerLabel"),
            total: mix.total,
            shares: mix
                .shares
                .iter()
                .map(|share| EnergyShareView {
                    source: share.source,
                    label: tr.t(share.source.label_key()),
                    color: share.source.color(),
                    total: share.total,
                    percent: share.percent,
                })
                .collect(),
        }
    }
}

/// The result chart has no recording controls: it is loaded, empty or failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultChartView {
    pub title: String,
    pub axis: AxisLabels,
    pub series: Option<SeriesView>,
    pub no_data: Option<String>,
    pub error: Option<ErrorView>,
}

impl ResultChartView {
    fn render(history: &HistoryState, tr: &Translator, offset_hours: i64) -> Self {
        let mut view = Self {
            title: tr.t("chart.title"),
            axis: axis_labels(tr),
            series: None,
            no_data: None,
            error: None,
        };
        match history {
            HistoryState::Loaded(sample) => {
                view.series = Some(SeriesView::render(sample, tr, offset_hours));
            }
            HistoryState::NoData => view.no_data = Some(tr.t("chart.noData")),
            HistoryState::Failed(message) => {
                view.error = Some(ErrorView {
                    title: tr.t("chart.resultErrorTitle"),
                    message: message.clone(),
                });
            }
        }
        view
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HappinessLabels {
    pub title: String,
    pub environment: String,
    pub power: String,
    pub infrastructure: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResultView {
    #[serde(flatten)]
    pub header: TeamHeader,
    pub heading: String,
    pub result: GameResult,
    pub peak_instantaneous_power: f64,
    pub complaint_count: u32,
    pub complaint_label: String,
    pub energy_mix: Option<EnergyMixView>,
    pub chart: ResultChartView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub max_instant_title: String,
    pub co2_title: String,
    pub happiness: HappinessLabels,
    pub villager_title: String,
    pub teams: Vec<TeamResultView>,
}

impl ResultView {
    pub fn render(teams: Vec<TeamResult>, tr: &Translator, offset_hours: i64) -> Self {
        Self {
            max_instant_title: tr.t("result.summary.maxInstantTitle"),
            co2_title: tr.t("result.team.co2Title"),
            happiness: HappinessLabels {
                title: tr.t("result.team.happinessTitle"),
                environment: tr.t("result.team.happiness.environment"),
                power: tr.t("result.team.happiness.power"),
                infrastructure: tr.t("result.team.happiness.infrastructure"),
            },
            villager_title: tr.t("result.villagerTitle"),
            teams: teams
                .into_iter()
                .map(|team| {
                    let count = team.result.complaint_count();
                    TeamResultView {
                        heading: tr.translate("result.team.heading", &[("teamName", &team.team_name)]),
                        header: TeamHeader {
                            team: team.slot,
                            team_name: team.team_name,
                            session_id: team.session_id,
                        },
                        peak_instantaneous_power: team.result.peak_instantaneous_power(),
                        complaint_count: count,
                        complaint_label: tr
                            .translate("result.team.complaintCount", &[("count", &count.to_string())]),
                        energy_mix: team.energy_mix.as_ref().map(|mix| EnergyMixView::render(mix, tr)),
                        chart: ResultChartView::render(&team.history, tr, offset_hours),
                        result: team.result,
                    }
                })
                .collect(),
        }
    }
}
