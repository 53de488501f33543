// HTTP request handlers
use crate::application::dashboard_service::TeamPollers;
use crate::application::recording_service::RecordingCommand;
use crate::domain::device::DeviceType;
use crate::domain::i18n::Translator;
use crate::domain::settings::{TeamInput, TeamSlot};
use crate::infrastructure::chunked_json::{chunked_json_stream, rendered_updates};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use crate::presentation::views::{
    ChartView, GaugesView, LatestPowerView, MapView, ResultView, TeamHeader,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct ResultQuery {
    pub from: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionRequest {
    pub session_id: String,
    pub password: String,
}

#[derive(Serialize)]
struct Message {
    ok: bool,
    message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Compression is applied per response, so no CompressionLayer here.
    Router::new()
        .route("/healthz", get(health_check))
        .route(
            "/settings",
            get(get_settings).put(save_settings).delete(reset_settings),
        )
        .route("/settings/language/toggle", post(toggle_language))
        .route("/teams/:team/chart", get(get_chart))
        .route("/teams/:team/chart/stream", get(stream_chart))
        .route("/teams/:team/recording/:action", post(recording_command))
        .route("/teams/:team/map", get(get_map))
        .route("/teams/:team/gauges", get(get_gauges))
        .route("/teams/:team/latest/:device_type", get(get_latest_power))
        .route("/result", get(get_result))
        .route("/sessions/delete", post(delete_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Result<Response, AppError> {
    json_response(StatusCode::OK, data, accepts_brotli(headers))
        .await
        .map_err(AppError::Encoding)
}

fn parse_team(team: &str) -> Result<TeamSlot, AppError> {
    team.parse::<u8>()
        .ok()
        .and_then(TeamSlot::from_number)
        .ok_or_else(|| AppError::NotFound(format!("unknown team: {}", team)))
}

async fn pollers(
    state: &AppState,
    team: &str,
    tr: &Translator,
) -> Result<Arc<TeamPollers>, AppError> {
    let slot = parse_team(team)?;
    state
        .dashboard
        .team(slot)
        .await
        .ok_or_else(|| AppError::NotConfigured(tr.t("dashboard.alert.fillAll")))
}

fn header_of(team: &TeamPollers) -> TeamHeader {
    TeamHeader::new(team.slot, &team.team_name, &team.session_id)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_settings(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    respond(&headers, &state.dashboard.settings().await).await
}

pub async fn save_settings(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TeamInput>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let saved = state
        .dashboard
        .save(input)
        .await
        .map_err(|e| AppError::settings(e, &tr))?;
    respond(&headers, &saved).await
}

pub async fn reset_settings(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let cleared = state
        .dashboard
        .reset()
        .await
        .map_err(|e| AppError::settings(e, &tr))?;
    respond(&headers, &cleared).await
}

pub async fn toggle_language(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let language = state
        .dashboard
        .toggle_language()
        .await
        .map_err(|e| AppError::settings(e, &tr))?;
    respond(&headers, &serde_json::json!({ "language": language })).await
}

/// Current recording chart for one team
pub async fn get_chart(
    Path(team): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let team = pollers(&state, &team, &tr).await?;
    let view = ChartView::render(
        &header_of(&team),
        &team.chart.snapshot(),
        &tr,
        state.display_offset_hours,
    );
    respond(&headers, &view).await
}

/// Stream chart updates as NDJSON until the team's pollers are replaced
pub async fn stream_chart(
    Path(team): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let team = pollers(&state, &team, &tr).await?;
    let header = header_of(&team);
    let offset_hours = state.display_offset_hours;

    // hold only the receiver so the stream ends when the session is dropped
    let updates = rendered_updates(team.chart.subscribe(), move |snapshot| {
        ChartView::render(&header, snapshot, &tr, offset_hours)
    });
    chunked_json_stream(updates).map_err(AppError::Encoding)
}

pub async fn recording_command(
    Path((team, action)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let command = RecordingCommand::parse(&action)
        .ok_or_else(|| AppError::NotFound(format!("unknown recording action: {}", action)))?;
    let tr = state.dashboard.translator().await;
    let team = pollers(&state, &team, &tr).await?;

    tracing::info!("Team {} recording command {:?}", team.slot.number(), command);
    let snapshot = team.chart.command(command, Utc::now()).await;
    let view = ChartView::render(&header_of(&team), &snapshot, &tr, state.display_offset_hours);
    respond(&headers, &view).await
}

pub async fn get_map(
    Path(team): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let team = pollers(&state, &team, &tr).await?;
    let view = MapView::render(header_of(&team), team.board.snapshot(), &state.map);
    respond(&headers, &view).await
}

pub async fn get_gauges(
    Path(team): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let team = pollers(&state, &team, &tr).await?;
    let view = GaugesView::render(header_of(&team), &team.board.snapshot(), &tr);
    respond(&headers, &view).await
}

pub async fn get_latest_power(
    Path((team, device_type)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let slot = parse_team(&team)?;
    let device_type = DeviceType::parse(&device_type)
        .ok_or_else(|| AppError::BadRequest(format!("unknown device type: {}", device_type)))?;
    let tr = state.dashboard.translator().await;

    let reading = state
        .dashboard
        .latest_power(slot, device_type)
        .await
        .ok_or_else(|| AppError::NotConfigured(tr.t("dashboard.alert.fillAll")))?
        .map_err(|e| {
            tracing::warn!("Latest {} power for team {} failed: {}", device_type.as_str(), team, e);
            AppError::Upstream(e.to_string())
        })?;

    let settings = state.dashboard.settings().await;
    let view = LatestPowerView {
        header: TeamHeader::new(
            slot,
            settings.team_name(slot),
            settings.session_id(slot).unwrap_or_default(),
        ),
        device_type,
        label: tr.t(device_type.label_key()),
        reading,
    };
    respond(&headers, &view).await
}

/// Result screen for both teams, optionally from a clock time `HH:MM[:SS]`
pub async fn get_result(
    Query(query): Query<ResultQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    let settings = state.dashboard.settings().await;

    let teams = state
        .results
        .load(&settings, query.from.as_deref())
        .await
        .map_err(|_| AppError::Upstream(tr.t("result.page.fetchError")))?;

    let view = ResultView::render(teams, &tr, state.display_offset_hours);
    respond(&headers, &view).await
}

pub async fn delete_session(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteSessionRequest>,
) -> Result<Response, AppError> {
    let tr = state.dashboard.translator().await;
    state
        .sessions
        .delete(&request.session_id, &request.password)
        .await
        .map_err(|e| AppError::delete(e, &tr))?;

    let message = Message {
        ok: true,
        message: tr.t("session.delete.success"),
    };
    respond(&headers, &message).await
}
