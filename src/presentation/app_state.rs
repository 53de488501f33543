// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::result_service::ResultService;
use crate::application::session_service::SessionService;
use crate::infrastructure::config::MapSettings;

pub struct AppState {
    pub dashboard: DashboardService,
    pub results: ResultService,
    pub sessions: SessionService,
    pub display_offset_hours: i64,
    pub map: MapSettings,
}
