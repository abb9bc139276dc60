// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub chart_service: ChartService,
}
