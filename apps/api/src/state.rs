use grievance_application::{DashboardService, GrievanceService, RoleService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_service: RoleService,
    pub grievance_service: GrievanceService,
    pub dashboard_service: DashboardService,
}
