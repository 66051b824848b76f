use std::str::FromStr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use grievance_application::DashboardState;
use grievance_core::UserIdentity;
use grievance_domain::AccessRole;

use crate::dto::{MeResponse, ProvisionRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the caller's resolved role and the dashboard context it routes
/// to. Resolution persists a derived role on first login.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<MeResponse>> {
    let role = state.role_service.resolve(&identity).await;

    Ok(Json(MeResponse {
        subject: identity.subject().to_owned(),
        email: identity.email().to_owned(),
        role: role.as_str().to_owned(),
        dashboard: DashboardState::for_role(role),
    }))
}

/// Provisions an explicitly requested role for a first-time account,
/// applying the institution domain policy and the admin-email rule.
pub async fn provision_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<ProvisionRoleRequest>,
) -> ApiResult<(StatusCode, Json<MeResponse>)> {
    let requested = AccessRole::from_str(&payload.role)?;
    let record = state.role_service.provision(&identity, requested).await?;

    Ok((
        StatusCode::CREATED,
        Json(MeResponse {
            subject: identity.subject().to_owned(),
            email: identity.email().to_owned(),
            role: record.role().as_str().to_owned(),
            dashboard: DashboardState::for_role(record.role()),
        }),
    ))
}
