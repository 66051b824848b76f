use axum::extract::State;
use axum::{Extension, Json};
use grievance_application::{AdminStats, StudentStats, SubscriptionScope};
use grievance_core::UserIdentity;

use crate::dto::{AdminStatsResponse, StudentStatsResponse};
use crate::error::ApiResult;
use crate::handlers::grievances::require_admin;
use crate::state::AppState;

/// Statistics over the caller's own records.
pub async fn student_stats_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<StudentStatsResponse>> {
    let scope = SubscriptionScope::Submitter(identity.email().to_owned());
    let records = state.grievance_service.list(&scope).await?;

    Ok(Json(StudentStatsResponse::from(StudentStats::compute(
        &records,
    ))))
}

/// Statistics over the full record set. Admin only.
pub async fn admin_stats_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<AdminStatsResponse>> {
    let role = state.role_service.resolve(&identity).await;
    require_admin(role)?;

    let records = state.grievance_service.list(&SubscriptionScope::All).await?;

    Ok(Json(AdminStatsResponse::from(AdminStats::compute(&records))))
}
