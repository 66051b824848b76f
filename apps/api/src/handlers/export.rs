use axum::Extension;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use grievance_application::{SubscriptionScope, export_csv, sort_newest_first};
use grievance_core::UserIdentity;

use crate::error::ApiResult;
use crate::handlers::grievances::require_admin;
use crate::state::AppState;

/// Streams the full record set as CSV. Admin only.
pub async fn export_csv_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<impl IntoResponse> {
    let role = state.role_service.resolve(&identity).await;
    require_admin(role)?;

    let mut records = state.grievance_service.list(&SubscriptionScope::All).await?;
    sort_newest_first(&mut records);
    let csv = export_csv(&records);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"grievances.csv\"",
            ),
        ],
        csv,
    ))
}
