use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use grievance_application::{GrievanceFilter, scope_for_role};
use grievance_core::{AppError, UserIdentity};
use grievance_domain::{
    AccessRole, GrievanceCategory, GrievanceId, GrievanceStatus, suggest_category,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{
    GrievanceResponse, SubmitGrievanceRequest, SuggestCategoryRequest, SuggestCategoryResponse,
    UpdateStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn submit_grievance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<SubmitGrievanceRequest>,
) -> ApiResult<(StatusCode, Json<GrievanceResponse>)> {
    let role = state.role_service.resolve(&identity).await;
    let input = payload.into_input()?;
    let grievance = state.grievance_service.submit(&identity, role, input).await?;

    Ok((StatusCode::CREATED, Json(GrievanceResponse::from(grievance))))
}

#[derive(Debug, Deserialize)]
pub struct GrievanceListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl GrievanceListQuery {
    fn into_filter(self) -> ApiResult<GrievanceFilter> {
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(GrievanceCategory::from_str)
            .transpose()?;
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(GrievanceStatus::from_str)
            .transpose()?;

        Ok(GrievanceFilter {
            search: self.search,
            category,
            status,
        })
    }
}

/// Lists the caller's role-scoped records, search/filter-narrowed and
/// sorted newest first.
pub async fn list_grievances_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<GrievanceListQuery>,
) -> ApiResult<Json<Vec<GrievanceResponse>>> {
    let role = state.role_service.resolve(&identity).await;
    let scope = scope_for_role(role, &identity);
    let filter = query.into_filter()?;

    let records = state.grievance_service.list(&scope).await?;
    let narrowed = filter
        .apply(&records)
        .into_iter()
        .map(GrievanceResponse::from)
        .collect();

    Ok(Json(narrowed))
}

pub async fn get_grievance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GrievanceResponse>> {
    let role = state.role_service.resolve(&identity).await;
    let scope = scope_for_role(role, &identity);
    let id = GrievanceId::from_uuid(id);

    let grievance = state
        .grievance_service
        .find(id)
        .await?
        .filter(|grievance| scope.matches(grievance))
        .ok_or_else(|| AppError::NotFound(format!("grievance '{id}' does not exist")))?;

    Ok(Json(GrievanceResponse::from(grievance)))
}

pub async fn update_status_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<GrievanceResponse>> {
    let role = state.role_service.resolve(&identity).await;
    let input = payload.into_input()?;

    let grievance = state
        .grievance_service
        .update_status(&identity, role, GrievanceId::from_uuid(id), input)
        .await?;

    Ok(Json(GrievanceResponse::from(grievance)))
}

pub async fn delete_grievance_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let role = state.role_service.resolve(&identity).await;
    state
        .grievance_service
        .delete(&identity, role, GrievanceId::from_uuid(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Advisory category suggestion; the submitter may override it.
pub async fn suggest_category_handler(
    Json(payload): Json<SuggestCategoryRequest>,
) -> Json<SuggestCategoryResponse> {
    let category = suggest_category(&payload.title, &payload.description)
        .map(|category| category.as_str().to_owned());

    Json(SuggestCategoryResponse { category })
}

/// Convenience guard used by admin-only handlers.
pub(crate) fn require_admin(role: AccessRole) -> Result<(), AppError> {
    if role != AccessRole::Admin {
        return Err(AppError::Forbidden(
            "this operation requires the admin role".to_owned(),
        ));
    }

    Ok(())
}
