use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::Actor;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{ProjectDetail, ReviewService};

#[derive(Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Deserialize, ToSchema)]
pub struct GradeAssignRequest {
    /// A letter from the fixed grade set, or null to clear the grade
    pub grade: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/status",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = ProjectDetail),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller may not review this project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(payload): Json<StatusChangeRequest>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = ReviewService::new(state.db.clone())
        .set_status(&actor, id, &payload.status)
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/grade",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = GradeAssignRequest,
    responses(
        (status = 200, description = "Grade recorded", body = ProjectDetail),
        (status = 400, description = "Grade letter not in the allowed set"),
        (status = 403, description = "Caller is not the assigned advisor"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn set_grade(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(payload): Json<GradeAssignRequest>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = ReviewService::new(state.db.clone())
        .set_grade(&actor, id, payload.grade.as_deref())
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/feedback",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = ProjectDetail),
        (status = 400, description = "Feedback text empty"),
        (status = 403, description = "Caller may not review this project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn set_feedback(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(payload): Json<FeedbackRequest>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = ReviewService::new(state.db.clone())
        .set_feedback(&actor, id, &payload.feedback)
        .await?;
    Ok(Json(detail))
}
