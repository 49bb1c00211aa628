use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::Actor;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{
    ProjectDetail, ProjectEditService, ProjectFilter, ProjectService, ProjectSubmission,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub semester: Option<i32>,
    pub year: Option<i32>,
    pub course_id: Option<i32>,
    pub advisor_id: Option<i32>,
    /// Restrict to projects the caller is a team member of
    pub mine: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "List projects matching the filters", body = [ProjectDetail]),
        (status = 401, description = "Caller not identified")
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<ProjectDetail>>> {
    let filter = ProjectFilter {
        status: query.status,
        project_type: query.project_type,
        semester: query.semester,
        year: query.year,
        course_id: query.course_id,
        advisor_id: query.advisor_id,
        member_user_id: match query.mine {
            Some(true) => Some(actor.id),
            _ => None,
        },
    };

    let projects = ProjectService::new(state.db.clone())
        .list_projects(&filter)
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectSubmission,
    responses(
        (status = 201, description = "Project created", body = ProjectDetail),
        (status = 400, description = "No resolvable team member"),
        (status = 401, description = "Caller not identified")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<ProjectSubmission>,
) -> ApiResult<(StatusCode, Json<ProjectDetail>)> {
    let detail = ProjectEditService::new(state.db.clone())
        .create_project(&actor, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "The hydrated project", body = ProjectDetail),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i32>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = ProjectService::new(state.db.clone()).get_project(id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = ProjectSubmission,
    responses(
        (status = 200, description = "Project updated", body = ProjectDetail),
        (status = 403, description = "Caller may not edit this project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(payload): Json<ProjectSubmission>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = ProjectEditService::new(state.db.clone())
        .update_project(&actor, id, payload)
        .await?;
    Ok(Json(detail))
}
