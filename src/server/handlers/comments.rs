use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::Actor;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::{CommentService, CommentView};

#[derive(Deserialize, ToSchema)]
pub struct CommentRequest {
    pub body: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/comments",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentView]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = CommentService::new(state.db.clone())
        .list_comments(id)
        .await?;
    Ok(Json(comments))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/comments",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentView),
        (status = 400, description = "Empty comment body"),
        (status = 403, description = "Caller not involved with this project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let comment = CommentService::new(state.db.clone())
        .add_comment(&actor, id, &payload.body)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/comments/{comment_id}",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("comment_id" = i32, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Caller is neither the author nor a coordinator"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, comment_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    CommentService::new(state.db.clone())
        .delete_comment(&actor, id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
