use utoipa::OpenApi;

use crate::database::entities::{comments, projects, users};
use crate::metadata::{FileEntry, ProjectMetadata, TeamMemberEntry};
use crate::server::handlers;
use crate::services::{CommentView, ProjectDetail, ProjectSubmission};

/// OpenAPI description served by the Swagger UI at `/docs`
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::reviews::set_status,
        handlers::reviews::set_grade,
        handlers::reviews::set_feedback,
        handlers::comments::list_comments,
        handlers::comments::create_comment,
        handlers::comments::delete_comment,
    ),
    components(schemas(
        ProjectDetail,
        ProjectSubmission,
        ProjectMetadata,
        TeamMemberEntry,
        FileEntry,
        CommentView,
        projects::Model,
        users::Model,
        comments::Model,
        handlers::reviews::StatusChangeRequest,
        handlers::reviews::GradeAssignRequest,
        handlers::reviews::FeedbackRequest,
        handlers::comments::CommentRequest,
    )),
    tags(
        (name = "capstone-tracker", description = "Academic project submission tracker")
    )
)]
pub struct ApiDoc;
