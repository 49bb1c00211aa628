use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Actor, Role};
use crate::database::entities::{comments, projects, team_members, users};
use crate::errors::{TrackerError, TrackerResult};
use crate::services::user_directory::UserDirectory;

/// A comment with its author resolved; a deleted author renders as absent
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CommentView {
    pub id: i32,
    pub project_id: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<users::Model>,
}

/// Discussion notes on a project, visible to anyone who can see the
/// project. Writing is limited to people involved with it.
pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Add a note. Team members, the assigned advisor, and coordinators only.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        project_id: i32,
        body: &str,
    ) -> TrackerResult<CommentView> {
        let project = self.load_project(project_id).await?;

        if body.trim().is_empty() {
            return Err(TrackerError::validation("comment body must not be empty"));
        }

        let involved = match actor.role {
            Role::Coordinator => true,
            Role::Advisor => project.advisor_id == Some(actor.id),
            Role::Student => {
                team_members::Entity::find()
                    .filter(team_members::Column::ProjectId.eq(project.id))
                    .filter(team_members::Column::StudentId.eq(actor.id))
                    .one(&self.db)
                    .await?
                    .is_some()
            }
        };
        if !involved {
            return Err(TrackerError::forbidden(
                "only people involved with a project may comment on it",
            ));
        }

        let comment = comments::ActiveModel {
            project_id: Set(project.id),
            author_id: Set(actor.id),
            body: Set(body.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let comment = comment.insert(&self.db).await?;

        let author = UserDirectory::new(self.db.clone())
            .find_by_id(comment.author_id)
            .await?;
        Ok(view(comment, author))
    }

    /// All notes on a project, oldest first
    pub async fn list_comments(&self, project_id: i32) -> TrackerResult<Vec<CommentView>> {
        self.load_project(project_id).await?;

        let rows = comments::Entity::find()
            .filter(comments::Column::ProjectId.eq(project_id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.db)
            .await?;

        let author_ids: Vec<i32> = rows.iter().map(|c| c.author_id).collect();
        let authors: HashMap<i32, users::Model> = UserDirectory::new(self.db.clone())
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(rows
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author_id).cloned();
                view(comment, author)
            })
            .collect())
    }

    /// Remove a note. The author may retract their own; coordinators may
    /// remove any.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        project_id: i32,
        comment_id: i32,
    ) -> TrackerResult<()> {
        self.load_project(project_id).await?;

        let comment = comments::Entity::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .filter(|comment| comment.project_id == project_id)
            .ok_or_else(|| TrackerError::not_found("comment", comment_id))?;

        if comment.author_id != actor.id && !actor.is_coordinator() {
            return Err(TrackerError::forbidden(
                "only the author or a coordinator may delete a comment",
            ));
        }

        comments::Entity::delete_by_id(comment.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn load_project(&self, project_id: i32) -> TrackerResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", project_id))
    }
}

fn view(comment: comments::Model, author: Option<users::Model>) -> CommentView {
    CommentView {
        id: comment.id,
        project_id: comment.project_id,
        body: comment.body,
        created_at: comment.created_at,
        author,
    }
}
