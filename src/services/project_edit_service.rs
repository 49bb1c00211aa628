use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::{Actor, Role};
use crate::database::entities::{links, projects, team_members};
use crate::errors::{TrackerError, TrackerResult};
use crate::metadata::{self, FileEntry, ProjectMetadata, TeamMemberEntry};
use crate::services::project_service::{ProjectDetail, ProjectService};
use crate::services::user_directory::UserDirectory;
use crate::taxonomy::{normalize_semester, ProjectStatus, ProjectType};

/// Everything a client submits when creating or editing a project.
///
/// Roster entries and file descriptors reuse the bag's wire shapes, so a
/// submission serializes the same way it is later stored.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSubmission {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    /// Only honored on creation; afterwards status moves through review commands
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub competition_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub course_id: Option<i32>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMemberEntry>,
    #[serde(default)]
    pub external_links: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub award: Option<String>,
    #[serde(default)]
    pub completion_date: Option<String>,
}

/// Write side of the project store: multi-table creation and wholesale
/// field updates.
///
/// The store offers no cross-table transactions, so creation is a sequence
/// of single-table writes with explicit compensation: a failure after the
/// project row exists deletes whatever this call created, membership rows
/// before the project row, and then surfaces the original error.
pub struct ProjectEditService {
    db: DatabaseConnection,
}

impl ProjectEditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_project(
        &self,
        actor: &Actor,
        input: ProjectSubmission,
    ) -> TrackerResult<ProjectDetail> {
        let directory = UserDirectory::new(self.db.clone());

        // The submitter is always on the roster, and becomes primary when
        // nobody else claimed it.
        let mut roster = input.team_members.clone();
        let has_primary = roster.iter().any(|entry| entry.is_primary);
        match roster
            .iter_mut()
            .find(|entry| entry.email.eq_ignore_ascii_case(&actor.email))
        {
            Some(entry) => {
                if !has_primary {
                    entry.is_primary = true;
                }
            }
            None => roster.push(TeamMemberEntry {
                name: Some(actor.name.clone()),
                email: actor.email.clone(),
                role: actor.role.as_str().to_string(),
                is_primary: !has_primary,
            }),
        }

        let member_ids = self.resolve_members(&directory, &roster).await?;
        if member_ids.is_empty() {
            return Err(TrackerError::validation(
                "project needs at least one team member with a known email",
            ));
        }

        let advisor_id = self.resolve_advisor(&directory, &roster).await?;

        let bag = build_bag(&input, roster);
        let project = projects::ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            project_type: Set(normalized_type(&input)),
            status: Set(ProjectStatus::normalize(input.status.as_deref().unwrap_or(""))
                .as_str()
                .to_string()),
            semester: Set(normalize_semester(input.semester.as_deref().unwrap_or(""))),
            year: Set(input.year),
            team_name: Set(input.team_name.clone()),
            competition_name: Set(input.competition_name.clone()),
            start_date: Set(input.start_date.clone()),
            end_date: Set(input.end_date.clone()),
            advisor_id: Set(advisor_id),
            course_id: Set(input.course_id),
            comment_student: Set(metadata::encode(&bag)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let project = project.insert(&self.db).await?;

        // Membership rows. On failure the project row must not survive.
        let member_models: Vec<team_members::ActiveModel> = member_ids
            .iter()
            .map(|student_id| team_members::ActiveModel {
                project_id: Set(project.id),
                student_id: Set(*student_id),
                ..Default::default()
            })
            .collect();
        let insert_result = team_members::Entity::insert_many(member_models)
            .on_conflict(
                OnConflict::columns([
                    team_members::Column::StudentId,
                    team_members::Column::ProjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.db)
            .await;
        if let Err(err) = insert_result {
            // RecordNotInserted just means every row already existed
            if !matches!(err, DbErr::RecordNotInserted) {
                warn!(
                    "member insert failed for project {}, rolling back: {}",
                    project.id, err
                );
                if let Err(cleanup) = projects::Entity::delete_by_id(project.id)
                    .exec(&self.db)
                    .await
                {
                    warn!(
                        "could not remove project {} during rollback: {}",
                        project.id, cleanup
                    );
                }
                return Err(err.into());
            }
        }

        // Link rows. On failure remove memberships first, then the project.
        if !input.external_links.is_empty() {
            let link_models: Vec<links::ActiveModel> = input
                .external_links
                .iter()
                .map(|url| links::ActiveModel {
                    project_id: Set(project.id),
                    link: Set(url.clone()),
                    ..Default::default()
                })
                .collect();
            if let Err(err) = links::Entity::insert_many(link_models).exec(&self.db).await {
                warn!(
                    "link insert failed for project {}, rolling back: {}",
                    project.id, err
                );
                if let Err(cleanup) = team_members::Entity::delete_many()
                    .filter(team_members::Column::ProjectId.eq(project.id))
                    .exec(&self.db)
                    .await
                {
                    warn!(
                        "could not remove memberships of project {} during rollback: {}",
                        project.id, cleanup
                    );
                }
                if let Err(cleanup) = projects::Entity::delete_by_id(project.id)
                    .exec(&self.db)
                    .await
                {
                    warn!(
                        "could not remove project {} during rollback: {}",
                        project.id, cleanup
                    );
                }
                return Err(err.into());
            }
        }

        info!(
            "created project {} with {} members",
            project.id,
            member_ids.len()
        );

        ProjectService::new(self.db.clone())
            .get_project(project.id)
            .await
    }

    /// Replace a project's editable fields, roster, and links.
    ///
    /// Permitted for coordinators and for students currently on the team.
    /// Status, grade, and feedback are review fields and stay untouched.
    pub async fn update_project(
        &self,
        actor: &Actor,
        project_id: i32,
        input: ProjectSubmission,
    ) -> TrackerResult<ProjectDetail> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", project_id))?;

        match actor.role {
            Role::Coordinator => {}
            Role::Student => {
                let is_member = team_members::Entity::find()
                    .filter(team_members::Column::ProjectId.eq(project.id))
                    .filter(team_members::Column::StudentId.eq(actor.id))
                    .one(&self.db)
                    .await?
                    .is_some();
                if !is_member {
                    return Err(TrackerError::forbidden(
                        "only team members or a coordinator may edit this project",
                    ));
                }
            }
            Role::Advisor => {
                return Err(TrackerError::forbidden(
                    "advisors review projects through the review endpoints",
                ));
            }
        }

        let directory = UserDirectory::new(self.db.clone());
        let roster = input.team_members.clone();
        let member_ids = self.resolve_members(&directory, &roster).await?;
        let advisor_id = self.resolve_advisor(&directory, &roster).await?;

        // Wholesale replacement of both owned sets.
        team_members::Entity::delete_many()
            .filter(team_members::Column::ProjectId.eq(project.id))
            .exec(&self.db)
            .await?;
        if !member_ids.is_empty() {
            let member_models: Vec<team_members::ActiveModel> = member_ids
                .iter()
                .map(|student_id| team_members::ActiveModel {
                    project_id: Set(project.id),
                    student_id: Set(*student_id),
                    ..Default::default()
                })
                .collect();
            team_members::Entity::insert_many(member_models)
                .exec(&self.db)
                .await?;
        }

        links::Entity::delete_many()
            .filter(links::Column::ProjectId.eq(project.id))
            .exec(&self.db)
            .await?;
        if !input.external_links.is_empty() {
            let link_models: Vec<links::ActiveModel> = input
                .external_links
                .iter()
                .map(|url| links::ActiveModel {
                    project_id: Set(project.id),
                    link: Set(url.clone()),
                    ..Default::default()
                })
                .collect();
            links::Entity::insert_many(link_models).exec(&self.db).await?;
        }

        let bag = build_bag(&input, roster);
        let mut active: projects::ActiveModel = project.into();
        active.name = Set(input.name.clone());
        active.description = Set(input.description.clone());
        active.project_type = Set(normalized_type(&input));
        active.semester = Set(normalize_semester(input.semester.as_deref().unwrap_or("")));
        active.year = Set(input.year);
        active.team_name = Set(input.team_name.clone());
        active.competition_name = Set(input.competition_name.clone());
        active.start_date = Set(input.start_date.clone());
        active.end_date = Set(input.end_date.clone());
        active.advisor_id = Set(advisor_id);
        active.course_id = Set(input.course_id);
        active.comment_student = Set(metadata::encode(&bag));
        active.update(&self.db).await?;

        ProjectService::new(self.db.clone())
            .get_project(project_id)
            .await
    }

    /// Resolve roster emails to member ids, in roster order, dropping
    /// lecturer entries and addresses the directory does not know
    async fn resolve_members(
        &self,
        directory: &UserDirectory,
        roster: &[TeamMemberEntry],
    ) -> TrackerResult<Vec<i32>> {
        let mut member_ids = Vec::new();
        let mut seen = BTreeSet::new();
        for entry in roster {
            if entry.role.eq_ignore_ascii_case("lecturer") {
                continue;
            }
            if let Some(user) = directory.find_by_email(&entry.email).await? {
                if seen.insert(user.id) {
                    member_ids.push(user.id);
                }
            }
        }
        Ok(member_ids)
    }

    /// The first lecturer entry names the advisor; an unknown address
    /// leaves the project unassigned rather than failing
    async fn resolve_advisor(
        &self,
        directory: &UserDirectory,
        roster: &[TeamMemberEntry],
    ) -> TrackerResult<Option<i32>> {
        match roster
            .iter()
            .find(|entry| entry.role.eq_ignore_ascii_case("lecturer"))
        {
            Some(entry) => Ok(directory.find_by_email(&entry.email).await?.map(|u| u.id)),
            None => Ok(None),
        }
    }
}

fn normalized_type(input: &ProjectSubmission) -> String {
    ProjectType::normalize(input.project_type.as_deref().unwrap_or(""))
        .as_str()
        .to_string()
}

fn build_bag(input: &ProjectSubmission, roster: Vec<TeamMemberEntry>) -> ProjectMetadata {
    ProjectMetadata {
        keywords: input.keywords.clone(),
        external_links: input.external_links.clone(),
        team_members: roster,
        files: input.files.clone(),
        award: input.award.clone(),
        course_code: input.course_code.clone(),
        completion_date: input.completion_date.clone(),
        grade: None,
    }
}
