use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;

use crate::auth::{Actor, Role};
use crate::database::entities::projects;
use crate::errors::{TrackerError, TrackerResult};
use crate::metadata;
use crate::services::project_service::{ProjectDetail, ProjectService};
use crate::taxonomy::{normalize_grade, ProjectStatus, GRADE_LETTERS};

/// Role-gated review commands: status transitions, grading, feedback.
///
/// Every command loads the current row, checks the caller against it,
/// applies one single-row update, and returns the freshly hydrated
/// aggregate. Status only ever moves along the transition graph in
/// `taxonomy`; there are no automatic transitions.
pub struct ReviewService {
    db: DatabaseConnection,
}

impl ReviewService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Move a project to a new review status.
    ///
    /// Allowed for the assigned advisor or any coordinator. The input text
    /// is normalized first, so "completed" lands on approved.
    pub async fn set_status(
        &self,
        actor: &Actor,
        project_id: i32,
        status_text: &str,
    ) -> TrackerResult<ProjectDetail> {
        let project = self.load(project_id).await?;
        require_reviewer(actor, &project)?;

        let current = ProjectStatus::normalize(&project.status);
        let next = ProjectStatus::normalize(status_text);
        if !current.can_transition_to(next) {
            let allowed: Vec<&str> = current
                .allowed_transitions()
                .iter()
                .map(|status| status.as_str())
                .collect();
            let allowed = if allowed.is_empty() {
                "none".to_string()
            } else {
                allowed.join(", ")
            };
            return Err(TrackerError::validation(format!(
                "cannot move a {} project to {}; allowed targets: {}",
                current.as_str(),
                next.as_str(),
                allowed
            )));
        }

        let mut active: projects::ActiveModel = project.into();
        active.status = Set(next.as_str().to_string());
        active.update(&self.db).await?;

        info!("project {} status set to {}", project_id, next.as_str());
        self.projects().get_project(project_id).await
    }

    /// Assign or clear the grade. Assigned advisor only.
    ///
    /// Re-assigning the grade already stored is a no-op: nothing is
    /// written and the current aggregate is returned. Older rows may still
    /// carry a grade shadow inside the metadata bag; the same update that
    /// writes the column strips the shadow.
    pub async fn set_grade(
        &self,
        actor: &Actor,
        project_id: i32,
        grade: Option<&str>,
    ) -> TrackerResult<ProjectDetail> {
        let project = self.load(project_id).await?;
        require_assigned_advisor(actor, &project)?;

        let next = match grade {
            None => None,
            Some(raw) => {
                let letter = normalize_grade(raw).ok_or_else(|| {
                    TrackerError::validation(format!(
                        "invalid grade {:?}; expected one of {}",
                        raw,
                        GRADE_LETTERS.join(", ")
                    ))
                })?;
                Some(letter.to_string())
            }
        };

        if project.grade == next {
            return self.projects().get_project(project_id).await;
        }

        let stripped_bag = match metadata::decode(project.comment_student.as_deref()) {
            Some(mut bag) if bag.grade.is_some() => {
                bag.grade = None;
                Some(metadata::encode(&bag))
            }
            _ => None,
        };

        let mut active: projects::ActiveModel = project.into();
        active.grade = Set(next.clone());
        if let Some(new_bag) = stripped_bag {
            active.comment_student = Set(new_bag);
        }
        active.update(&self.db).await?;

        info!(
            "project {} grade set to {}",
            project_id,
            next.as_deref().unwrap_or("(cleared)")
        );
        self.projects().get_project(project_id).await
    }

    /// Record feedback text in the column matching the caller's role:
    /// assigned advisors write `feedback_advisor`, coordinators write
    /// `feedback_coordinator`.
    pub async fn set_feedback(
        &self,
        actor: &Actor,
        project_id: i32,
        text: &str,
    ) -> TrackerResult<ProjectDetail> {
        let project = self.load(project_id).await?;

        match actor.role {
            Role::Coordinator => {}
            Role::Advisor if project.advisor_id == Some(actor.id) => {}
            _ => {
                return Err(TrackerError::forbidden(
                    "only the assigned advisor or a coordinator may leave feedback",
                ))
            }
        }

        if text.trim().is_empty() {
            return Err(TrackerError::validation("feedback text must not be empty"));
        }

        let mut active: projects::ActiveModel = project.into();
        match actor.role {
            Role::Coordinator => active.feedback_coordinator = Set(Some(text.to_string())),
            _ => active.feedback_advisor = Set(Some(text.to_string())),
        }
        active.update(&self.db).await?;

        self.projects().get_project(project_id).await
    }

    async fn load(&self, project_id: i32) -> TrackerResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", project_id))
    }

    fn projects(&self) -> ProjectService {
        ProjectService::new(self.db.clone())
    }
}

fn require_reviewer(actor: &Actor, project: &projects::Model) -> TrackerResult<()> {
    if actor.is_coordinator() {
        return Ok(());
    }
    if actor.is_advisor() && project.advisor_id == Some(actor.id) {
        return Ok(());
    }
    Err(TrackerError::forbidden(
        "only the assigned advisor or a coordinator may change review status",
    ))
}

fn require_assigned_advisor(actor: &Actor, project: &projects::Model) -> TrackerResult<()> {
    if actor.is_advisor() && project.advisor_id == Some(actor.id) {
        return Ok(());
    }
    Err(TrackerError::forbidden(
        "only the assigned advisor may grade this project",
    ))
}
