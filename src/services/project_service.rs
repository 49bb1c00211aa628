use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::entities::{links, projects, team_members, users};
use crate::errors::{TrackerError, TrackerResult};
use crate::metadata::{self, ProjectMetadata};
use crate::services::user_directory::UserDirectory;
use crate::taxonomy::{ProjectStatus, ProjectType};

/// A fully assembled view of one project.
///
/// Never stored; rebuilt from the base row and its satellite tables on
/// every read. `students` follows team membership insertion order.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ProjectDetail {
    pub project: projects::Model,
    pub advisor: Option<users::Model>,
    pub students: Vec<users::Model>,
    pub metadata: Option<ProjectMetadata>,
    pub links: Vec<String>,
}

/// Optional list filters; all absent means every project
#[derive(Clone, Debug, Default)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub semester: Option<i32>,
    pub year: Option<i32>,
    pub course_id: Option<i32>,
    pub advisor_id: Option<i32>,
    pub member_user_id: Option<i32>,
}

/// Read side of the project store: fetch base rows and hydrate them into
/// [`ProjectDetail`] aggregates.
///
/// The store has no joins, so hydration is a manual fan-out: one batched
/// query per satellite table, then assembly through id-keyed maps. Related
/// rows whose user id resolves to nothing are skipped, not errors; the
/// references are weak by contract.
pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_project(&self, id: i32) -> TrackerResult<ProjectDetail> {
        let row = projects::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", id))?;

        self.hydrate(vec![row])
            .await?
            .pop()
            .ok_or_else(|| TrackerError::not_found("project", id))
    }

    pub async fn list_projects(&self, filter: &ProjectFilter) -> TrackerResult<Vec<ProjectDetail>> {
        let mut query = projects::Entity::find();

        if let Some(status) = &filter.status {
            query = query
                .filter(projects::Column::Status.eq(ProjectStatus::normalize(status).as_str()));
        }
        if let Some(project_type) = &filter.project_type {
            query = query.filter(
                projects::Column::ProjectType.eq(ProjectType::normalize(project_type).as_str()),
            );
        }
        if let Some(semester) = filter.semester {
            query = query.filter(projects::Column::Semester.eq(semester));
        }
        if let Some(year) = filter.year {
            query = query.filter(projects::Column::Year.eq(year));
        }
        if let Some(course_id) = filter.course_id {
            query = query.filter(projects::Column::CourseId.eq(course_id));
        }
        if let Some(advisor_id) = filter.advisor_id {
            query = query.filter(projects::Column::AdvisorId.eq(advisor_id));
        }
        if let Some(member_id) = filter.member_user_id {
            let memberships = team_members::Entity::find()
                .filter(team_members::Column::StudentId.eq(member_id))
                .all(&self.db)
                .await?;
            let project_ids: Vec<i32> = memberships.into_iter().map(|m| m.project_id).collect();
            if project_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(projects::Column::Id.is_in(project_ids));
        }

        let rows = query
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.hydrate(rows).await
    }

    /// Hydrate a batch of base rows, one output aggregate per input row in
    /// input order. Any lookup failure aborts the whole batch.
    pub async fn hydrate(&self, rows: Vec<projects::Model>) -> TrackerResult<Vec<ProjectDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let project_ids: Vec<i32> = rows.iter().map(|p| p.id).collect();

        // Membership and link reads are independent; issue them together.
        let member_query = team_members::Entity::find()
            .filter(team_members::Column::ProjectId.is_in(project_ids.clone()))
            .order_by_asc(team_members::Column::Id)
            .all(&self.db);
        let link_query = links::Entity::find()
            .filter(links::Column::ProjectId.is_in(project_ids))
            .all(&self.db);
        let (member_rows, link_rows) = tokio::try_join!(member_query, link_query)?;

        // One batched user fetch for every student plus every advisor.
        let mut user_ids: BTreeSet<i32> = member_rows.iter().map(|m| m.student_id).collect();
        user_ids.extend(rows.iter().filter_map(|p| p.advisor_id));
        let user_ids: Vec<i32> = user_ids.into_iter().collect();
        let users_by_id: HashMap<i32, users::Model> = UserDirectory::new(self.db.clone())
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut students_by_project: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in member_rows {
            students_by_project
                .entry(row.project_id)
                .or_default()
                .push(row.student_id);
        }
        let mut links_by_project: HashMap<i32, Vec<String>> = HashMap::new();
        for row in link_rows {
            links_by_project
                .entry(row.project_id)
                .or_default()
                .push(row.link);
        }

        let details = rows
            .into_iter()
            .map(|project| {
                let advisor = project
                    .advisor_id
                    .and_then(|id| users_by_id.get(&id).cloned());
                let students = students_by_project
                    .remove(&project.id)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|student_id| users_by_id.get(&student_id).cloned())
                    .collect();
                let links = links_by_project.remove(&project.id).unwrap_or_default();
                let metadata = metadata::decode(project.comment_student.as_deref());
                ProjectDetail {
                    project,
                    advisor,
                    students,
                    metadata,
                    links,
                }
            })
            .collect();

        Ok(details)
    }
}
