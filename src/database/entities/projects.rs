use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A submitted project.
///
/// `status`, `project_type`, and `semester` only ever hold values from the
/// `taxonomy` vocabularies. `advisor_id` and `course_id` are weak references
/// with no schema-level constraint. `comment_student` is the serialized
/// metadata bag, opaque at this level; `metadata::decode` interprets it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "projects")]
#[schema(as = Project)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub project_type: String,
    pub status: String,
    pub semester: i32,
    pub year: Option<i32>,
    pub team_name: Option<String>,
    pub competition_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub advisor_id: Option<i32>,
    pub course_id: Option<i32>,
    pub grade: Option<String>,
    pub feedback_advisor: Option<String>,
    pub feedback_coordinator: Option<String>,
    pub comment_student: Option<String>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
    #[sea_orm(has_many = "super::links::Entity")]
    Links,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMembers.def()
    }
}

impl Related<super::links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
