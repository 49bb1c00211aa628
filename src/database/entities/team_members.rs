use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership row joining a student to a project.
///
/// `(student_id, project_id)` is unique; re-adding an existing member is a
/// no-op upsert. The ascending `id` preserves insertion order, which is the
/// order hydrated rosters are returned in. `student_id` is a weak reference
/// into `users`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub student_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
