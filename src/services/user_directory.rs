use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::database::entities::users;
use crate::errors::TrackerResult;

/// Read-only lookups against the user directory.
///
/// Account management belongs to the identity system; this service only
/// resolves references. Email comparison is case-insensitive because
/// submission payloads carry addresses typed by hand.
pub struct UserDirectory {
    db: DatabaseConnection,
}

impl UserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> TrackerResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> TrackerResult<Option<users::Model>> {
        let user = users::Entity::find_by_id(id).one(&self.db).await?;
        Ok(user)
    }

    /// Batched lookup for hydration; ids that resolve to nothing are simply
    /// absent from the result
    pub async fn find_by_ids(&self, ids: &[i32]) -> TrackerResult<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(found)
    }
}
