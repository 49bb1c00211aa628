#[cfg(test)]
use sea_orm::{Database, DatabaseConnection};

/// In-memory database with the full schema applied, for unit tests inside
/// the crate. Integration tests under tests/ set up their own connections.
#[cfg(test)]
pub async fn setup_test_db() -> DatabaseConnection {
    use sea_orm_migration::MigratorTrait;

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    crate::database::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
