//! Database functionality tests
//!
//! Tests for migrations, entity operations, and the weak-reference model

use anyhow::Result;
use capstone::database::entities::{comments, links, projects, team_members, users};
use capstone::database::migrations::Migrator;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use tempfile::NamedTempFile;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;

    Ok((db, temp_file))
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    // Verify all tables exist by attempting to query them
    let users = users::Entity::find().all(&db).await?;
    assert_eq!(users.len(), 0);

    let projects = projects::Entity::find().all(&db).await?;
    assert_eq!(projects.len(), 0);

    let members = team_members::Entity::find().all(&db).await?;
    assert_eq!(members.len(), 0);

    let links = links::Entity::find().all(&db).await?;
    assert_eq!(links.len(), 0);

    let comments = comments::Entity::find().all(&db).await?;
    assert_eq!(comments.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_project_crud_operations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    // Create project
    let new_project = projects::ActiveModel {
        name: Set("Test Project".to_string()),
        description: Set(Some("A test project".to_string())),
        project_type: Set("academic".to_string()),
        status: Set("draft".to_string()),
        semester: Set(1),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let project = new_project.insert(&db).await?;
    assert_eq!(project.name, "Test Project");
    assert_eq!(project.status, "draft");

    // Read project
    let found_project = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await?
        .expect("Project should exist");

    assert_eq!(found_project.id, project.id);

    // Update project
    let mut project_update: projects::ActiveModel = found_project.into();
    project_update.grade = Set(Some("B+".to_string()));

    let updated_project = project_update.update(&db).await?;
    assert_eq!(updated_project.grade.as_deref(), Some("B+"));

    // Delete project
    projects::Entity::delete_by_id(updated_project.id)
        .exec(&db)
        .await?;

    let deleted_project = projects::Entity::find_by_id(updated_project.id)
        .one(&db)
        .await?;

    assert!(deleted_project.is_none());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_rejected() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    users::ActiveModel {
        name: Set("Ana".to_string()),
        email: Set("ana@uni.edu".to_string()),
        role: Set("student".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let duplicate = users::ActiveModel {
        name: Set("Other Ana".to_string()),
        email: Set("ana@uni.edu".to_string()),
        role: Set("student".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_membership_rejected() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    team_members::ActiveModel {
        project_id: Set(1),
        student_id: Set(7),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let duplicate = team_members::ActiveModel {
        project_id: Set(1),
        student_id: Set(7),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err());

    // The same student on a different project is fine
    team_members::ActiveModel {
        project_id: Set(2),
        student_id: Set(7),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_no_cascades_between_tables() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let user = users::ActiveModel {
        name: Set("Ana".to_string()),
        email: Set("ana@uni.edu".to_string()),
        role: Set("student".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let project = projects::ActiveModel {
        name: Set("Weak Refs".to_string()),
        project_type: Set("academic".to_string()),
        status: Set("draft".to_string()),
        semester: Set(1),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    team_members::ActiveModel {
        project_id: Set(project.id),
        student_id: Set(user.id),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    // Removing the user must leave the membership row behind
    users::Entity::delete_by_id(user.id).exec(&db).await?;

    let memberships = team_members::Entity::find()
        .filter(team_members::Column::ProjectId.eq(project.id))
        .all(&db)
        .await?;
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].student_id, user.id);

    // Removing the project row alone leaves satellites too; cleanup is the
    // services' job, not the schema's
    projects::Entity::delete_by_id(project.id).exec(&db).await?;

    let memberships = team_members::Entity::find()
        .filter(team_members::Column::ProjectId.eq(project.id))
        .all(&db)
        .await?;
    assert_eq!(memberships.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_migrations_are_reversible() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    Migrator::down(&db, None).await?;
    assert!(projects::Entity::find().all(&db).await.is_err());

    Migrator::up(&db, None).await?;
    let projects = projects::Entity::find().all(&db).await?;
    assert_eq!(projects.len(), 0);

    Ok(())
}
