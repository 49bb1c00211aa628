use capstone::auth::Actor;
use capstone::database::entities::{projects, users};
use capstone::database::migrations::Migrator;
use capstone::errors::TrackerError;
use capstone::metadata;
use capstone::services::ReviewService;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

/// Create an in-memory SQLite database for testing
async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: &str,
) -> Result<users::Model, DbErr> {
    let user = users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    };
    user.insert(db).await
}

fn actor(user: &users::Model) -> Actor {
    Actor::from_user(user.clone()).unwrap()
}

async fn create_project_row(
    db: &DatabaseConnection,
    status: &str,
    advisor_id: Option<i32>,
) -> Result<projects::Model, DbErr> {
    let project = projects::ActiveModel {
        name: Set("Review Target".to_string()),
        project_type: Set("academic".to_string()),
        status: Set(status.to_string()),
        semester: Set(1),
        advisor_id: Set(advisor_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    project.insert(db).await
}

#[tokio::test]
async fn test_status_moves_draft_to_underreview() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "draft", Some(prof.id)).await.unwrap();

    let detail = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "underreview")
        .await
        .unwrap();
    assert_eq!(detail.project.status, "underreview");
}

#[tokio::test]
async fn test_status_approved_is_terminal() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "approved", Some(prof.id))
        .await
        .unwrap();

    let err = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "underreview")
        .await
        .unwrap_err();
    match err {
        TrackerError::Validation(msg) => assert!(msg.contains("none")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_reject_can_return_to_review() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "reject", Some(prof.id)).await.unwrap();

    let detail = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "underreview")
        .await
        .unwrap();
    assert_eq!(detail.project.status, "underreview");
}

#[tokio::test]
async fn test_status_rejects_skipping_ahead() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "draft", Some(prof.id)).await.unwrap();

    let err = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[tokio::test]
async fn test_status_same_state_is_allowed() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    // "in review" normalizes to the state the project is already in
    let detail = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "in review")
        .await
        .unwrap();
    assert_eq!(detail.project.status, "underreview");
}

#[tokio::test]
async fn test_status_normalizes_synonyms() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    let detail = ReviewService::new(db)
        .set_status(&actor(&prof), project.id, "Completed")
        .await
        .unwrap();
    assert_eq!(detail.project.status, "approved");
}

#[tokio::test]
async fn test_status_requires_reviewer() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let other_prof = create_user(&db, "Prof. Lima", "lima@uni.edu", "advisor")
        .await
        .unwrap();
    let ana = create_user(&db, "Ana", "ana@uni.edu", "student").await.unwrap();
    let mario = create_user(&db, "Mario", "mario@uni.edu", "coordinator")
        .await
        .unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db.clone());

    let err = service
        .set_status(&actor(&ana), project.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    // An advisor who is not assigned to this project is just as locked out
    let err = service
        .set_status(&actor(&other_prof), project.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    // Neither denied call reached the stored row
    let stored = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "underreview");

    let detail = service
        .set_status(&actor(&mario), project.id, "approved")
        .await
        .unwrap();
    assert_eq!(detail.project.status, "approved");
}

#[tokio::test]
async fn test_grade_requires_assigned_advisor() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let other_prof = create_user(&db, "Prof. Lima", "lima@uni.edu", "advisor")
        .await
        .unwrap();
    let mario = create_user(&db, "Mario", "mario@uni.edu", "coordinator")
        .await
        .unwrap();
    let project = create_project_row(&db, "approved", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db.clone());

    // Grading is the advisor's call alone, coordinators included
    let err = service
        .set_grade(&actor(&mario), project.id, Some("A"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    let err = service
        .set_grade(&actor(&other_prof), project.id, Some("A"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    // The denied attempts left the row ungraded
    let stored = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.grade.is_none());

    let detail = service
        .set_grade(&actor(&prof), project.id, Some("A"))
        .await
        .unwrap();
    assert_eq!(detail.project.grade.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_grade_normalizes_letter() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "approved", Some(prof.id))
        .await
        .unwrap();

    let detail = ReviewService::new(db)
        .set_grade(&actor(&prof), project.id, Some(" b+ "))
        .await
        .unwrap();
    assert_eq!(detail.project.grade.as_deref(), Some("B+"));
}

#[tokio::test]
async fn test_grade_rejects_unknown_letter() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "approved", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db);

    let err = service
        .set_grade(&actor(&prof), project.id, Some("E"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));

    let err = service
        .set_grade(&actor(&prof), project.id, Some("A-"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[tokio::test]
async fn test_grade_clears_with_none() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "approved", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db);
    service
        .set_grade(&actor(&prof), project.id, Some("C+"))
        .await
        .unwrap();

    let detail = service
        .set_grade(&actor(&prof), project.id, None)
        .await
        .unwrap();
    assert!(detail.project.grade.is_none());
}

#[tokio::test]
async fn test_grade_same_value_skips_write() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();

    // A legacy row: graded, and still carrying a stale grade shadow in the bag
    let project = projects::ActiveModel {
        name: Set("Legacy".to_string()),
        project_type: Set("academic".to_string()),
        status: Set("approved".to_string()),
        semester: Set(1),
        advisor_id: Set(Some(prof.id)),
        grade: Set(Some("A".to_string())),
        comment_student: Set(Some(r#"{"grade":"B"}"#.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let project = project.insert(&db).await.unwrap();

    let detail = ReviewService::new(db.clone())
        .set_grade(&actor(&prof), project.id, Some("a"))
        .await
        .unwrap();
    assert_eq!(detail.project.grade.as_deref(), Some("A"));

    // No write happened, so the shadow is still in the stored bag
    let raw = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let bag = metadata::decode(raw.comment_student.as_deref()).unwrap();
    assert_eq!(bag.grade.as_deref(), Some("B"));
}

#[tokio::test]
async fn test_grade_write_strips_bag_shadow() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();

    let project = projects::ActiveModel {
        name: Set("Legacy".to_string()),
        project_type: Set("academic".to_string()),
        status: Set("approved".to_string()),
        semester: Set(1),
        advisor_id: Set(Some(prof.id)),
        comment_student: Set(Some(r#"{"grade":"B","keywords":["legacy"]}"#.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let project = project.insert(&db).await.unwrap();

    let detail = ReviewService::new(db.clone())
        .set_grade(&actor(&prof), project.id, Some("A"))
        .await
        .unwrap();
    assert_eq!(detail.project.grade.as_deref(), Some("A"));

    let raw = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let bag = metadata::decode(raw.comment_student.as_deref()).unwrap();
    assert!(bag.grade.is_none());
    assert_eq!(bag.keywords, vec!["legacy".to_string()]);
}

#[tokio::test]
async fn test_feedback_routes_to_role_column() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let mario = create_user(&db, "Mario", "mario@uni.edu", "coordinator")
        .await
        .unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db);

    let detail = service
        .set_feedback(&actor(&prof), project.id, "Tighten the evaluation chapter.")
        .await
        .unwrap();
    assert_eq!(
        detail.project.feedback_advisor.as_deref(),
        Some("Tighten the evaluation chapter.")
    );
    assert!(detail.project.feedback_coordinator.is_none());

    let detail = service
        .set_feedback(&actor(&mario), project.id, "Formatting checked.")
        .await
        .unwrap();
    assert_eq!(
        detail.project.feedback_coordinator.as_deref(),
        Some("Formatting checked.")
    );
    assert_eq!(
        detail.project.feedback_advisor.as_deref(),
        Some("Tighten the evaluation chapter.")
    );
}

#[tokio::test]
async fn test_feedback_rejects_blank() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    let err = ReviewService::new(db)
        .set_feedback(&actor(&prof), project.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[tokio::test]
async fn test_feedback_requires_reviewer() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();
    let other_prof = create_user(&db, "Prof. Lima", "lima@uni.edu", "advisor")
        .await
        .unwrap();
    let ana = create_user(&db, "Ana", "ana@uni.edu", "student").await.unwrap();
    let project = create_project_row(&db, "underreview", Some(prof.id))
        .await
        .unwrap();

    let service = ReviewService::new(db.clone());

    let err = service
        .set_feedback(&actor(&ana), project.id, "Looks fine to me")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    let err = service
        .set_feedback(&actor(&other_prof), project.id, "Looks fine to me")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Forbidden(_)));

    // No feedback column picked up the rejected text
    let stored = projects::Entity::find_by_id(project.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.feedback_advisor.is_none());
    assert!(stored.feedback_coordinator.is_none());
}

#[tokio::test]
async fn test_review_missing_project_is_not_found() {
    let db = setup_test_db().await.unwrap();
    let prof = create_user(&db, "Prof. Novak", "novak@uni.edu", "advisor")
        .await
        .unwrap();

    let err = ReviewService::new(db)
        .set_status(&actor(&prof), 4242, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { .. }));
}
