use anyhow::Result;
use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::database::entities::{comments, links, projects, team_members, users};
use crate::metadata::{self, FileEntry, ProjectMetadata, TeamMemberEntry};
use crate::taxonomy::{ProjectStatus, ProjectType};

/// Seed a demo roster and two projects so a fresh install has something to
/// show. Safe to run repeatedly: bails out when the roster already exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<()> {
    // First check if the demo roster already exists
    let existing_user = users::Entity::find()
        .filter(users::Column::Email.eq("ana.alves@uni.edu"))
        .one(db)
        .await?;

    if existing_user.is_some() {
        info!("Demo data already exists, skipping seed");
        return Ok(());
    }

    info!("Seeding demo roster");

    let ana = seed_user(db, "Ana Alves", "ana.alves@uni.edu", "student").await?;
    let bruno = seed_user(db, "Bruno Costa", "bruno.costa@uni.edu", "student").await?;
    let carla = seed_user(db, "Carla Dias", "carla.dias@uni.edu", "student").await?;
    let prof = seed_user(db, "Prof. Elena Freitas", "elena.freitas@uni.edu", "advisor").await?;
    seed_user(db, "Mario Gomes", "mario.gomes@uni.edu", "coordinator").await?;

    info!("Seeding demo projects");

    // An active submission under review
    let bag = ProjectMetadata {
        keywords: vec!["iot".to_string(), "agriculture".to_string()],
        external_links: vec!["https://git.uni.edu/smart-farm".to_string()],
        team_members: vec![
            TeamMemberEntry {
                name: Some(ana.name.clone()),
                email: ana.email.clone(),
                role: "student".to_string(),
                is_primary: true,
            },
            TeamMemberEntry {
                name: Some(bruno.name.clone()),
                email: bruno.email.clone(),
                role: "student".to_string(),
                is_primary: false,
            },
            TeamMemberEntry {
                name: Some(prof.name.clone()),
                email: prof.email.clone(),
                role: "lecturer".to_string(),
                is_primary: false,
            },
        ],
        course_code: Some("CS4900".to_string()),
        ..Default::default()
    };

    let farm = projects::ActiveModel {
        name: Set("Smart Farm Monitor".to_string()),
        description: Set(Some(
            "LoRa sensor network and dashboard for greenhouse monitoring".to_string(),
        )),
        project_type: Set(ProjectType::Academic.as_str().to_string()),
        status: Set(ProjectStatus::UnderReview.as_str().to_string()),
        semester: Set(1),
        year: Set(Some(2026)),
        team_name: Set(Some("GreenBytes".to_string())),
        advisor_id: Set(Some(prof.id)),
        comment_student: Set(metadata::encode(&bag)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let farm = farm.insert(db).await?;

    team_members::Entity::insert_many(vec![
        team_members::ActiveModel {
            project_id: Set(farm.id),
            student_id: Set(ana.id),
            ..Default::default()
        },
        team_members::ActiveModel {
            project_id: Set(farm.id),
            student_id: Set(bruno.id),
            ..Default::default()
        },
    ])
    .exec(db)
    .await?;

    links::Entity::insert(links::ActiveModel {
        project_id: Set(farm.id),
        link: Set("https://git.uni.edu/smart-farm".to_string()),
        ..Default::default()
    })
    .exec(db)
    .await?;

    comments::Entity::insert(comments::ActiveModel {
        project_id: Set(farm.id),
        author_id: Set(prof.id),
        body: Set("Please add the power budget for the sensor nodes.".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    })
    .exec(db)
    .await?;

    // A finished, graded project from an earlier run
    let robot_bag = ProjectMetadata {
        keywords: vec!["robotics".to_string()],
        team_members: vec![TeamMemberEntry {
            name: Some(carla.name.clone()),
            email: carla.email.clone(),
            role: "student".to_string(),
            is_primary: true,
        }],
        files: vec![FileEntry {
            name: "final-report.pdf".to_string(),
            size: Some(482_133),
            file_type: Some("application/pdf".to_string()),
        }],
        award: Some("Regional Finalist".to_string()),
        completion_date: Some("2025-11-30".to_string()),
        ..Default::default()
    };

    let robot = projects::ActiveModel {
        name: Set("Line Follower Mk II".to_string()),
        description: Set(Some("Autonomous line follower for the regional contest".to_string())),
        project_type: Set(ProjectType::Competition.as_str().to_string()),
        status: Set(ProjectStatus::Approved.as_str().to_string()),
        semester: Set(2),
        year: Set(Some(2025)),
        competition_name: Set(Some("Regional Robotics Cup".to_string())),
        advisor_id: Set(Some(prof.id)),
        grade: Set(Some("A".to_string())),
        feedback_advisor: Set(Some("Strong build quality and documentation.".to_string())),
        comment_student: Set(metadata::encode(&robot_bag)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let robot = robot.insert(db).await?;

    team_members::Entity::insert(team_members::ActiveModel {
        project_id: Set(robot.id),
        student_id: Set(carla.id),
        ..Default::default()
    })
    .exec(db)
    .await?;

    info!("Seeded demo data: 5 users, 2 projects");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: &str,
) -> Result<users::Model> {
    let user = users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = setup_test_db().await;

        seed_demo_data(&db).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let user_count = users::Entity::find().all(&db).await.unwrap().len();
        let project_count = projects::Entity::find().all(&db).await.unwrap().len();
        assert_eq!(user_count, 5);
        assert_eq!(project_count, 2);
    }

    #[tokio::test]
    async fn test_seeded_bag_decodes() {
        let db = setup_test_db().await;
        seed_demo_data(&db).await.unwrap();

        let farm = projects::Entity::find()
            .filter(projects::Column::Name.eq("Smart Farm Monitor"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        let bag = metadata::decode(farm.comment_student.as_deref()).unwrap();
        assert_eq!(bag.team_members.len(), 3);
        assert!(bag.team_members[0].is_primary);
        assert_eq!(bag.course_code.as_deref(), Some("CS4900"));
    }
}
