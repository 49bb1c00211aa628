use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// No foreign keys anywhere: advisor, course, student, and author references
// are weak by contract, and deleting a user must never cascade into
// projects or comments.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .index(
                        Index::create()
                            .name("idx_users_email")
                            .table(Users::Table)
                            .col(Users::Email)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create projects table
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::ProjectType).string().not_null())
                    .col(ColumnDef::new(Projects::Status).string().not_null())
                    .col(ColumnDef::new(Projects::Semester).integer().not_null())
                    .col(ColumnDef::new(Projects::Year).integer())
                    .col(ColumnDef::new(Projects::TeamName).string())
                    .col(ColumnDef::new(Projects::CompetitionName).string())
                    .col(ColumnDef::new(Projects::StartDate).string())
                    .col(ColumnDef::new(Projects::EndDate).string())
                    .col(ColumnDef::new(Projects::AdvisorId).integer())
                    .col(ColumnDef::new(Projects::CourseId).integer())
                    .col(ColumnDef::new(Projects::Grade).string())
                    .col(ColumnDef::new(Projects::FeedbackAdvisor).text())
                    .col(ColumnDef::new(Projects::FeedbackCoordinator).text())
                    .col(ColumnDef::new(Projects::CommentStudent).text())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Create team_members table
        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamMembers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamMembers::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TeamMembers::StudentId).integer().not_null())
                    .index(
                        Index::create()
                            .name("idx_team_members_student_project")
                            .table(TeamMembers::Table)
                            .col(TeamMembers::StudentId)
                            .col(TeamMembers::ProjectId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create links table
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Links::Link).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create comments table
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comments::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(ColumnDef::new(Comments::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    ProjectType,
    Status,
    Semester,
    Year,
    TeamName,
    CompetitionName,
    StartDate,
    EndDate,
    AdvisorId,
    CourseId,
    Grade,
    FeedbackAdvisor,
    FeedbackCoordinator,
    CommentStudent,
    CreatedAt,
}

#[derive(Iden)]
enum TeamMembers {
    Table,
    Id,
    ProjectId,
    StudentId,
}

#[derive(Iden)]
enum Links {
    Table,
    Id,
    ProjectId,
    Link,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    ProjectId,
    AuthorId,
    Body,
    CreatedAt,
}
