pub mod comments;
pub mod links;
pub mod projects;
pub mod team_members;
pub mod users;
