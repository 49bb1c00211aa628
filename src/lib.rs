pub mod auth;
pub mod errors;
pub mod metadata;
pub mod taxonomy;

pub mod database;
pub mod server;
pub mod services;
