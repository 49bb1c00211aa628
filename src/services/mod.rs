pub mod comment_service;
pub mod project_edit_service;
pub mod project_service;
pub mod review_service;
pub mod user_directory;

pub use comment_service::*;
pub use project_edit_service::*;
pub use project_service::*;
pub use review_service::*;
pub use user_directory::*;
