mod auth_service;
mod billing_service;
mod community_service;
mod generation_service;
mod project_service;

pub use auth_service::*;
pub use billing_service::*;
pub use community_service::*;
pub use generation_service::*;
pub use project_service::*;
