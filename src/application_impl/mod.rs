mod auth_service_impl;
mod billing_service_impl;
mod community_service_impl;
mod generation_service_impl;
mod project_service_impl;

pub use auth_service_impl::*;
pub use billing_service_impl::*;
pub use community_service_impl::*;
pub use generation_service_impl::*;
pub use project_service_impl::*;
