mod billing;
mod community;
mod event;
mod generation;
mod project;
mod session;
mod unit;
mod user;

pub mod prompt;

pub use billing::*;
pub use community::*;
pub use event::*;
pub use generation::*;
pub use project::*;
pub use session::*;
pub use unit::*;
pub use user::*;
