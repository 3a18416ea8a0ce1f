//! Session core: credentials, their renewal, and the HTTP client built on them.

mod api_client;
mod error;
mod event_bus;
mod refresh;
mod refresher;
mod token_store;

pub use api_client::*;
pub use error::*;
pub use event_bus::*;
pub use refresh::*;
pub use refresher::*;
pub use token_store::*;
