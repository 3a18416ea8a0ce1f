mod fake_transport;
mod file_store;
mod memory_store;
mod navigator_impl;
mod reqwest_transport;

pub use fake_transport::*;
pub use file_store::*;
pub use memory_store::*;
pub use navigator_impl::*;
pub use reqwest_transport::*;
