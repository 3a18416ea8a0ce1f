mod http_transport;
mod key_value_store;
mod navigator;

pub use http_transport::*;
pub use key_value_store::*;
pub use navigator::*;
