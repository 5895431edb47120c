pub mod config;
pub mod identity;
pub mod store;

pub use config::*;
pub use identity::*;
pub use store::*;
