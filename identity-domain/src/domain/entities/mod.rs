pub mod claim_types;
pub mod common;
pub mod response;
pub mod role;
pub mod user;

pub use common::*;
pub use response::*;
pub use role::*;
pub use user::*;
