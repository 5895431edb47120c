pub mod data_source;
pub mod delta;
pub mod lookup_cache;
pub mod role_management;
pub mod user_management;

pub use delta::{claim_delta, role_delta, Delta};
pub use lookup_cache::LookupCache;
pub use user_management::UserManagementService;
