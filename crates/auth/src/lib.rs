//! `bazaar-auth`: pure authorization boundary for marketplace actors.
//!
//! This crate is intentionally decoupled from HTTP and storage: it answers
//! "may this principal do that?" and models the admin-panel user directory.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, RolePolicy, authorize, ensure_vendor_scope};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use user::{UserAccount, UserFilter, UserStatus, change_user_status};
