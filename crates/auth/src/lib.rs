//! `toolcrib-auth` — actor identity and role policy.
//!
//! Identity is supplied by a trusted provider upstream; this layer only
//! models who is acting and which role gate applies, with no HTTP or
//! storage in sight.

pub mod actor;
pub mod authorize;
pub mod directory;
pub mod roles;

pub use actor::Actor;
pub use authorize::{AuthzError, require_admin};
pub use directory::{InMemoryUserDirectory, UserDirectory, UserRecord};
pub use roles::Role;
