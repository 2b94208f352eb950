//! ID prefix constants.
//!
//! IDs are formatted as `{prefix}-{8 hex chars}` and generated in attest-db
//! via `randomblob(4)`.

/// Ledger event.
pub const EVENT: &str = "evt";

/// Organization (tenant partition key).
pub const ORG: &str = "org";

/// Acting user.
pub const USER: &str = "usr";

/// All prefixes, for exhaustive generation tests.
pub const ALL_PREFIXES: &[&str] = &[EVENT, ORG, USER];
