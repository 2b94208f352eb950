//! Repository methods on `LedgerService`, one module per concern.

pub mod append;
pub mod export;
pub mod query;
pub mod reporting;
pub mod verify;

pub use append::AppendRequest;
pub use query::LedgerFilter;
