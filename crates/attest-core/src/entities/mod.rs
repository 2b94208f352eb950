//! Entity structs for the Attest ledger.
//!
//! Each struct either maps to a row in the libSQL database (`LedgerEvent`)
//! or is a verification/reporting result returned directly as JSON. All
//! derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod event;
mod reporting;
mod verification;

pub use event::LedgerEvent;
pub use reporting::{ComplianceSummary, GroupCount, HazardDriver, ReportingWindow};
pub use verification::{ChainFailure, ChainIntegrityStatus, VerificationResult};
