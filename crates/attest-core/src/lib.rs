//! # attest-core
//!
//! Core types and canonical encoding for the Attest audit ledger.
//!
//! This crate provides the foundational types shared across all Attest crates:
//! - `LedgerEvent` and the verification/reporting result structs
//! - Classification enums (severity, category, outcome, integrity state)
//! - The canonical event encoder and chain digest (the hash contract)
//! - Event-name classification and the material-event predicate
//! - The metadata byte-budget boundary helper
//! - ID prefix constants
//!
//! Error types live with their owning crates (`DatabaseError` in attest-db,
//! `ConfigError` in attest-config); nothing in this crate can fail.

pub mod canonical;
pub mod classify;
pub mod entities;
pub mod enums;
pub mod ids;
pub mod metadata;
