//! The pending change ledger.
//!
//! Every submitted edit lands here. Submissions with the same payload are
//! merged into one record whose reporter set grows with each independent
//! report; the reporter count is the trust signal the materializer filters
//! on. Records leave the ledger only when a commit retires them.
//!
//! # Modules
//!
//! - [`store`] -- The [`LedgerStore`] persistence seam
//! - [`memory`] -- [`MemoryLedgerStore`], an in-process backend
//! - [`filter`] -- Include/exclude id filters
//! - [`identity`] -- Stable identity keys for payloads
//! - [`ledger`] -- The [`Ledger`] facade used by the rest of the service
//! - [`error`] -- Error types

pub mod error;
pub mod filter;
pub mod identity;
pub mod ledger;
pub mod memory;
pub mod store;

// Re-export primary types at crate root.
pub use error::LedgerError;
pub use filter::ChangeFilter;
pub use identity::identity_key;
pub use ledger::Ledger;
pub use memory::MemoryLedgerStore;
pub use store::{AddOutcome, LedgerStore, LedgerSummary, Retirement};
