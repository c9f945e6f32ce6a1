//! `PostgreSQL` persistence for the change ledger.
//!
//! The ledger itself is backend-agnostic; this crate supplies
//! [`PgLedgerStore`], a [`LedgerStore`](crowdmap_ledger::LedgerStore) over a
//! single `changes` table, plus the connection pool and embedded migrations.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`change_store`] -- The `changes` table as a ledger store
//! - [`error`] -- Shared error types

pub mod change_store;
pub mod error;
pub mod postgres;

// Re-export primary types for convenience.
pub use change_store::{ChangeRow, PgLedgerStore};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
