//! Domain setup workflow engine.
//!
//! Orchestrates the fixed availability → registration → nameserver →
//! hosting pipeline across two independently supplied operation registries,
//! with fail-fast semantics and a complete audit ledger. See [`run_setup`].

mod setup;

pub use setup::run_setup;
