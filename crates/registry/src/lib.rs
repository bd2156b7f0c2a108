//! Operation registries for domainctl.
//!
//! An operation is a named, independently invocable remote action with a
//! declared read/write classification and a flat JSON argument record. This
//! crate defines the invocable contract, the per-registry permission policy
//! and its guard decorator, and the builders for the two catalogs the rest of
//! the system consumes: the registrar operations and the hosting-panel
//! operations.
//!
//! Registries are built fresh per tool-set construction, are immutable
//! afterwards, and look operations up by exact name. The guard re-checks the
//! policy on every invocation and rejects disallowed calls strictly before
//! any network effect.

mod args;
mod hosting;
pub mod names;
mod op;
mod policy;
mod registrar;
mod registry;

pub use hosting::build_hosting_ops;
pub use op::{FnOp, Operation};
pub use policy::{PermissionPolicy, PolicyRule, PolicyViolation};
pub use registrar::build_registrar_ops;
pub use registry::{Guarded, OpRegistry};
