//! Remote transports for domainctl.
//!
//! Two independent remote systems sit behind this crate: the domain registrar
//! (JSON-RPC with a cookie-backed session) and the hosting panel (token-auth
//! JSON POST API). Both are exposed as async traits so every consumer — the
//! operation registries, the workflow engine tests — can swap in fakes.

mod error;
mod hosting;
mod registrar;

pub use error::RpcError;
pub use hosting::{HostingClient, HostingRpc};
pub use registrar::{RegistrarClient, RegistrarRpc};
