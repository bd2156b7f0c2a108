//! MCP surface for domainctl.
//!
//! Exposes the registrar and hosting operation registries to automated
//! agents as Model Context Protocol tools: discovery (`list_operations`),
//! guarded dispatch (`run_operation`), and the composed setup workflow
//! (`setup_domain`). The server is hosted over streamable HTTP on a
//! loopback address.

mod server;

pub use server::{DomainctlMcpCore, McpToolServices, RunningMcpServer, resolve_bind_address, start_server};
