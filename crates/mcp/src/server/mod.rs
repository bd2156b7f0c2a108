mod core;
mod http;
mod schemas;

pub use core::{DomainctlMcpCore, McpToolServices};
pub use http::{RunningMcpServer, resolve_bind_address, start_server};
