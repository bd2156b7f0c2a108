use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde_json::json;
use tracing::debug;

use domainctl_engine::run_setup;
use domainctl_registry::{OpRegistry, PolicyViolation};

use crate::server::schemas::{RunOperationRequest, SetupDomainRequest};

/// Shared services for the MCP tool handlers: the two guard-wrapped
/// operation registries.
pub struct McpToolServices {
    registrar: OpRegistry,
    hosting: OpRegistry,
}

impl McpToolServices {
    /// Create services backed by the provided registries.
    pub fn new(registrar: OpRegistry, hosting: OpRegistry) -> Self {
        Self { registrar, hosting }
    }
}

/// MCP tool handler exposing discovery, dispatch, and the setup workflow.
#[derive(Clone)]
pub struct DomainctlMcpCore {
    tool_router: ToolRouter<Self>,
    services: Arc<McpToolServices>,
}

#[tool_router]
impl DomainctlMcpCore {
    /// Create a new MCP core handler with shared service dependencies.
    pub fn new(services: Arc<McpToolServices>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            services,
        }
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "List every available registrar and hosting operation with its name, read/write access class, and argument schema. Use first, before any run_operation call."
    )]
    async fn list_operations(&self) -> Result<CallToolResult, ErrorData> {
        let structured = json!({
            "registrar": self.services.registrar.summaries(),
            "hosting": self.services.hosting.summaries(),
        });
        Ok(CallToolResult::structured(structured))
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Invoke one operation by name with a flat argument record. Operations classified as writes are rejected when the active policy is read-only or the operation is outside the allow-list."
    )]
    async fn run_operation(&self, param: Parameters<RunOperationRequest>) -> Result<CallToolResult, ErrorData> {
        let RunOperationRequest { name, arguments } = param.0;
        debug!(operation = %name, "MCP operation dispatch");
        let op = self
            .services
            .registrar
            .get(&name)
            .or_else(|| self.services.hosting.get(&name))
            .ok_or_else(|| {
                ErrorData::invalid_params(
                    format!("unknown operation '{name}'"),
                    Some(json!({"next_step": "Call list_operations for valid operation names."})),
                )
            })?;

        let value = op.invoke(arguments.unwrap_or_default()).await.map_err(map_invoke_error)?;
        Ok(CallToolResult::structured(value))
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Run the composed domain setup workflow: availability check, registration (skipped when unavailable or explicitly skipped), nameserver configuration, hosting provisioning. Returns the full step ledger; inspect `ok` and `steps` rather than expecting an error."
    )]
    async fn setup_domain(&self, param: Parameters<SetupDomainRequest>) -> Result<CallToolResult, ErrorData> {
        let params = param.0.into_params();
        let report = run_setup(&self.services.registrar, &self.services.hosting, &params).await;
        let structured = serde_json::to_value(&report)
            .map_err(|error| ErrorData::internal_error(format!("failed to serialize setup report: {error}"), None))?;
        Ok(CallToolResult::structured(structured))
    }
}

#[tool_handler]
impl ServerHandler for DomainctlMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "Domainctl".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Domainctl MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "GENERAL FLOW:\n1) Call list_operations.\n2) Pick an operation and build its argument record from input_schema.\n3) Call run_operation with name and arguments.\nWRITES:\n- Operations with access=write may be rejected by the active policy; surface the policy message to the user instead of retrying.\nWORKFLOW:\n- Use setup_domain for the end-to-end register-and-provision flow. It never fails as a tool call; read ok and steps from the result. Re-run with skipRegistration=true to resume after a partial success."
                    .to_string(),
            ),
        }
    }
}

/// Map an operation failure onto the MCP error taxonomy. Policy rejections
/// are invalid-params (the agent picked a disallowed tool), everything else
/// is an internal error carrying the message only.
fn map_invoke_error(error: anyhow::Error) -> ErrorData {
    if let Some(violation) = error.downcast_ref::<PolicyViolation>() {
        return ErrorData::invalid_params(
            violation.to_string(),
            Some(json!({"operation": violation.operation, "rule": violation.rule.to_string()})),
        );
    }
    ErrorData::internal_error(error.to_string(), None)
}
