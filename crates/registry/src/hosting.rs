//! Hosting-panel operation catalog.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map as JsonMap, Value, json};

use domainctl_rpc::HostingRpc;
use domainctl_types::AccessClass::{Read, Write};

use crate::args::{opt_bool, opt_str, require_str};
use crate::names;
use crate::op::RpcOp;
use crate::policy::PermissionPolicy;
use crate::registry::OpRegistry;

/// Build the guard-wrapped hosting operation registry.
pub fn build_hosting_ops(rpc: Arc<dyn HostingRpc>, policy: Arc<PermissionPolicy>) -> OpRegistry {
    let ops = vec![
        RpcOp::hosting(
            Arc::clone(&rpc),
            names::PROVISION_SITE,
            Write,
            "site.provision",
            "Provision a web site for a client on a hosting server",
            json!({
                "type": "object",
                "properties": {
                    "domain": {"type": "string"},
                    "clientName": {"type": "string"},
                    "clientEmail": {"type": "string"},
                    "serverIp": {"type": "string"},
                    "createMail": {"type": "boolean", "default": true},
                    "createDb": {"type": "boolean", "default": true},
                    "serverId": {"type": "string"}
                },
                "required": ["domain", "clientName", "clientEmail", "serverIp"],
                "additionalProperties": false
            }),
            map_provision_site,
        ),
        RpcOp::hosting(
            Arc::clone(&rpc),
            names::LIST_SERVERS,
            Read,
            "server.list",
            "List hosting servers available for provisioning",
            json!({"type": "object", "properties": {}, "additionalProperties": false}),
            |_args| Ok(JsonMap::new()),
        ),
        RpcOp::hosting(
            Arc::clone(&rpc),
            names::GET_SITE,
            Read,
            "site.info",
            "Fetch the provisioning status of a site by domain",
            json!({
                "type": "object",
                "properties": {"domain": {"type": "string"}},
                "required": ["domain"],
                "additionalProperties": false
            }),
            map_site_info,
        ),
    ];
    OpRegistry::guarded(ops, policy)
}

fn map_provision_site(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    params.insert("domain".into(), Value::String(require_str(args, "domain")?));
    params.insert("clientName".into(), Value::String(require_str(args, "clientName")?));
    params.insert("clientEmail".into(), Value::String(require_str(args, "clientEmail")?));
    params.insert("serverIp".into(), Value::String(require_str(args, "serverIp")?));
    params.insert("createMail".into(), json!(opt_bool(args, "createMail")?.unwrap_or(true)));
    params.insert("createDb".into(), json!(opt_bool(args, "createDb")?.unwrap_or(true)));
    // serverId is an override: omitted entirely unless explicitly supplied.
    if let Some(server_id) = opt_str(args, "serverId")? {
        params.insert("serverId".into(), Value::String(server_id));
    }
    Ok(params)
}

fn map_site_info(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    params.insert("domain".into(), Value::String(require_str(args, "domain")?));
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domainctl_rpc::RpcError;
    use std::sync::Mutex;

    struct RecordingRpc {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl HostingRpc for RecordingRpc {
        async fn call(&self, action: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((action.to_string(), Value::Object(params)));
            Ok(json!({"siteId": 7}))
        }
    }

    fn args(value: Value) -> JsonMap<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[tokio::test]
    async fn provision_site_defaults_toggles_and_omits_server_id() {
        let rpc = Arc::new(RecordingRpc { calls: Mutex::new(Vec::new()) });
        let registry = build_hosting_ops(Arc::clone(&rpc) as Arc<dyn HostingRpc>, Arc::new(PermissionPolicy::unrestricted()));

        registry
            .get(names::PROVISION_SITE)
            .expect("provision op")
            .invoke(args(json!({
                "domain": "example.com",
                "clientName": "Jane Client",
                "clientEmail": "jane@example.com",
                "serverIp": "203.0.113.10"
            })))
            .await
            .expect("invoke provision");

        let calls = rpc.calls.lock().expect("calls lock");
        let (action, params) = &calls[0];
        assert_eq!(action, "site.provision");
        assert_eq!(params["createMail"], json!(true));
        assert_eq!(params["createDb"], json!(true));
        assert!(params.get("serverId").is_none(), "serverId must be omitted, not null");
    }

    #[tokio::test]
    async fn provision_site_passes_explicit_overrides_through() {
        let rpc = Arc::new(RecordingRpc { calls: Mutex::new(Vec::new()) });
        let registry = build_hosting_ops(Arc::clone(&rpc) as Arc<dyn HostingRpc>, Arc::new(PermissionPolicy::unrestricted()));

        registry
            .get(names::PROVISION_SITE)
            .expect("provision op")
            .invoke(args(json!({
                "domain": "example.com",
                "clientName": "Jane Client",
                "clientEmail": "jane@example.com",
                "serverIp": "203.0.113.10",
                "createMail": false,
                "serverId": "web-12"
            })))
            .await
            .expect("invoke provision");

        let calls = rpc.calls.lock().expect("calls lock");
        let (_, params) = &calls[0];
        assert_eq!(params["createMail"], json!(false));
        assert_eq!(params["createDb"], json!(true));
        assert_eq!(params["serverId"], json!("web-12"));
    }
}
