//! Hosting-panel HTTP transport.
//!
//! The hosting panel exposes a single JSON POST endpoint. Requests carry an
//! `{action, params}` envelope with a bearer token; responses carry
//! `{ok, data, error}`. Actions map one-to-one onto panel features (site
//! provisioning, server listing, site status).

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value, json};
use tracing::debug;
use url::Url;

use crate::RpcError;

/// Opaque hosting-panel call surface.
#[async_trait]
pub trait HostingRpc: Send + Sync {
    /// Invoke one panel action with a flat parameter record.
    async fn call(&self, action: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError>;
}

/// Production hosting-panel client.
pub struct HostingClient {
    endpoint: Url,
    token: String,
    http: reqwest::Client,
}

impl HostingClient {
    /// Create a client against the panel API endpoint.
    pub fn new(endpoint: Url, token: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| RpcError::Transport(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            endpoint,
            token: token.into(),
            http,
        })
    }
}

#[async_trait]
impl HostingRpc for HostingClient {
    async fn call(&self, action: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError> {
        debug!(action, "hosting call");
        let body = json!({ "action": action, "params": Value::Object(params) });
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|error| RpcError::Transport(format!("hosting request failed: {error}. Hint: check connection and the configured panel endpoint")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("HTTP {}: {}", status.as_u16(), text.trim())));
        }
        let envelope: Value =
            serde_json::from_str(&text).map_err(|error| RpcError::Malformed(format!("hosting response is not JSON: {error}")))?;
        decode_hosting_response(envelope)
    }
}

/// Decode the panel `{ok, data, error}` envelope into its payload.
fn decode_hosting_response(response: Value) -> Result<Value, RpcError> {
    match response.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(response.get("data").cloned().unwrap_or(Value::Null)),
        Some(false) => {
            let message = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unspecified hosting error")
                .to_string();
            Err(RpcError::Api { code: -1, message })
        }
        None => Err(RpcError::Malformed("hosting response is missing the 'ok' field".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_returns_data_on_success() {
        let payload = decode_hosting_response(json!({"ok": true, "data": {"siteId": 42}})).expect("decode success envelope");
        assert_eq!(payload["siteId"], json!(42));
    }

    #[test]
    fn decode_surfaces_panel_error_message() {
        let error = decode_hosting_response(json!({"ok": false, "error": "quota exceeded"})).unwrap_err();
        match error {
            RpcError::Api { message, .. } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_envelope_without_ok() {
        let error = decode_hosting_response(json!({"data": {}})).unwrap_err();
        assert!(matches!(error, RpcError::Malformed(_)));
    }
}
