//! Registrar JSON-RPC transport.
//!
//! The registrar API speaks JSON-RPC over a single HTTPS endpoint. Every
//! request carries a `method` and a flat `params` record; responses carry
//! `{code, msg, resData}` where codes 1000 (completed) and 1001 (pending)
//! mean success. Authentication is a cookie-backed session established with
//! `account.login` lazily on first use.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map as JsonMap, Value, json};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::RpcError;

/// Registrar result codes treated as success.
const CODE_COMPLETED: i64 = 1000;
const CODE_PENDING: i64 = 1001;

/// Opaque registrar call surface.
///
/// Implementations send one method with its parameter record and either
/// return the JSON-compatible result payload or fail with a code and message.
#[async_trait]
pub trait RegistrarRpc: Send + Sync {
    /// Invoke one registrar method with a flat parameter record.
    async fn call(&self, method: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError>;
}

/// Production registrar client.
pub struct RegistrarClient {
    endpoint: Url,
    username: String,
    password: String,
    http: reqwest::Client,
    // Guards lazy login so concurrent first calls do not race the session.
    session_established: Mutex<bool>,
}

impl RegistrarClient {
    /// Create a client against the given JSON-RPC endpoint.
    pub fn new(endpoint: Url, username: impl Into<String>, password: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|error| RpcError::Transport(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            endpoint,
            username: username.into(),
            password: password.into(),
            http,
            session_established: Mutex::new(false),
        })
    }

    async fn ensure_session(&self) -> Result<(), RpcError> {
        let mut established = self.session_established.lock().await;
        if *established {
            return Ok(());
        }
        let mut params = JsonMap::new();
        params.insert("user".into(), Value::String(self.username.clone()));
        params.insert("pass".into(), Value::String(self.password.clone()));
        let response = self.post("account.login", params).await?;
        decode_registrar_response(response)?;
        debug!("registrar session established for {}", self.username);
        *established = true;
        Ok(())
    }

    async fn post(&self, method: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError> {
        let body = json!({ "method": method, "params": Value::Object(params) });
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|error| RpcError::Transport(format!("registrar request failed: {error}. Hint: check connection/proxy and the configured endpoint")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(http_status_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|error| RpcError::Malformed(format!("registrar response is not JSON: {error}")))
    }
}

#[async_trait]
impl RegistrarRpc for RegistrarClient {
    async fn call(&self, method: &str, params: JsonMap<String, Value>) -> Result<Value, RpcError> {
        self.ensure_session().await?;
        debug!(method, "registrar call");
        let response = self.post(method, params).await?;
        decode_registrar_response(response)
    }
}

fn http_status_error(status: StatusCode, body: &str) -> RpcError {
    RpcError::Transport(format!("HTTP {}: {}", status.as_u16(), body.trim()))
}

/// Decode the registrar `{code, msg, resData}` envelope into its payload.
fn decode_registrar_response(response: Value) -> Result<Value, RpcError> {
    let code = response
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| RpcError::Malformed("registrar response is missing a numeric 'code'".into()))?;
    if code == CODE_COMPLETED || code == CODE_PENDING {
        return Ok(response.get("resData").cloned().unwrap_or(Value::Null));
    }
    let message = response
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or("unspecified registrar error")
        .to_string();
    Err(RpcError::Api { code, message })
}
