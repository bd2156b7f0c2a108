//! The invocable operation contract and its two concrete carriers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value};

use domainctl_rpc::{HostingRpc, RegistrarRpc};
use domainctl_types::AccessClass;

/// A named, independently invocable remote action.
///
/// Operations are constructed once per registry build, are stateless between
/// invocations, and accept a flat JSON argument record.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Unique name within the owning registry.
    fn name(&self) -> &str;

    /// Read/write classification, declared at construction time.
    fn access(&self) -> AccessClass;

    /// One-line description for discovery surfaces.
    fn description(&self) -> &str;

    /// JSON schema of the accepted argument record.
    fn input_schema(&self) -> Value;

    /// Invoke the operation with the given arguments.
    async fn invoke(&self, args: JsonMap<String, Value>) -> Result<Value>;
}

/// Maps a tool argument record onto the wire parameter record.
pub(crate) type ParamMapper = fn(&JsonMap<String, Value>) -> Result<JsonMap<String, Value>>;

/// Reshapes a raw wire result into the operation's published result shape.
pub(crate) type ResultReshape = fn(Value) -> Value;

pub(crate) enum Backend {
    Registrar(Arc<dyn RegistrarRpc>),
    Hosting(Arc<dyn HostingRpc>),
}

impl Backend {
    async fn call(&self, method: &str, params: JsonMap<String, Value>) -> Result<Value> {
        let value = match self {
            Backend::Registrar(rpc) => rpc.call(method, params).await?,
            Backend::Hosting(rpc) => rpc.call(method, params).await?,
        };
        Ok(value)
    }
}

/// A wire-backed operation: argument mapping, one remote call, optional
/// result reshape.
pub struct RpcOp {
    name: &'static str,
    access: AccessClass,
    description: &'static str,
    method: &'static str,
    schema: Value,
    backend: Backend,
    map: ParamMapper,
    reshape: Option<ResultReshape>,
}

impl RpcOp {
    /// Build a registrar-backed operation.
    pub(crate) fn registrar(
        rpc: Arc<dyn RegistrarRpc>,
        name: &'static str,
        access: AccessClass,
        method: &'static str,
        description: &'static str,
        schema: Value,
        map: ParamMapper,
    ) -> Arc<dyn Operation> {
        Arc::new(Self {
            name,
            access,
            description,
            method,
            schema,
            backend: Backend::Registrar(rpc),
            map,
            reshape: None,
        })
    }

    /// Build a hosting-backed operation.
    pub(crate) fn hosting(
        rpc: Arc<dyn HostingRpc>,
        name: &'static str,
        access: AccessClass,
        method: &'static str,
        description: &'static str,
        schema: Value,
        map: ParamMapper,
    ) -> Arc<dyn Operation> {
        Arc::new(Self {
            name,
            access,
            description,
            method,
            schema,
            backend: Backend::Hosting(rpc),
            map,
            reshape: None,
        })
    }

    /// Build a registrar-backed operation whose raw wire result is reshaped
    /// before it is returned to the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn registrar_reshaped(
        rpc: Arc<dyn RegistrarRpc>,
        name: &'static str,
        access: AccessClass,
        method: &'static str,
        description: &'static str,
        schema: Value,
        map: ParamMapper,
        reshape: ResultReshape,
    ) -> Arc<dyn Operation> {
        Arc::new(Self {
            name,
            access,
            description,
            method,
            schema,
            backend: Backend::Registrar(rpc),
            map,
            reshape: Some(reshape),
        })
    }
}

#[async_trait]
impl Operation for RpcOp {
    fn name(&self) -> &str {
        self.name
    }

    fn access(&self) -> AccessClass {
        self.access
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn invoke(&self, args: JsonMap<String, Value>) -> Result<Value> {
        let params = (self.map)(&args)?;
        let value = self.backend.call(self.method, params).await?;
        Ok(match self.reshape {
            Some(reshape) => reshape(value),
            None => value,
        })
    }
}

type OpFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A closure-backed operation.
///
/// Useful for composing registries out of local behavior and for test stubs
/// that stand in for remote operations.
pub struct FnOp {
    name: String,
    access: AccessClass,
    description: String,
    schema: Value,
    handler: Box<dyn Fn(JsonMap<String, Value>) -> OpFuture + Send + Sync>,
}

impl FnOp {
    /// Build an operation from an async closure.
    pub fn new<F, Fut>(name: impl Into<String>, access: AccessClass, handler: F) -> Arc<dyn Operation>
    where
        F: Fn(JsonMap<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            access,
            description: String::new(),
            schema: serde_json::json!({ "type": "object" }),
            handler: Box::new(move |args| Box::pin(handler(args))),
        })
    }
}

#[async_trait]
impl Operation for FnOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&self) -> AccessClass {
        self.access
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn invoke(&self, args: JsonMap<String, Value>) -> Result<Value> {
        (self.handler)(args).await
    }
}
