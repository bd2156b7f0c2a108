//! Ordered operation registry and the permission-guard decorator.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value};
use tracing::warn;

use domainctl_types::{AccessClass, OpSummary};

use crate::op::Operation;
use crate::policy::PermissionPolicy;

/// Policy-checking decorator around any operation.
///
/// The check runs on every invocation, before the delegate is touched, so a
/// rejected call never reaches the remote system.
pub struct Guarded {
    inner: Arc<dyn Operation>,
    policy: Arc<PermissionPolicy>,
}

impl Guarded {
    /// Wrap an operation with a policy.
    pub fn new(inner: Arc<dyn Operation>, policy: Arc<PermissionPolicy>) -> Arc<dyn Operation> {
        Arc::new(Self { inner, policy })
    }
}

#[async_trait]
impl Operation for Guarded {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn access(&self) -> AccessClass {
        self.inner.access()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> Value {
        self.inner.input_schema()
    }

    async fn invoke(&self, args: JsonMap<String, Value>) -> Result<Value> {
        if let Err(violation) = self.policy.ensure_allowed(self.inner.name(), self.inner.access()) {
            warn!(operation = self.inner.name(), rule = %violation.rule, "invocation rejected by policy");
            return Err(violation.into());
        }
        self.inner.invoke(args).await
    }
}

/// An ordered collection of operations, looked up by exact name.
pub struct OpRegistry {
    ops: Vec<Arc<dyn Operation>>,
}

impl OpRegistry {
    /// Build a registry from already-wrapped operations.
    pub fn new(ops: Vec<Arc<dyn Operation>>) -> Self {
        Self { ops }
    }

    /// Build a registry wrapping every operation with the given policy.
    pub fn guarded(ops: Vec<Arc<dyn Operation>>, policy: Arc<PermissionPolicy>) -> Self {
        let ops = ops.into_iter().map(|op| Guarded::new(op, Arc::clone(&policy))).collect();
        Self { ops }
    }

    /// Look up an operation by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.ops.iter().find(|op| op.name() == name).cloned()
    }

    /// Discovery metadata for every operation, in registration order.
    pub fn summaries(&self) -> Vec<OpSummary> {
        self.ops
            .iter()
            .map(|op| OpSummary {
                name: op.name().to_string(),
                description: op.description().to_string(),
                access: op.access(),
                input_schema: op.input_schema(),
            })
            .collect()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when the registry holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::FnOp;
    use crate::policy::PolicyViolation;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop(name: &str, access: AccessClass) -> Arc<dyn Operation> {
        FnOp::new(name.to_string(), access, |_args| async { Ok(json!(null)) })
    }

    #[test]
    fn lookup_is_exact_and_ordered() {
        let registry = OpRegistry::new(vec![noop("alpha", AccessClass::Read), noop("beta", AccessClass::Write)]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("alph").is_none());
        assert_eq!(registry.summaries()[1].name, "beta");
    }

    #[tokio::test]
    async fn guard_rejects_write_before_delegate_runs() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);
        let op = FnOp::new("register_domain", AccessClass::Write, move |_args| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"ok": true}))
            }
        });
        let registry = OpRegistry::guarded(vec![op], Arc::new(PermissionPolicy::read_only()));

        let error = registry
            .get("register_domain")
            .expect("op registered")
            .invoke(JsonMap::new())
            .await
            .unwrap_err();

        let violation = error.downcast_ref::<PolicyViolation>().expect("policy violation");
        assert_eq!(violation.operation, "register_domain");
        assert_eq!(invocations.load(Ordering::SeqCst), 0, "delegate must never run");
    }

    #[tokio::test]
    async fn guard_forwards_allowed_calls_unchanged() {
        let op = FnOp::new("check_domain", AccessClass::Read, |args| async move {
            Ok(json!({"echo": Value::Object(args)}))
        });
        let registry = OpRegistry::guarded(vec![op], Arc::new(PermissionPolicy::read_only()));

        let mut args = JsonMap::new();
        args.insert("domain".into(), json!("example.com"));
        let value = registry
            .get("check_domain")
            .expect("op registered")
            .invoke(args)
            .await
            .expect("guarded read must pass");
        assert_eq!(value["echo"]["domain"], json!("example.com"));
    }
}
