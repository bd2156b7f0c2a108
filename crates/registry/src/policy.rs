//! Per-registry permission policy.

use indexmap::IndexSet;
use std::fmt;
use thiserror::Error;

use domainctl_types::AccessClass;

/// Least-privilege policy associated with a registry at construction time.
///
/// The policy never changes after the registry is built; the guard re-checks
/// it on every invocation.
#[derive(Debug, Clone, Default)]
pub struct PermissionPolicy {
    /// When set, operations classified as writes are rejected.
    pub read_only: bool,
    /// When non-empty, only the named operations may be invoked.
    pub allowed_operations: IndexSet<String>,
}

impl PermissionPolicy {
    /// A policy that permits everything.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// A read-only policy with no allow-list.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            allowed_operations: IndexSet::new(),
        }
    }

    /// Check one operation against the policy.
    ///
    /// Must be called strictly before any network-bound invocation begins so
    /// rejected calls have no remote side effect.
    pub fn ensure_allowed(&self, operation: &str, access: AccessClass) -> Result<(), PolicyViolation> {
        if self.read_only && access.is_write() {
            return Err(PolicyViolation {
                operation: operation.to_string(),
                rule: PolicyRule::ReadOnly,
            });
        }
        if !self.allowed_operations.is_empty() && !self.allowed_operations.contains(operation) {
            return Err(PolicyViolation {
                operation: operation.to_string(),
                rule: PolicyRule::AllowedOperations,
            });
        }
        Ok(())
    }
}

/// The policy rule a rejected invocation violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    ReadOnly,
    AllowedOperations,
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::ReadOnly => write!(f, "readOnly"),
            PolicyRule::AllowedOperations => write!(f, "allowedOperations"),
        }
    }
}

/// Rejection raised by the guard before an operation reaches the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("operation '{operation}' rejected by the {rule} policy")]
pub struct PolicyViolation {
    /// Operation that was rejected.
    pub operation: String,
    /// Rule that caused the rejection.
    pub rule: PolicyRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_policy_rejects_writes_and_passes_reads() {
        let policy = PermissionPolicy::read_only();
        assert!(policy.ensure_allowed("check_domain", AccessClass::Read).is_ok());

        let violation = policy.ensure_allowed("register_domain", AccessClass::Write).unwrap_err();
        assert_eq!(violation.rule, PolicyRule::ReadOnly);
        assert_eq!(violation.operation, "register_domain");
        assert!(violation.to_string().contains("readOnly"));
    }

    #[test]
    fn allow_list_rejects_unlisted_operations_regardless_of_access() {
        let policy = PermissionPolicy {
            read_only: false,
            allowed_operations: ["check_domain"].into_iter().map(String::from).collect(),
        };
        assert!(policy.ensure_allowed("check_domain", AccessClass::Read).is_ok());

        let violation = policy.ensure_allowed("list_domains", AccessClass::Read).unwrap_err();
        assert_eq!(violation.rule, PolicyRule::AllowedOperations);
        assert!(violation.to_string().contains("allowedOperations"));
    }

    #[test]
    fn empty_allow_list_is_unrestricted() {
        let policy = PermissionPolicy::unrestricted();
        assert!(policy.ensure_allowed("delete_domain", AccessClass::Write).is_ok());
    }

    #[test]
    fn read_only_rule_takes_precedence_over_allow_list() {
        let policy = PermissionPolicy {
            read_only: true,
            allowed_operations: ["register_domain"].into_iter().map(String::from).collect(),
        };
        let violation = policy.ensure_allowed("register_domain", AccessClass::Write).unwrap_err();
        assert_eq!(violation.rule, PolicyRule::ReadOnly);
    }
}
