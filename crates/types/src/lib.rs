//! Shared type definitions for domainctl.
//!
//! Everything here is plain data: the parameter record describing one
//! provisioning intent, the step-by-step ledger produced by a setup run, and
//! the metadata that describes a registry operation to discovery surfaces
//! (CLI listing, MCP tool output). No IO happens in this crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read/write classification of a registry operation.
///
/// Declared by the registry builder that owns the operation, never inferred
/// from the operation name or wire method. The permission guard consults this
/// when a read-only policy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    /// Side-effect free on the remote system.
    Read,
    /// Creates, mutates, or deletes remote state.
    Write,
}

impl AccessClass {
    /// Returns true for operations that mutate remote state.
    pub fn is_write(self) -> bool {
        matches!(self, AccessClass::Write)
    }
}

/// Contact handles attached to a domain registration.
///
/// Handles are numeric identifiers of contacts that already exist on the
/// registrar side. All roles are optional; omitted roles fall back to the
/// registrar account defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactHandles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrant: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<i64>,
}

impl ContactHandles {
    /// Returns true when no role is set.
    pub fn is_empty(&self) -> bool {
        self.registrant.is_none() && self.admin.is_none() && self.tech.is_none() && self.billing.is_none()
    }
}

/// Parameters describing one domain setup run.
///
/// The record is immutable for the lifetime of the run. The only defaults the
/// engine invents are documented on the fields: registration period defaults
/// to one year, mailbox and database provisioning default to enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupParams {
    /// Domain to provision, for example `example.com`.
    pub domain: String,
    /// Nameservers to configure for the domain. Empty list skips the
    /// nameserver stage.
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// Address of the hosting server the site is provisioned on.
    #[serde(default)]
    pub server_ip: String,
    /// Display name of the hosting client/customer.
    #[serde(default)]
    pub client_name: String,
    /// Contact email of the hosting client/customer.
    #[serde(default)]
    pub client_email: String,
    /// Registration period in years. Defaults to 1 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    /// Provision a mailbox alongside the site. Defaults to true when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_mail: Option<bool>,
    /// Provision a database alongside the site. Defaults to true when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_db: Option<bool>,
    /// Contact handles to attach to the registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<ContactHandles>,
    /// Skip the registration stage regardless of availability. Used to
    /// re-run a partially completed setup against an already-owned domain.
    #[serde(default)]
    pub skip_registration: bool,
    /// Hosting server identifier override. Omitted from the provisioning
    /// call entirely when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

/// The fixed stages of a setup run, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    Validate,
    CheckAvailability,
    Register,
    SetNameservers,
    ProvisionHosting,
}

impl SetupStep {
    /// Stable step name as it appears in serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            SetupStep::Validate => "validate",
            SetupStep::CheckAvailability => "check_availability",
            SetupStep::Register => "register",
            SetupStep::SetNameservers => "set_nameservers",
            SetupStep::ProvisionHosting => "provision_hosting",
        }
    }
}

/// Outcome status of a single setup stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The stage executed and succeeded.
    Ok,
    /// The stage executed and failed. Fatal to the run.
    Error,
    /// The stage was intentionally bypassed. Never fatal.
    Skipped,
}

/// One entry of the append-only setup ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Stage this outcome belongs to.
    pub step: SetupStep,
    /// How the stage ended.
    pub status: StepStatus,
    /// Raw result returned by the invoked operation, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Why the stage was skipped. Present only for skipped outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Failure message. Present only for error outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    /// Successful stage outcome carrying the operation result.
    pub fn ok(step: SetupStep, data: Value) -> Self {
        Self {
            step,
            status: StepStatus::Ok,
            data: Some(data),
            reason: None,
            error: None,
        }
    }

    /// Failed stage outcome carrying the failure message.
    pub fn error(step: SetupStep, message: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Error,
            data: None,
            reason: None,
            error: Some(message.into()),
        }
    }

    /// Intentionally bypassed stage outcome carrying the skip reason.
    pub fn skipped(step: SetupStep, reason: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            data: None,
            reason: Some(reason.into()),
            error: None,
        }
    }
}

/// Best-effort summary of side effects a setup run actually performed.
///
/// Telemetry only; the step ledger is the authoritative record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSummary {
    /// The registration operation completed.
    #[serde(default)]
    pub registered: bool,
    /// The nameserver configuration operation completed.
    #[serde(default)]
    pub nameservers_configured: bool,
    /// The hosting provisioning operation completed.
    #[serde(default)]
    pub hosting_provisioned: bool,
    /// Raw provisioning result returned by the hosting system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Value>,
}

/// Aggregate result of one setup run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupReport {
    /// True iff every executed stage succeeded. Skipped stages do not count
    /// against success.
    pub ok: bool,
    /// Domain the run was for, as supplied (trimmed).
    pub domain: String,
    /// Ordered stage outcomes, one per attempted or bypassed stage.
    pub steps: Vec<StepOutcome>,
    /// Side-effect summary accumulated across stages.
    pub created: CreatedSummary,
}

/// Discovery metadata for a registry operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpSummary {
    /// Unique operation name within its registry.
    pub name: String,
    /// One-line description of what the operation does.
    pub description: String,
    /// Read/write classification declared by the registry builder.
    pub access: AccessClass,
    /// JSON schema of the operation's argument record.
    pub input_schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skipped_outcome_serializes_reason_and_omits_error() {
        let outcome = StepOutcome::skipped(SetupStep::Register, "domain not available");
        let value = serde_json::to_value(&outcome).expect("serialize outcome");
        assert_eq!(value["step"], json!("register"));
        assert_eq!(value["status"], json!("skipped"));
        assert_eq!(value["reason"], json!("domain not available"));
        assert!(value.get("error").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn params_accept_minimal_payload() {
        let params: SetupParams = serde_json::from_value(json!({
            "domain": "example.com"
        }))
        .expect("deserialize params");
        assert_eq!(params.domain, "example.com");
        assert!(params.nameservers.is_empty());
        assert!(!params.skip_registration);
        assert!(params.period.is_none());
    }

    #[test]
    fn created_summary_omits_hosting_payload_when_absent() {
        let summary = CreatedSummary {
            registered: true,
            ..CreatedSummary::default()
        };
        let value = serde_json::to_value(&summary).expect("serialize summary");
        assert_eq!(value["registered"], json!(true));
        assert!(value.get("hosting").is_none());
    }
}
