//! The four-stage domain setup pipeline.
//!
//! Stages run strictly in order, each appending exactly one outcome to the
//! ledger. An `error` outcome aborts the run immediately; a `skipped` outcome
//! never does. The engine raises nothing past its own boundary — every
//! failure is captured in the returned report.

use anyhow::{Result, anyhow};
use serde_json::{Map as JsonMap, Value, json};
use tracing::{debug, info};

use domainctl_registry::{OpRegistry, names};
use domainctl_types::{CreatedSummary, SetupParams, SetupReport, SetupStep, StepOutcome};

/// Run one domain setup against the supplied registries.
///
/// The registrar registry must expose `check_domain`, `register_domain`, and
/// `set_nameservers`; the hosting registry must expose `provision_site`.
/// A missing operation is captured as that stage's error, not a panic.
pub async fn run_setup(registrar: &OpRegistry, hosting: &OpRegistry, params: &SetupParams) -> SetupReport {
    let domain = params.domain.trim().to_string();
    let mut steps: Vec<StepOutcome> = Vec::new();
    let mut created = CreatedSummary::default();

    // The only synchronous validation: an empty domain fails before any
    // remote call.
    if domain.is_empty() {
        steps.push(StepOutcome::error(SetupStep::Validate, "domain must not be empty"));
        return report(false, domain, steps, created);
    }

    info!(domain, "starting domain setup");

    // Stage 1: availability check. Any failure here, including a missing
    // operation, aborts the run.
    let available = match invoke_op(registrar, names::CHECK_DOMAIN, check_args(&domain)).await {
        Ok(result) => {
            let available = availability_from(&result);
            debug!(domain, available, "availability check completed");
            steps.push(StepOutcome::ok(
                SetupStep::CheckAvailability,
                json!({"available": available, "result": result}),
            ));
            available
        }
        Err(error) => {
            steps.push(StepOutcome::error(SetupStep::CheckAvailability, error.to_string()));
            return report(false, domain, steps, created);
        }
    };

    // Stage 2: registration. Skips are not failures; a failed registration
    // is fatal.
    if params.skip_registration {
        steps.push(StepOutcome::skipped(SetupStep::Register, "registration explicitly skipped"));
    } else if available {
        match invoke_op(registrar, names::REGISTER_DOMAIN, register_args(&domain, params)).await {
            Ok(result) => {
                created.registered = true;
                steps.push(StepOutcome::ok(SetupStep::Register, result));
            }
            Err(error) => {
                steps.push(StepOutcome::error(SetupStep::Register, error.to_string()));
                return report(false, domain, steps, created);
            }
        }
    } else {
        steps.push(StepOutcome::skipped(SetupStep::Register, "domain not available"));
    }

    // Stage 3: nameserver configuration. An empty list skips, it never fails.
    if params.nameservers.is_empty() {
        steps.push(StepOutcome::skipped(SetupStep::SetNameservers, "no nameservers supplied"));
    } else {
        match invoke_op(registrar, names::SET_NAMESERVERS, nameserver_args(&domain, params)).await {
            Ok(result) => {
                created.nameservers_configured = true;
                steps.push(StepOutcome::ok(SetupStep::SetNameservers, result));
            }
            Err(error) => {
                steps.push(StepOutcome::error(SetupStep::SetNameservers, error.to_string()));
                return report(false, domain, steps, created);
            }
        }
    }

    // Stage 4: hosting provisioning.
    match invoke_op(hosting, names::PROVISION_SITE, provision_args(&domain, params)).await {
        Ok(result) => {
            created.hosting_provisioned = true;
            created.hosting = Some(result.clone());
            steps.push(StepOutcome::ok(SetupStep::ProvisionHosting, result));
        }
        Err(error) => {
            steps.push(StepOutcome::error(SetupStep::ProvisionHosting, error.to_string()));
            return report(false, domain, steps, created);
        }
    }

    info!(domain, "domain setup completed");
    report(true, domain, steps, created)
}

fn report(ok: bool, domain: String, steps: Vec<StepOutcome>, created: CreatedSummary) -> SetupReport {
    SetupReport { ok, domain, steps, created }
}

async fn invoke_op(registry: &OpRegistry, name: &str, args: JsonMap<String, Value>) -> Result<Value> {
    let op = registry
        .get(name)
        .ok_or_else(|| anyhow!("operation '{name}' is not present in the supplied registry"))?;
    op.invoke(args).await
}

fn check_args(domain: &str) -> JsonMap<String, Value> {
    let mut args = JsonMap::new();
    args.insert("domain".into(), Value::String(domain.to_string()));
    args
}

fn register_args(domain: &str, params: &SetupParams) -> JsonMap<String, Value> {
    let mut args = check_args(domain);
    args.insert("period".into(), json!(params.period.unwrap_or(1)));
    if !params.nameservers.is_empty() {
        args.insert("nameservers".into(), json!(params.nameservers));
    }
    if let Some(contacts) = &params.contacts {
        for (role, handle) in [
            ("registrant", contacts.registrant),
            ("admin", contacts.admin),
            ("tech", contacts.tech),
            ("billing", contacts.billing),
        ] {
            if let Some(handle) = handle {
                args.insert(role.into(), json!(handle));
            }
        }
    }
    args
}

fn nameserver_args(domain: &str, params: &SetupParams) -> JsonMap<String, Value> {
    let mut args = check_args(domain);
    args.insert("nameservers".into(), json!(params.nameservers));
    args
}

fn provision_args(domain: &str, params: &SetupParams) -> JsonMap<String, Value> {
    let mut args = check_args(domain);
    args.insert("clientName".into(), Value::String(params.client_name.clone()));
    args.insert("clientEmail".into(), Value::String(params.client_email.clone()));
    args.insert("serverIp".into(), Value::String(params.server_ip.clone()));
    args.insert("createMail".into(), json!(params.create_mail.unwrap_or(true)));
    args.insert("createDb".into(), json!(params.create_db.unwrap_or(true)));
    // Override only when explicitly supplied; never sent as a null
    // placeholder.
    if let Some(server_id) = &params.server_id {
        args.insert("serverId".into(), Value::String(server_id.clone()));
    }
    args
}

/// Read the availability flag out of the check result.
///
/// The upstream shape is not pinned down: the result may be a bare record or
/// a sequence of records, and the flag may be a boolean or a 0/1 number.
/// Anything else, including an absent flag, counts as unavailable.
fn availability_from(result: &Value) -> bool {
    let record = match result {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(result),
        _ => None,
    };
    record
        .and_then(|record| record.get("avail").or_else(|| record.get("available")))
        .map(truthy)
        .unwrap_or(false)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domainctl_types::{AccessClass, StepStatus};
    use domainctl_registry::FnOp;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Shared capture of the argument records each stub operation received.
    type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

    fn recording_op(log: &CallLog, name: &'static str, access: AccessClass, response: Value) -> Arc<dyn domainctl_registry::Operation> {
        let log = Arc::clone(log);
        FnOp::new(name, access, move |args| {
            let log = Arc::clone(&log);
            let response = response.clone();
            async move {
                log.lock().expect("call log").push((name.to_string(), Value::Object(args)));
                Ok(response)
            }
        })
    }

    fn failing_op(name: &'static str, message: &'static str) -> Arc<dyn domainctl_registry::Operation> {
        FnOp::new(name, AccessClass::Write, move |_args| async move { Err(anyhow!(message)) })
    }

    fn registrar_registry(log: &CallLog, available: bool) -> OpRegistry {
        let avail_flag = if available { 1 } else { 0 };
        OpRegistry::new(vec![
            recording_op(log, names::CHECK_DOMAIN, AccessClass::Read, json!([{"domain": "example.com", "avail": avail_flag}])),
            recording_op(log, names::REGISTER_DOMAIN, AccessClass::Write, json!({"status": "registered"})),
            recording_op(log, names::SET_NAMESERVERS, AccessClass::Write, json!({"status": "updated"})),
        ])
    }

    fn hosting_registry(log: &CallLog) -> OpRegistry {
        OpRegistry::new(vec![recording_op(
            log,
            names::PROVISION_SITE,
            AccessClass::Write,
            json!({"siteId": 42}),
        )])
    }

    fn base_params() -> SetupParams {
        SetupParams {
            domain: "example.com".into(),
            nameservers: vec!["ns1.hosting.de".into(), "ns2.hosting.de".into()],
            server_ip: "203.0.113.10".into(),
            client_name: "Jane Client".into(),
            client_email: "jane@example.com".into(),
            ..SetupParams::default()
        }
    }

    fn statuses(report: &SetupReport) -> Vec<(SetupStep, StepStatus)> {
        report.steps.iter().map(|step| (step.step, step.status)).collect()
    }

    #[tokio::test]
    async fn available_domain_runs_all_four_stages() {
        let log: CallLog = Arc::default();
        let report = run_setup(&registrar_registry(&log, true), &hosting_registry(&log), &base_params()).await;

        assert!(report.ok);
        assert_eq!(
            statuses(&report),
            vec![
                (SetupStep::CheckAvailability, StepStatus::Ok),
                (SetupStep::Register, StepStatus::Ok),
                (SetupStep::SetNameservers, StepStatus::Ok),
                (SetupStep::ProvisionHosting, StepStatus::Ok),
            ]
        );
        assert!(report.created.registered);
        assert!(report.created.nameservers_configured);
        assert!(report.created.hosting_provisioned);
        assert_eq!(report.created.hosting, Some(json!({"siteId": 42})));

        let calls = log.lock().expect("call log").clone();
        let register = &calls.iter().find(|(name, _)| name == names::REGISTER_DOMAIN).expect("register call").1;
        assert_eq!(register["period"], json!(1), "period defaults to one year");
        let provision = &calls.iter().find(|(name, _)| name == names::PROVISION_SITE).expect("provision call").1;
        assert_eq!(provision["createMail"], json!(true));
        assert_eq!(provision["createDb"], json!(true));
        assert!(provision.get("serverId").is_none(), "serverId must be omitted when unset");
    }

    #[tokio::test]
    async fn unavailable_domain_skips_registration_but_continues() {
        let log: CallLog = Arc::default();
        let report = run_setup(&registrar_registry(&log, false), &hosting_registry(&log), &base_params()).await;

        assert!(report.ok);
        assert_eq!(report.steps[1].step, SetupStep::Register);
        assert_eq!(report.steps[1].status, StepStatus::Skipped);
        assert_eq!(report.steps[1].reason.as_deref(), Some("domain not available"));
        assert!(!report.created.registered);
        assert!(report.created.hosting_provisioned, "hosting must still be attempted");
    }

    #[tokio::test]
    async fn explicit_skip_overrides_availability() {
        let log: CallLog = Arc::default();
        let params = SetupParams {
            skip_registration: true,
            ..base_params()
        };
        let report = run_setup(&registrar_registry(&log, true), &hosting_registry(&log), &params).await;

        assert!(report.ok);
        assert_eq!(report.steps[1].status, StepStatus::Skipped);
        assert_eq!(report.steps[1].reason.as_deref(), Some("registration explicitly skipped"));
        let calls = log.lock().expect("call log").clone();
        assert!(
            !calls.iter().any(|(name, _)| name == names::REGISTER_DOMAIN),
            "register must never be invoked on explicit skip"
        );
    }

    #[tokio::test]
    async fn blank_domain_fails_validation_without_any_invocation() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&invocations);
        let counting = FnOp::new(names::CHECK_DOMAIN, AccessClass::Read, move |_args| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(json!({}))
            }
        });
        let registrar = OpRegistry::new(vec![counting]);
        let hosting = OpRegistry::new(vec![]);
        let params = SetupParams {
            domain: "   ".into(),
            ..base_params()
        };

        let report = run_setup(&registrar, &hosting, &params).await;

        assert!(!report.ok);
        assert_eq!(statuses(&report), vec![(SetupStep::Validate, StepStatus::Error)]);
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(report.created, CreatedSummary::default());
    }

    #[tokio::test]
    async fn missing_check_operation_aborts_with_named_error() {
        let log: CallLog = Arc::default();
        let registrar = OpRegistry::new(vec![]);
        let report = run_setup(&registrar, &hosting_registry(&log), &base_params()).await;

        assert!(!report.ok);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].step, SetupStep::CheckAvailability);
        assert_eq!(report.steps[0].status, StepStatus::Error);
        let message = report.steps[0].error.as_deref().expect("error message");
        assert!(message.contains(names::CHECK_DOMAIN), "message must name the missing operation");
    }

    #[tokio::test]
    async fn failed_registration_aborts_before_later_stages() {
        let log: CallLog = Arc::default();
        let registrar = OpRegistry::new(vec![
            recording_op(&log, names::CHECK_DOMAIN, AccessClass::Read, json!([{"avail": true}])),
            failing_op(names::REGISTER_DOMAIN, "registrar rejected the order"),
            recording_op(&log, names::SET_NAMESERVERS, AccessClass::Write, json!({})),
        ]);
        let report = run_setup(&registrar, &hosting_registry(&log), &base_params()).await;

        assert!(!report.ok);
        assert_eq!(
            statuses(&report),
            vec![
                (SetupStep::CheckAvailability, StepStatus::Ok),
                (SetupStep::Register, StepStatus::Error),
            ]
        );
        assert_eq!(report.steps[1].error.as_deref(), Some("registrar rejected the order"));
        let calls = log.lock().expect("call log").clone();
        assert!(!calls.iter().any(|(name, _)| name == names::SET_NAMESERVERS));
        assert!(!calls.iter().any(|(name, _)| name == names::PROVISION_SITE));
    }

    #[tokio::test]
    async fn empty_nameserver_list_skips_but_still_provisions() {
        let log: CallLog = Arc::default();
        let params = SetupParams {
            nameservers: Vec::new(),
            ..base_params()
        };
        let report = run_setup(&registrar_registry(&log, true), &hosting_registry(&log), &params).await;

        assert!(report.ok);
        assert_eq!(report.steps[2].status, StepStatus::Skipped);
        assert_eq!(report.steps[2].reason.as_deref(), Some("no nameservers supplied"));
        assert!(!report.created.nameservers_configured);
        assert!(report.created.hosting_provisioned);
    }

    #[tokio::test]
    async fn failed_provisioning_is_the_final_error() {
        let log: CallLog = Arc::default();
        let hosting = OpRegistry::new(vec![failing_op(names::PROVISION_SITE, "panel quota exceeded")]);
        let report = run_setup(&registrar_registry(&log, true), &hosting, &base_params()).await;

        assert!(!report.ok);
        assert_eq!(report.steps.last().expect("last step").step, SetupStep::ProvisionHosting);
        assert_eq!(report.steps.last().expect("last step").error.as_deref(), Some("panel quota exceeded"));
        // Earlier side effects stay recorded for manual cleanup.
        assert!(report.created.registered);
        assert!(report.created.nameservers_configured);
        assert!(!report.created.hosting_provisioned);
    }

    #[tokio::test]
    async fn availability_tolerates_bare_record_and_numeric_flag() {
        assert!(availability_from(&json!({"avail": 1})));
        assert!(availability_from(&json!({"available": true})));
        assert!(availability_from(&json!([{"avail": 1}, {"avail": 0}])));
        assert!(!availability_from(&json!({"avail": 0})));
        assert!(!availability_from(&json!([{"available": false}])));
        assert!(!availability_from(&json!({})));
        assert!(!availability_from(&json!([])));
        assert!(!availability_from(&json!("available")));
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_ledgers() {
        let log: CallLog = Arc::default();
        let registrar = registrar_registry(&log, true);
        let hosting = hosting_registry(&log);
        let params = base_params();

        let first = run_setup(&registrar, &hosting, &params).await;
        let second = run_setup(&registrar, &hosting, &params).await;

        assert_eq!(statuses(&first), statuses(&second));
        assert_eq!(first.ok, second.ok);
    }

    #[tokio::test]
    async fn contact_handles_are_forwarded_to_registration() {
        let log: CallLog = Arc::default();
        let params = SetupParams {
            contacts: Some(domainctl_types::ContactHandles {
                registrant: Some(1200),
                tech: Some(1201),
                ..Default::default()
            }),
            period: Some(2),
            server_id: Some("web-12".into()),
            ..base_params()
        };
        let report = run_setup(&registrar_registry(&log, true), &hosting_registry(&log), &params).await;
        assert!(report.ok);

        let calls = log.lock().expect("call log").clone();
        let register = &calls.iter().find(|(name, _)| name == names::REGISTER_DOMAIN).expect("register call").1;
        assert_eq!(register["period"], json!(2));
        assert_eq!(register["registrant"], json!(1200));
        assert_eq!(register["tech"], json!(1201));
        assert!(register.get("admin").is_none());
        let provision = &calls.iter().find(|(name, _)| name == names::PROVISION_SITE).expect("provision call").1;
        assert_eq!(provision["serverId"], json!("web-12"));
    }
}
