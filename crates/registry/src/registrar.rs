//! Registrar operation catalog.
//!
//! Each entry maps a flat tool argument record onto one registrar JSON-RPC
//! method. The read/write classification is declared here, next to the
//! mapping, and consumed by the permission guard.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map as JsonMap, Value, json};

use domainctl_rpc::RegistrarRpc;
use domainctl_types::AccessClass::{Read, Write};

use crate::args::{opt_i64, opt_str, opt_u64, require_i64, require_str, str_array};
use crate::names;
use crate::op::RpcOp;
use crate::policy::PermissionPolicy;
use crate::registry::OpRegistry;

/// Default registration/renewal period in years.
const DEFAULT_PERIOD: u64 = 1;

/// Build the guard-wrapped registrar operation registry.
pub fn build_registrar_ops(rpc: Arc<dyn RegistrarRpc>, policy: Arc<PermissionPolicy>) -> OpRegistry {
    let ops = vec![
        RpcOp::registrar_reshaped(
            Arc::clone(&rpc),
            names::CHECK_DOMAIN,
            Read,
            "domain.check",
            "Check whether a domain is available for registration",
            object_schema(json!({"domain": {"type": "string"}}), &["domain"]),
            map_domain_only,
            reshape_check_result,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::GET_DOMAIN_INFO,
            Read,
            "domain.info",
            "Fetch registration details for a domain in the account",
            object_schema(json!({"domain": {"type": "string"}}), &["domain"]),
            map_domain_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::LIST_DOMAINS,
            Read,
            "domain.list",
            "List domains in the account, paginated",
            object_schema(json!({"page": {"type": "integer"}, "pageSize": {"type": "integer"}}), &[]),
            map_pagination,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::REGISTER_DOMAIN,
            Write,
            "domain.create",
            "Register a domain with optional nameservers and contact handles",
            object_schema(
                json!({
                    "domain": {"type": "string"},
                    "period": {"type": "integer", "minimum": 1},
                    "nameservers": {"type": "array", "items": {"type": "string"}},
                    "registrant": {"type": "integer"},
                    "admin": {"type": "integer"},
                    "tech": {"type": "integer"},
                    "billing": {"type": "integer"}
                }),
                &["domain"],
            ),
            map_register_domain,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::UPDATE_DOMAIN,
            Write,
            "domain.update",
            "Update nameservers or contact handles of a domain",
            object_schema(
                json!({
                    "domain": {"type": "string"},
                    "nameservers": {"type": "array", "items": {"type": "string"}},
                    "registrant": {"type": "integer"},
                    "admin": {"type": "integer"},
                    "tech": {"type": "integer"},
                    "billing": {"type": "integer"}
                }),
                &["domain"],
            ),
            map_update_domain,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::DELETE_DOMAIN,
            Write,
            "domain.delete",
            "Delete a domain from the account",
            object_schema(json!({"domain": {"type": "string"}}), &["domain"]),
            map_domain_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::RENEW_DOMAIN,
            Write,
            "domain.renew",
            "Renew a domain for the given period",
            object_schema(
                json!({"domain": {"type": "string"}, "period": {"type": "integer", "minimum": 1}}),
                &["domain"],
            ),
            map_renew_domain,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::TRANSFER_DOMAIN,
            Write,
            "domain.transfer",
            "Start an inbound transfer using the given auth code",
            object_schema(
                json!({"domain": {"type": "string"}, "authCode": {"type": "string"}}),
                &["domain", "authCode"],
            ),
            map_transfer_domain,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::SET_NAMESERVERS,
            Write,
            "domain.update",
            "Replace the nameserver set of a domain",
            object_schema(
                json!({"domain": {"type": "string"}, "nameservers": {"type": "array", "items": {"type": "string"}}}),
                &["domain", "nameservers"],
            ),
            map_set_nameservers,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::GET_DOMAIN_PRICES,
            Read,
            "domain.getPrices",
            "Fetch registration and renewal prices, optionally for one TLD",
            object_schema(json!({"tld": {"type": "string"}}), &[]),
            map_domain_prices,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::LIST_CONTACTS,
            Read,
            "contact.list",
            "List contact handles in the account, paginated",
            object_schema(json!({"page": {"type": "integer"}, "pageSize": {"type": "integer"}}), &[]),
            map_pagination,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::GET_CONTACT_INFO,
            Read,
            "contact.info",
            "Fetch one contact handle by id",
            object_schema(json!({"id": {"type": "integer"}}), &["id"]),
            map_id_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::CREATE_CONTACT,
            Write,
            "contact.create",
            "Create a contact handle",
            object_schema(
                json!({
                    "name": {"type": "string"},
                    "email": {"type": "string"},
                    "street": {"type": "string"},
                    "city": {"type": "string"},
                    "postalCode": {"type": "string"},
                    "countryCode": {"type": "string"},
                    "phone": {"type": "string"},
                    "organization": {"type": "string"}
                }),
                &["name", "email", "street", "city", "postalCode", "countryCode"],
            ),
            map_create_contact,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::UPDATE_CONTACT,
            Write,
            "contact.update",
            "Update fields of an existing contact handle",
            object_schema(
                json!({
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "email": {"type": "string"},
                    "street": {"type": "string"},
                    "city": {"type": "string"},
                    "postalCode": {"type": "string"},
                    "countryCode": {"type": "string"},
                    "phone": {"type": "string"},
                    "organization": {"type": "string"}
                }),
                &["id"],
            ),
            map_update_contact,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::DELETE_CONTACT,
            Write,
            "contact.delete",
            "Delete a contact handle by id",
            object_schema(json!({"id": {"type": "integer"}}), &["id"]),
            map_id_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::LIST_ZONES,
            Read,
            "nameserver.list",
            "List DNS zones in the account, paginated",
            object_schema(json!({"page": {"type": "integer"}, "pageSize": {"type": "integer"}}), &[]),
            map_pagination,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::GET_ZONE_INFO,
            Read,
            "nameserver.info",
            "Fetch a DNS zone including its records",
            object_schema(json!({"domain": {"type": "string"}}), &["domain"]),
            map_domain_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::CREATE_ZONE,
            Write,
            "nameserver.create",
            "Create a DNS zone served by the given nameservers",
            object_schema(
                json!({"domain": {"type": "string"}, "nameservers": {"type": "array", "items": {"type": "string"}}}),
                &["domain", "nameservers"],
            ),
            map_create_zone,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::DELETE_ZONE,
            Write,
            "nameserver.delete",
            "Delete a DNS zone",
            object_schema(json!({"domain": {"type": "string"}}), &["domain"]),
            map_domain_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::CREATE_DNS_RECORD,
            Write,
            "nameserver.createRecord",
            "Create a DNS record inside a zone",
            object_schema(
                json!({
                    "domain": {"type": "string"},
                    "type": {"type": "string"},
                    "name": {"type": "string"},
                    "content": {"type": "string"},
                    "ttl": {"type": "integer"},
                    "priority": {"type": "integer"}
                }),
                &["domain", "type", "content"],
            ),
            map_create_dns_record,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::UPDATE_DNS_RECORD,
            Write,
            "nameserver.updateRecord",
            "Update a DNS record by id",
            object_schema(
                json!({
                    "id": {"type": "integer"},
                    "type": {"type": "string"},
                    "name": {"type": "string"},
                    "content": {"type": "string"},
                    "ttl": {"type": "integer"},
                    "priority": {"type": "integer"}
                }),
                &["id"],
            ),
            map_update_dns_record,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::DELETE_DNS_RECORD,
            Write,
            "nameserver.deleteRecord",
            "Delete a DNS record by id",
            object_schema(json!({"id": {"type": "integer"}}), &["id"]),
            map_id_only,
        ),
        RpcOp::registrar(
            Arc::clone(&rpc),
            names::GET_ACCOUNT_INFO,
            Read,
            "account.info",
            "Fetch account details and balance",
            object_schema(json!({}), &[]),
            map_empty,
        ),
    ];
    OpRegistry::guarded(ops, policy)
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn map_empty(_args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    Ok(JsonMap::new())
}

fn map_domain_only(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    params.insert("domain".into(), Value::String(require_str(args, "domain")?));
    Ok(params)
}

fn map_id_only(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    params.insert("id".into(), json!(require_i64(args, "id")?));
    Ok(params)
}

fn map_pagination(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    if let Some(page) = opt_u64(args, "page")? {
        params.insert("page".into(), json!(page));
    }
    if let Some(page_size) = opt_u64(args, "pageSize")? {
        params.insert("pagelimit".into(), json!(page_size));
    }
    Ok(params)
}

fn map_register_domain(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    params.insert("period".into(), json!(opt_u64(args, "period")?.unwrap_or(DEFAULT_PERIOD)));
    let nameservers = str_array(args, "nameservers")?;
    if !nameservers.is_empty() {
        params.insert("ns".into(), json!(nameservers));
    }
    insert_contact_roles(&mut params, args)?;
    Ok(params)
}

fn map_update_domain(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    let nameservers = str_array(args, "nameservers")?;
    if !nameservers.is_empty() {
        params.insert("ns".into(), json!(nameservers));
    }
    insert_contact_roles(&mut params, args)?;
    Ok(params)
}

fn map_renew_domain(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    params.insert("period".into(), json!(opt_u64(args, "period")?.unwrap_or(DEFAULT_PERIOD)));
    Ok(params)
}

fn map_transfer_domain(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    params.insert("authCode".into(), Value::String(require_str(args, "authCode")?));
    Ok(params)
}

fn map_set_nameservers(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    let nameservers = str_array(args, "nameservers")?;
    if nameservers.is_empty() {
        anyhow::bail!("argument 'nameservers' must contain at least one entry");
    }
    params.insert("ns".into(), json!(nameservers));
    Ok(params)
}

fn map_domain_prices(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    if let Some(tld) = opt_str(args, "tld")? {
        params.insert("tld".into(), Value::String(tld));
    }
    Ok(params)
}

fn map_create_contact(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = JsonMap::new();
    params.insert("name".into(), Value::String(require_str(args, "name")?));
    params.insert("email".into(), Value::String(require_str(args, "email")?));
    params.insert("street".into(), Value::String(require_str(args, "street")?));
    params.insert("city".into(), Value::String(require_str(args, "city")?));
    params.insert("pc".into(), Value::String(require_str(args, "postalCode")?));
    params.insert("cc".into(), Value::String(require_str(args, "countryCode")?));
    if let Some(phone) = opt_str(args, "phone")? {
        params.insert("voice".into(), Value::String(phone));
    }
    if let Some(org) = opt_str(args, "organization")? {
        params.insert("org".into(), Value::String(org));
    }
    Ok(params)
}

fn map_update_contact(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_id_only(args)?;
    for (arg_key, wire_key) in [
        ("name", "name"),
        ("email", "email"),
        ("street", "street"),
        ("city", "city"),
        ("postalCode", "pc"),
        ("countryCode", "cc"),
        ("phone", "voice"),
        ("organization", "org"),
    ] {
        if let Some(value) = opt_str(args, arg_key)? {
            params.insert(wire_key.into(), Value::String(value));
        }
    }
    Ok(params)
}

fn map_create_zone(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    let nameservers = str_array(args, "nameservers")?;
    if nameservers.is_empty() {
        anyhow::bail!("argument 'nameservers' must contain at least one entry");
    }
    params.insert("ns".into(), json!(nameservers));
    params.insert("type".into(), Value::String("MASTER".into()));
    Ok(params)
}

fn map_create_dns_record(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_domain_only(args)?;
    params.insert("type".into(), Value::String(require_str(args, "type")?));
    params.insert("content".into(), Value::String(require_str(args, "content")?));
    if let Some(name) = opt_str(args, "name")? {
        params.insert("name".into(), Value::String(name));
    }
    if let Some(ttl) = opt_u64(args, "ttl")? {
        params.insert("ttl".into(), json!(ttl));
    }
    if let Some(priority) = opt_u64(args, "priority")? {
        params.insert("prio".into(), json!(priority));
    }
    Ok(params)
}

fn map_update_dns_record(args: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>> {
    let mut params = map_id_only(args)?;
    for key in ["type", "name", "content"] {
        if let Some(value) = opt_str(args, key)? {
            params.insert(key.into(), Value::String(value));
        }
    }
    if let Some(ttl) = opt_u64(args, "ttl")? {
        params.insert("ttl".into(), json!(ttl));
    }
    if let Some(priority) = opt_u64(args, "priority")? {
        params.insert("prio".into(), json!(priority));
    }
    Ok(params)
}

fn insert_contact_roles(params: &mut JsonMap<String, Value>, args: &JsonMap<String, Value>) -> Result<()> {
    for role in ["registrant", "admin", "tech", "billing"] {
        if let Some(handle) = opt_i64(args, role)? {
            params.insert(role.into(), json!(handle));
        }
    }
    Ok(())
}

/// The wire nests availability records under a `domain` key; unwrap that so
/// callers see either the record sequence or whatever else came back.
fn reshape_check_result(value: Value) -> Value {
    match &value {
        Value::Object(map) => map.get("domain").cloned().unwrap_or(value),
        _ => value,
    }
}
