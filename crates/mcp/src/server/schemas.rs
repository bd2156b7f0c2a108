//! Request schemas for the MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use domainctl_types::{ContactHandles, SetupParams};

/// Parameters for dispatching one registry operation by name.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
pub struct RunOperationRequest {
    /// Operation name as returned by `list_operations`.
    #[schemars(description = "Operation name exactly as listed by list_operations.")]
    pub name: String,
    /// Flat argument record matching the operation's input schema.
    #[schemars(description = "Argument record matching the operation's input_schema. Omit for operations without arguments.")]
    pub arguments: Option<JsonMap<String, Value>>,
}

/// Parameters for the composed domain setup workflow.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SetupDomainRequest {
    /// Domain to provision.
    #[schemars(description = "Domain to register and provision, for example example.com.")]
    pub domain: String,
    /// Nameservers to configure. Empty or omitted skips the nameserver stage.
    pub nameservers: Option<Vec<String>>,
    /// Address of the hosting server.
    pub server_ip: String,
    /// Display name of the hosting client.
    pub client_name: String,
    /// Contact email of the hosting client.
    pub client_email: String,
    /// Registration period in years. Defaults to 1.
    pub period: Option<u32>,
    /// Provision a mailbox. Defaults to true.
    pub create_mail: Option<bool>,
    /// Provision a database. Defaults to true.
    pub create_db: Option<bool>,
    /// Registrant contact handle.
    pub registrant: Option<i64>,
    /// Administrative contact handle.
    pub admin: Option<i64>,
    /// Technical contact handle.
    pub tech: Option<i64>,
    /// Billing contact handle.
    pub billing: Option<i64>,
    /// Skip the registration stage (for already-owned domains).
    pub skip_registration: Option<bool>,
    /// Hosting server identifier override.
    pub server_id: Option<String>,
}

impl SetupDomainRequest {
    /// Convert the flat tool request into the engine parameter record.
    pub fn into_params(self) -> SetupParams {
        let contacts = ContactHandles {
            registrant: self.registrant,
            admin: self.admin,
            tech: self.tech,
            billing: self.billing,
        };
        SetupParams {
            domain: self.domain,
            nameservers: self.nameservers.unwrap_or_default(),
            server_ip: self.server_ip,
            client_name: self.client_name,
            client_email: self.client_email,
            period: self.period,
            create_mail: self.create_mail,
            create_db: self.create_db,
            contacts: if contacts.is_empty() { None } else { Some(contacts) },
            skip_registration: self.skip_registration.unwrap_or(false),
            server_id: self.server_id,
        }
    }
}
