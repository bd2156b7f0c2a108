//! Well-known operation names.
//!
//! The workflow engine resolves its stages by these names; everything else
//! (CLI, MCP dispatch) treats names as opaque lookup keys.

// Registrar registry.
pub const CHECK_DOMAIN: &str = "check_domain";
pub const GET_DOMAIN_INFO: &str = "get_domain_info";
pub const LIST_DOMAINS: &str = "list_domains";
pub const REGISTER_DOMAIN: &str = "register_domain";
pub const UPDATE_DOMAIN: &str = "update_domain";
pub const DELETE_DOMAIN: &str = "delete_domain";
pub const RENEW_DOMAIN: &str = "renew_domain";
pub const TRANSFER_DOMAIN: &str = "transfer_domain";
pub const SET_NAMESERVERS: &str = "set_nameservers";
pub const GET_DOMAIN_PRICES: &str = "get_domain_prices";
pub const LIST_CONTACTS: &str = "list_contacts";
pub const GET_CONTACT_INFO: &str = "get_contact_info";
pub const CREATE_CONTACT: &str = "create_contact";
pub const UPDATE_CONTACT: &str = "update_contact";
pub const DELETE_CONTACT: &str = "delete_contact";
pub const LIST_ZONES: &str = "list_zones";
pub const GET_ZONE_INFO: &str = "get_zone_info";
pub const CREATE_ZONE: &str = "create_zone";
pub const DELETE_ZONE: &str = "delete_zone";
pub const CREATE_DNS_RECORD: &str = "create_dns_record";
pub const UPDATE_DNS_RECORD: &str = "update_dns_record";
pub const DELETE_DNS_RECORD: &str = "delete_dns_record";
pub const GET_ACCOUNT_INFO: &str = "get_account_info";

// Hosting registry.
pub const PROVISION_SITE: &str = "provision_site";
pub const LIST_SERVERS: &str = "list_servers";
pub const GET_SITE: &str = "get_site";
