//! domainctl binary: direct operation invocation, the setup workflow, and
//! the MCP server host.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map as JsonMap, Value};
use tracing::Level;

use domainctl_engine::run_setup;
use domainctl_mcp::{McpToolServices, resolve_bind_address, start_server};
use domainctl_registry::{OpRegistry, build_hosting_ops, build_registrar_ops};
use domainctl_rpc::{HostingClient, HostingRpc, RegistrarClient, RegistrarRpc};
use domainctl_types::{ContactHandles, SetupParams};

#[derive(Parser)]
#[command(name = "domainctl", about = "Registrar and hosting operations, guarded and composable")]
struct Cli {
    /// Path to the config file. Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every available operation with its access class.
    Ops,
    /// Invoke one operation by name.
    Run {
        /// Operation name, for example `check_domain`.
        name: String,
        /// Arguments as `key=value` pairs; values are parsed as JSON when
        /// possible, otherwise taken as strings.
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
        /// Full argument record as one JSON object; overrides --arg.
        #[arg(long)]
        json: Option<String>,
    },
    /// Run the end-to-end domain setup workflow.
    Setup(SetupArgs),
    /// Host the MCP server over streamable HTTP.
    Serve {
        /// Loopback address to bind, for example `127.0.0.1:8787`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args)]
struct SetupArgs {
    /// Domain to register and provision.
    #[arg(long)]
    domain: String,
    /// Nameserver, repeatable.
    #[arg(long = "ns")]
    nameservers: Vec<String>,
    /// Address of the hosting server.
    #[arg(long)]
    server_ip: String,
    /// Display name of the hosting client.
    #[arg(long)]
    client_name: String,
    /// Contact email of the hosting client.
    #[arg(long)]
    client_email: String,
    /// Registration period in years (default 1).
    #[arg(long)]
    period: Option<u32>,
    /// Skip the registration stage.
    #[arg(long)]
    skip_registration: bool,
    /// Do not provision a mailbox.
    #[arg(long)]
    no_mail: bool,
    /// Do not provision a database.
    #[arg(long)]
    no_db: bool,
    /// Hosting server identifier override.
    #[arg(long)]
    server_id: Option<String>,
    /// Registrant contact handle.
    #[arg(long)]
    registrant: Option<i64>,
    /// Administrative contact handle.
    #[arg(long)]
    admin: Option<i64>,
    /// Technical contact handle.
    #[arg(long)]
    tech: Option<i64>,
    /// Billing contact handle.
    #[arg(long)]
    billing: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let (registrar, hosting) = build_registries(&config)?;

    match cli.command {
        Command::Ops => print_operations(&registrar, &hosting),
        Command::Run { name, args, json } => run_operation(&registrar, &hosting, &name, args, json).await,
        Command::Setup(args) => run_setup_command(&registrar, &hosting, args).await,
        Command::Serve { bind } => serve_mcp(registrar, hosting, bind.as_deref()).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_registries(config: &config::Config) -> Result<(OpRegistry, OpRegistry)> {
    let policy = Arc::new(config.policy.clone().into_policy());
    let registrar_client = RegistrarClient::new(
        config.registrar.endpoint.clone(),
        config.registrar.username.clone(),
        config.registrar.password.clone(),
    )
    .context("failed to set up the registrar client")?;
    let hosting_client = HostingClient::new(config.hosting.endpoint.clone(), config.hosting.token.clone())
        .context("failed to set up the hosting client")?;

    let registrar = build_registrar_ops(Arc::new(registrar_client) as Arc<dyn RegistrarRpc>, Arc::clone(&policy));
    let hosting = build_hosting_ops(Arc::new(hosting_client) as Arc<dyn HostingRpc>, policy);
    Ok((registrar, hosting))
}

fn print_operations(registrar: &OpRegistry, hosting: &OpRegistry) -> Result<()> {
    for (label, registry) in [("registrar", registrar), ("hosting", hosting)] {
        println!("{label}:");
        for summary in registry.summaries() {
            let access = match summary.access {
                domainctl_types::AccessClass::Read => "read ",
                domainctl_types::AccessClass::Write => "write",
            };
            println!("  {access}  {:<22} {}", summary.name, summary.description);
        }
    }
    Ok(())
}

async fn run_operation(registrar: &OpRegistry, hosting: &OpRegistry, name: &str, args: Vec<String>, json: Option<String>) -> Result<()> {
    let arguments = match json {
        Some(raw) => {
            let value: Value = serde_json::from_str(&raw).context("--json must be a JSON object")?;
            value
                .as_object()
                .cloned()
                .ok_or_else(|| anyhow!("--json must be a JSON object"))?
        }
        None => parse_key_value_args(&args)?,
    };

    let op = registrar
        .get(name)
        .or_else(|| hosting.get(name))
        .ok_or_else(|| anyhow!("unknown operation '{name}'. Run `domainctl ops` for the catalog"))?;
    let result = op.invoke(arguments).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_setup_command(registrar: &OpRegistry, hosting: &OpRegistry, args: SetupArgs) -> Result<()> {
    let contacts = ContactHandles {
        registrant: args.registrant,
        admin: args.admin,
        tech: args.tech,
        billing: args.billing,
    };
    let params = SetupParams {
        domain: args.domain,
        nameservers: args.nameservers,
        server_ip: args.server_ip,
        client_name: args.client_name,
        client_email: args.client_email,
        period: args.period,
        create_mail: args.no_mail.then_some(false),
        create_db: args.no_db.then_some(false),
        contacts: (!contacts.is_empty()).then_some(contacts),
        skip_registration: args.skip_registration,
        server_id: args.server_id,
    };

    let report = run_setup(registrar, hosting, &params).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn serve_mcp(registrar: OpRegistry, hosting: OpRegistry, bind: Option<&str>) -> Result<()> {
    let bind_address = resolve_bind_address(bind)?;
    let services = Arc::new(McpToolServices::new(registrar, hosting));
    let server = start_server(bind_address, services).await?;
    println!("MCP server listening on http://{}/mcp (ctrl-c to stop)", server.bound_address());
    tokio::signal::ctrl_c().await.context("failed to wait for ctrl-c")?;
    server.stop().await
}

/// Parse `key=value` pairs into an argument record. Values that parse as
/// JSON keep their type; everything else is a string.
fn parse_key_value_args(pairs: &[String]) -> Result<JsonMap<String, Value>> {
    let mut arguments = JsonMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("argument '{pair}' is not in key=value form"))?;
        let parsed = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()));
        arguments.insert(key.to_string(), parsed);
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_value_args_keep_json_types() {
        let arguments = parse_key_value_args(&[
            "domain=example.com".to_string(),
            "period=2".to_string(),
            "nameservers=[\"ns1.hosting.de\",\"ns2.hosting.de\"]".to_string(),
            "createMail=false".to_string(),
        ])
        .expect("parse arguments");

        assert_eq!(arguments["domain"], json!("example.com"));
        assert_eq!(arguments["period"], json!(2));
        assert_eq!(arguments["nameservers"], json!(["ns1.hosting.de", "ns2.hosting.de"]));
        assert_eq!(arguments["createMail"], json!(false));
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(parse_key_value_args(&["domain".to_string()]).is_err());
    }
}
