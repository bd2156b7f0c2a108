//! YAML configuration for credentials and the permission policy.
//!
//! Secrets never need to live in the file: any string value may use the
//! `${env:NAME}` form and is substituted from the process environment at
//! load time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use domainctl_registry::PermissionPolicy;

/// Top-level configuration file model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Registrar JSON-RPC endpoint and credentials.
    pub registrar: RegistrarConfig,
    /// Hosting panel endpoint and token.
    pub hosting: HostingConfig,
    /// Permission policy applied to both registries.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Registrar connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrarConfig {
    pub endpoint: Url,
    pub username: String,
    pub password: String,
}

/// Hosting panel connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostingConfig {
    pub endpoint: Url,
    pub token: String,
}

/// Permission policy as written in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyConfig {
    /// Reject operations classified as writes.
    #[serde(default)]
    pub read_only: bool,
    /// When non-empty, only these operations may be invoked.
    #[serde(default)]
    pub allowed_operations: Vec<String>,
}

impl PolicyConfig {
    /// Convert into the registry policy type.
    pub fn into_policy(self) -> PermissionPolicy {
        PermissionPolicy {
            read_only: self.read_only,
            allowed_operations: self.allowed_operations.into_iter().collect(),
        }
    }
}

/// Load the configuration from the given path, or the default location.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_path()?,
    };
    let raw = fs::read_to_string(&path).with_context(|| format!("failed to read config file {}", path.display()))?;
    let interpolated = interpolate(&raw)?;
    let config: Config =
        serde_yaml::from_str(&interpolated).with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Default config location: `<user config dir>/domainctl/config.yaml`.
pub fn default_path() -> Result<PathBuf> {
    let base = dirs_next::config_dir().ok_or_else(|| anyhow!("could not determine the user config directory"))?;
    Ok(base.join("domainctl").join("config.yaml"))
}

/// Replace `${env:NAME}` placeholders with values from the environment.
fn interpolate(raw: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{env:([\w+_-]+)}").expect("static env pattern");
    let mut missing = Vec::new();
    let replaced = pattern.replace_all(raw, |captures: &regex::Captures<'_>| {
        let name = &captures[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });
    if let Some(name) = missing.first() {
        return Err(anyhow!("environment variable '{name}' referenced by the config is not set"));
    }
    Ok(replaced.into_owned())
}
