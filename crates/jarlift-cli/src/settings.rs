use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use jarlift_core::DeployConfig;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "jarlift.toml";
pub(crate) const PASSWORD_ENV: &str = "JARLIFT_SSH_PASSWORD";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ConfigOverrides {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) user: Option<String>,
}

/// Explicit path, else `jarlift.toml` in `cwd` when present, else defaults.
/// Flag overrides apply on top, then a non-empty env password.
pub(crate) fn load_config(
    explicit_path: Option<&Path>,
    cwd: &Path,
    overrides: &ConfigOverrides,
    env_password: Option<String>,
) -> Result<DeployConfig> {
    let mut config = match resolve_config_path(explicit_path, cwd) {
        Some(path) => read_config_file(&path)?,
        None => DeployConfig::default(),
    };

    if let Some(host) = &overrides.host {
        config.remote.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.remote.port = port;
    }
    if let Some(user) = &overrides.user {
        config.remote.username = user.clone();
    }
    if let Some(password) = env_password.filter(|value| !value.is_empty()) {
        config.remote.password = Some(password);
    }

    config.validate()?;
    Ok(config)
}

pub(crate) fn require_password(config: &DeployConfig) -> Result<()> {
    match config.remote.password.as_deref() {
        Some(password) if !password.is_empty() => Ok(()),
        _ => Err(anyhow!(
            "invalid-config: no SSH password for {}@{}: set remote.password or {PASSWORD_ENV}",
            config.remote.username,
            config.remote.host
        )),
    }
}

fn resolve_config_path(explicit_path: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    let candidate = cwd.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

fn read_config_file(path: &Path) -> Result<DeployConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    DeployConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid config: {}", path.display()))
}
