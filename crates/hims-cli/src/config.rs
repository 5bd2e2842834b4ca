use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
}

impl ProfileConfig {
    /// Format stored in the profile, if it names a known one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self.format.as_deref() {
            Some("table") => Some(OutputFormat::Table),
            Some("json") => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// `<user config dir>/hims`, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Cannot determine user config directory")?
        .join("hims");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all() -> Result<ConfigFile> {
    load_from(&config_path()?)
}

fn load_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

fn save_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_from(path)?;
    all.insert(profile.to_string(), config.clone());
    fs::write(path, toml::to_string_pretty(&all)?)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    Ok(load_all()?.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_to(&config_path()?, profile, config)
}

/// Checks that `server` is an absolute http(s) URL and strips a trailing slash.
pub fn normalize_server(server: &str) -> Result<String> {
    let parsed = url::Url::parse(server).with_context(|| format!("Invalid server URL: {server}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Server URL must use http or https: {server}");
    }
    Ok(server.trim_end_matches('/').to_string())
}

pub fn resolve_server(cli_server: &Option<String>, profile: &str) -> Result<String> {
    // 1. --server flag / HIMS_URL env
    if let Some(s) = cli_server {
        return normalize_server(s);
    }
    // 2. config.toml profile
    let cfg = load_profile(profile)?;
    if let Some(s) = cfg.server {
        return normalize_server(&s);
    }
    // 3. Stored credentials for this profile
    if let Ok(Some(creds)) = crate::auth::load_credentials(profile) {
        return Ok(creds.server);
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set HIMS_URL env var, or run: hims config set server <url>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(load_from(&path).unwrap().is_empty());

        let ward = ProfileConfig {
            server: Some("http://ward.local:8080".into()),
            format: Some("json".into()),
        };
        save_to(&path, "ward", &ward).unwrap();
        save_to(&path, "default", &ProfileConfig::default()).unwrap();

        let all = load_from(&path).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["ward"], ward);
        assert_eq!(all["ward"].output_format(), Some(OutputFormat::Json));
        assert_eq!(all["default"].output_format(), None);
    }

    #[test]
    fn test_normalize_server() {
        assert_eq!(
            normalize_server("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert!(normalize_server("localhost:8080").is_err());
        assert!(normalize_server("ftp://files").is_err());
    }
}
