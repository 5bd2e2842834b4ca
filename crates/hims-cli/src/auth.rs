use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Access token stored per profile after `hims login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub server: String,
    pub username: String,
    pub token: String,
    /// RFC 3339 expiry as reported by the server.
    pub expires_at: String,
}

impl StoredCredentials {
    /// First and last characters of the token, for display.
    pub fn token_preview(&self) -> String {
        let token = &self.token;
        if token.len() > 20 {
            format!("{}...{}", &token[..8], &token[token.len() - 8..])
        } else {
            token.clone()
        }
    }
}

fn creds_path(profile: &str) -> Result<PathBuf> {
    Ok(crate::config::config_dir()?.join(format!("credentials.{profile}.json")))
}

pub fn load_credentials(profile: &str) -> Result<Option<StoredCredentials>> {
    read_from(&creds_path(profile)?)
}

pub fn save_credentials(profile: &str, creds: &StoredCredentials) -> Result<()> {
    write_to(&creds_path(profile)?, creds)
}

pub fn remove_credentials(profile: &str) -> Result<bool> {
    let path = creds_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn read_from(path: &Path) -> Result<Option<StoredCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_to(path: &Path, creds: &StoredCredentials) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(creds)?)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
