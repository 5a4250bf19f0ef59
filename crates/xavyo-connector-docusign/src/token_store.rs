//! JSON token file shared between runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{DocusignError, DocusignResult};

/// Lifetime assumed for a stored token that carries no expiry.
const UNDATED_TOKEN_LIFETIME_HOURS: i64 = 8;

/// Lifetime assumed when saving a token the server gave no expiry for.
const DEFAULT_SAVE_LIFETIME_HOURS: i64 = 1;

/// Token as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Reads and writes a [`StoredToken`] at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored token.
    ///
    /// A missing expiry, or the zero timestamp some writers emit, is replaced by
    /// the file's modification time plus eight hours.
    pub fn load(&self) -> DocusignResult<StoredToken> {
        let data = fs::read(&self.path).map_err(|e| {
            DocusignError::TokenStorage(format!(
                "error reading token file {}: {e}",
                self.path.display()
            ))
        })?;

        let mut token: StoredToken = serde_json::from_slice(&data).map_err(|e| {
            DocusignError::TokenStorage(format!("error decoding token file: {e}"))
        })?;

        let undated = token.expiry.map_or(true, |expiry| expiry.timestamp() <= 0);
        if undated {
            let modified = fs::metadata(&self.path)
                .and_then(|m| m.modified())
                .map_err(|e| {
                    DocusignError::TokenStorage(format!(
                        "unable to read token file modification time: {e}"
                    ))
                })?;
            let modified: DateTime<Utc> = modified.into();
            token.expiry = Some(modified + Duration::hours(UNDATED_TOKEN_LIFETIME_HOURS));
        }

        debug!(path = %self.path.display(), "Loaded stored token");
        Ok(token)
    }

    /// Persist `token`, readable by the owner only.
    pub fn save(&self, token: &StoredToken) -> DocusignResult<()> {
        let mut token = token.clone();
        if token.expiry.is_none() {
            token.expiry = Some(Utc::now() + Duration::hours(DEFAULT_SAVE_LIFETIME_HOURS));
        }

        let data = serde_json::to_vec_pretty(&token)
            .map_err(|e| DocusignError::TokenStorage(format!("error serializing token: {e}")))?;

        let mut file = open_private(&self.path).map_err(|e| {
            DocusignError::TokenStorage(format!(
                "error writing token file {}: {e}",
                self.path.display()
            ))
        })?;
        file.write_all(&data)
            .map_err(|e| DocusignError::TokenStorage(format!("error writing token file: {e}")))?;

        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
