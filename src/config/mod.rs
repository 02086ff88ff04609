//! Connection settings for the source warehouse and the destination API
//!
//! Settings are plain serde structs persisted as YAML. Validation happens
//! here, before any network call, so a bad folder id or a missing
//! privatelink URL surfaces with a corrective message instead of a failed
//! request.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Error type for settings validation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Folder ID must be a number, got '{0}'")]
    InvalidFolderId(String),
    #[error("Model name cannot be empty")]
    EmptyModelName,
    #[error("Account URL or ID is required for standard connection mode")]
    MissingAccount,
    #[error("PrivateLink URL is required for privatelink connection mode")]
    MissingPrivateLinkUrl,
    #[error("API token is required")]
    MissingToken,
}

/// How the source warehouse is reached.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Regular account, reached via the public endpoint
    #[default]
    Standard,
    /// PrivateLink endpoint inside a private network
    Privatelink,
}

static ACCOUNT_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://([^\.]+\.[^\.]+\.[^\.]+)\.snowflakecomputing\.com").unwrap()
});

/// Extract the account identifier from a warehouse URL.
///
/// `https://xy12345.eu-west-1.aws.snowflakecomputing.com` becomes
/// `xy12345.eu-west-1.aws`; anything that is not a URL is returned as-is
/// (it may already be a bare account id).
pub fn extract_account_from_url(url: &str) -> &str {
    ACCOUNT_URL_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|account| account.as_str())
        .unwrap_or(url)
}

/// Source-warehouse connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSettings {
    #[serde(default)]
    pub account: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_warehouse")]
    pub warehouse: String,
    pub database: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub connection_mode: ConnectionMode,
    #[serde(default)]
    pub custom_url: String,
}

fn default_warehouse() -> String {
    "COMPUTE_WH".to_string()
}

impl SourceSettings {
    /// Account parameter to hand to the driver, honouring the connection
    /// mode.
    pub fn account_identifier(&self) -> Result<String, ValidationError> {
        match self.connection_mode {
            ConnectionMode::Privatelink => {
                if self.custom_url.is_empty() {
                    Err(ValidationError::MissingPrivateLinkUrl)
                } else {
                    Ok(self.custom_url.clone())
                }
            }
            ConnectionMode::Standard => {
                if self.account.is_empty() {
                    Err(ValidationError::MissingAccount)
                } else {
                    Ok(extract_account_from_url(&self.account).to_string())
                }
            }
        }
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

/// Destination modelling platform settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// Organization URL, with or without scheme
    pub organization: String,
    pub token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Default destination folder, kept as entered; parse with
    /// [`parse_folder_id`]
    #[serde(default)]
    pub folder_id: String,
}

impl ApiSettings {
    /// Organization base URL with an https scheme and no trailing slash.
    pub fn organization_url(&self) -> String {
        let trimmed = self.organization.trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token.is_empty() {
            return Err(ValidationError::MissingToken);
        }
        Ok(())
    }
}

/// Parse a destination folder identifier.
///
/// The platform expects an integer; anything else is rejected before a
/// request is made.
pub fn parse_folder_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFolderId(raw.to_string()))
}

/// Full settings file: source warehouse plus destination API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub source: SourceSettings,
    pub api: ApiSettings,
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Save settings to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {}", path.display()))
    }
}
