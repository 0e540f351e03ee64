//! Reaction to the delegated third-party sign-in flow.
//!
//! The OAuth protocol itself lives entirely in the external SSO provider;
//! this module only knows the strategy identifiers handed to it, the
//! redirect URI, and what to do with the outcome: keep the created
//! session (and reuse its token for checkout), or surface the failure
//! without touching any existing session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Redirect URI registered with the SSO provider.
pub const SSO_REDIRECT_URL: &str = "cosmix://sso-callback";

/// Supported sign-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsoStrategy {
    Google,
    Apple,
}

impl SsoStrategy {
    /// Provider-side strategy identifier.
    pub fn strategy_id(self) -> &'static str {
        match self {
            SsoStrategy::Google => "oauth_google",
            SsoStrategy::Apple => "oauth_apple",
        }
    }

    /// The request descriptor handed to the external provider.
    pub fn request(self) -> SsoRequest {
        SsoRequest {
            strategy: self.strategy_id().to_string(),
            redirect_url: SSO_REDIRECT_URL.to_string(),
        }
    }
}

/// What we hand to the provider; it owns everything from here until the
/// redirect comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsoRequest {
    pub strategy: String,
    pub redirect_url: String,
}

/// What the provider hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsoOutcome {
    Created { session_id: String },
    Failed { message: String },
}

/// A signed-in session, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Bearer token attached to checkout requests when present.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Session {
    /// Default session file location.
    pub fn default_path() -> PathBuf {
        crate::config::Config::session_dir().join("session.toml")
    }

    /// Load a persisted session, if any.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {:?}", path))?;
        let session = toml::from_str(&content).with_context(|| "Failed to parse session file")?;
        Ok(Some(session))
    }

    /// Persist the session.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory: {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).with_context(|| "Failed to encode session")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session file: {:?}", path))?;
        Ok(())
    }
}

/// Apply a sign-in outcome to the current session.
///
/// A created session replaces the current one; a failure leaves it
/// untouched and returns the user-facing message.
pub fn apply_outcome(
    current: Option<Session>,
    outcome: SsoOutcome,
) -> (Option<Session>, Option<String>) {
    match outcome {
        SsoOutcome::Created { session_id } => {
            info!(session_id, "sign-in completed");
            (
                Some(Session {
                    session_id,
                    token: None,
                    user_id: None,
                }),
                None,
            )
        }
        SsoOutcome::Failed { message } => {
            warn!(message, "sign-in failed");
            (current, Some(message))
        }
    }
}
