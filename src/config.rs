//! Application configuration and API base-URL resolution.
//!
//! The environment is read exactly once, in [`ApiEnv::from_env`]; the
//! resolver itself is a pure function of its inputs so it can be tested
//! with injected values. The resulting [`Config`] is built in `main` and
//! passed by reference to everything that needs it.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Fallback development host when `COSMIX_DEV_IP` is unset.
pub const FALLBACK_DEV_IP: &str = "192.168.1.145";

/// Default development API port.
pub const DEFAULT_DEV_PORT: &str = "3000";

/// Build mode. Anything that does not parse as development is treated as
/// production; staging is selected through the environment flag, not the
/// mode (see [`resolve_api_base_url`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "development" | "dev" => Mode::Development,
            _ => Mode::Production,
        })
    }
}

impl Mode {
    pub fn is_development(self) -> bool {
        self == Mode::Development
    }
}

/// Platform discriminator for development loopback handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Other,
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => Platform::Other,
        })
    }
}

/// Raw environment inputs for base-URL resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiEnv {
    pub dev_ip: Option<String>,
    pub dev_port: String,
    pub production_domain: Option<String>,
    pub staging_domain: Option<String>,
    pub env_flag: Option<String>,
}

impl ApiEnv {
    /// Read the `COSMIX_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect::<HashMap<_, _>>())
    }

    /// Build from an explicit variable map (used by tests and the CLI).
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            dev_ip: get("COSMIX_DEV_IP"),
            dev_port: get("COSMIX_DEV_PORT").unwrap_or_else(|| DEFAULT_DEV_PORT.to_string()),
            production_domain: get("COSMIX_PRODUCTION_DOMAIN"),
            staging_domain: get("COSMIX_STAGING_DOMAIN"),
            env_flag: get("COSMIX_ENV"),
        }
    }
}

/// Resolve the API base URL from build mode, platform, and environment.
///
/// Priority order:
/// 1. Development: `http://{dev_ip or fallback}:{port}/api`, except the
///    iOS simulator which reaches the host through loopback.
/// 2. Staging env flag with a staging domain set.
/// 3. Production domain. Missing production domain outside development is
///    a fatal configuration error.
pub fn resolve_api_base_url(mode: Mode, platform: Platform, env: &ApiEnv) -> Result<String> {
    if mode.is_development() {
        if env.dev_ip.is_none() {
            warn!("COSMIX_DEV_IP is not set, using fallback address {FALLBACK_DEV_IP}");
        }
        let dev_ip = env.dev_ip.as_deref().unwrap_or(FALLBACK_DEV_IP);
        let port = if env.dev_port.is_empty() {
            DEFAULT_DEV_PORT
        } else {
            &env.dev_port
        };
        let host = match platform {
            // Simulator loopback reaches the host machine directly.
            Platform::Ios => "localhost",
            Platform::Android | Platform::Other => dev_ip,
        };
        return Ok(format!("http://{host}:{port}/api"));
    }

    if env.env_flag.as_deref() == Some("staging") {
        if let Some(staging) = &env.staging_domain {
            return Ok(format!("https://{staging}/api"));
        }
    }

    match &env.production_domain {
        Some(domain) => Ok(format!("https://{domain}/api")),
        None => bail!("COSMIX_PRODUCTION_DOMAIN is not set; cannot start outside development"),
    }
}

/// Resolved application configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub platform: Platform,
    pub env: ApiEnv,
    pub base_url: String,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// The mode defaults to the build profile (debug builds are
    /// development) and can be overridden with `COSMIX_MODE`; the
    /// platform defaults to `other` and can be overridden with
    /// `COSMIX_PLATFORM`.
    pub fn from_env() -> Result<Self> {
        let default_mode = if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        };
        let mode = std::env::var("COSMIX_MODE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_mode);
        let platform = std::env::var("COSMIX_PLATFORM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let env = ApiEnv::from_env();
        Self::resolve(mode, platform, env)
    }

    /// Build a configuration from explicit parts.
    pub fn resolve(mode: Mode, platform: Platform, env: ApiEnv) -> Result<Self> {
        let base_url = resolve_api_base_url(mode, platform, &env)?;
        info!(?mode, ?platform, base_url, "resolved API configuration");
        Ok(Self {
            mode,
            platform,
            env,
            base_url,
        })
    }

    /// Directory for the session file, created on demand.
    pub fn session_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default())
            .join("cosmix")
    }

    /// Directory the log file is written to.
    pub fn log_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default())
            .join("cosmix")
    }
}
