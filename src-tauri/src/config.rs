//! Runtime configuration — `.env` files, environment, OS keychain.
//!
//! Every value has a default except the API key. A missing key is not a
//! startup error: requests fail later with `TransportError::MissingApiKey`.

use crate::error::ConfigError;
use crate::llm::prompts::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

pub const KEYRING_SERVICE: &str = "snaplens";
pub const KEYRING_USER: &str = "groq";

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CAPTURE_SHORTCUT: &str = "Control+Alt+N";
pub const DEFAULT_TOGGLE_SHORTCUT: &str = "Control+Alt+R";

/// Settings for the inference client.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Connect timeout, and the longest wait between two reads of a response.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutConfig {
    pub capture: String,
    pub toggle_response: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub inference: InferenceConfig,
    pub shortcuts: ShortcutConfig,
    /// Write each crop to `<temp>/snaplens-capture.png`.
    pub debug_capture: bool,
}

impl Config {
    /// Load `.env` files, then [`Config::from_env`].
    pub fn load() -> Result<Self, ConfigError> {
        load_env_files();
        Self::from_env()
    }

    /// Read the process environment, falling back to the keychain for the
    /// API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if config.inference.api_key.is_none() {
            config.inference.api_key = keychain_api_key();
        }
        log::info!(
            "[CONFIG] model={} api_base={} max_tokens={} timeout={}s key={}",
            config.inference.model,
            config.inference.api_base,
            config.inference.max_tokens,
            config.inference.timeout.as_secs(),
            if config.inference.api_key.is_some() { "set" } else { "missing" }
        );
        Ok(config)
    }

    /// Build from an arbitrary variable source. No files, no keychain.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_tokens = match get("SNAPLENS_MAX_TOKENS") {
            Some(raw) => parse_positive::<u32>("SNAPLENS_MAX_TOKENS", &raw)?,
            None => DEFAULT_MAX_TOKENS,
        };
        let timeout_secs = match get("SNAPLENS_TIMEOUT_SECS") {
            Some(raw) => parse_positive::<u64>("SNAPLENS_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let debug_capture = match get("SNAPLENS_DEBUG_CAPTURE") {
            Some(raw) => parse_flag("SNAPLENS_DEBUG_CAPTURE", &raw)?,
            None => false,
        };

        Ok(Self {
            inference: InferenceConfig {
                api_base: get("SNAPLENS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                api_key: get("GROQ_API_KEY"),
                model: get("SNAPLENS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens,
                timeout: Duration::from_secs(timeout_secs),
            },
            shortcuts: ShortcutConfig {
                capture: get("SNAPLENS_CAPTURE_SHORTCUT")
                    .unwrap_or_else(|| DEFAULT_CAPTURE_SHORTCUT.to_string()),
                toggle_response: get("SNAPLENS_TOGGLE_SHORTCUT")
                    .unwrap_or_else(|| DEFAULT_TOGGLE_SHORTCUT.to_string()),
            },
            debug_capture,
        })
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    }
}

/// Candidate `.env` locations, most specific first.
fn env_file_candidates() -> Vec<PathBuf> {
    // CARGO_MANIFEST_DIR is src-tauri/; the project root is its parent.
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let project_root = manifest_dir.parent().unwrap_or(manifest_dir);

    let mut candidates = vec![project_root.join(".env.local"), project_root.join(".env")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("snaplens").join(".env"));
    }
    candidates
}

/// Load the first `.env` file that exists. Variables already set in the
/// process environment win.
pub fn load_env_files() {
    for path in env_file_candidates() {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            return;
        }
    }
}

fn keychain_api_key() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    match entry.get_password() {
        Ok(key) if !key.trim().is_empty() => {
            log::info!("[CONFIG] Loaded API key from OS keychain");
            Some(key.trim().to_string())
        }
        Ok(_) | Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            log::warn!("[CONFIG] Keychain lookup failed: {}", e);
            None
        }
    }
}

/// Store the Groq API key in the OS keychain.
pub fn save_api_key(api_key: &str) -> Result<(), ConfigError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(invalid("GROQ_API_KEY", api_key));
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(api_key)?;
    log::info!("[CONFIG] API key saved to OS keychain");
    Ok(())
}
