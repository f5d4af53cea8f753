//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the hosted backend project
//! - `BACKEND_ANON_KEY` - Publishable API key for the backend
//! - `ADMIN_EMAIL` - The single privileged admin address
//!
//! The session lifetime is a fixed constant, not configuration; see
//! [`crate::session::SESSION_LIFETIME`].

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use velvet_lane_core::Email;

const MIN_KEY_LENGTH: usize = 20;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// Base URL of the hosted backend project.
    pub backend_url: Url,
    /// Publishable API key sent with every backend request.
    pub backend_anon_key: SecretString,
    /// The single statically-configured privileged address.
    pub admin_email: Email,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("backend_anon_key", &"[REDACTED]")
            .field("admin_email", &self.admin_email.as_str())
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let backend_url = get_required_env("BACKEND_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_owned(), e.to_string()))?;

        let anon_key = get_required_env("BACKEND_ANON_KEY")?;
        validate_key_strength(&anon_key, "BACKEND_ANON_KEY")?;

        let admin_email = Email::parse(&get_required_env("ADMIN_EMAIL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_EMAIL".to_owned(), e.to_string()))?;

        Ok(Self {
            backend_url,
            backend_anon_key: SecretString::from(anon_key),
            admin_email,
        })
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Reject keys that are obvious placeholders or too short to be real.
fn validate_key_strength(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    if key.len() < MIN_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("must be at least {MIN_KEY_LENGTH} characters (got {})", key.len()),
        ));
    }
    Ok(())
}
