//! Unified error taxonomy for the admin dashboard.
//!
//! Every failure is caught at the initiating UI action and converted into
//! exactly one user-visible notification; nothing propagates unhandled.

use core::fmt;

use thiserror::Error;

use crate::providers::ProviderError;

/// Application-level error type for the admin dashboard.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The identity provider rejected the credential check.
    #[error("login failed: {0}")]
    AuthFailed(AuthFailureKind),

    /// Authenticated, but not the privileged admin address.
    #[error("access denied: admin privileges required")]
    AccessDenied,

    /// The session aged past the configured lifetime.
    #[error("session expired")]
    Expired,

    /// A create/update/delete/list call to the data backend failed.
    #[error("persistence failed: {0}")]
    Persistence(#[source] ProviderError),

    /// An image upload failed; the surrounding flow was aborted.
    #[error("image upload failed: {0}")]
    Upload(#[source] ProviderError),

    /// Input validation failed before any network call was made.
    #[error("{0}")]
    Validation(String),
}

/// Classification of a failed credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// Wrong email or password.
    InvalidCredentials,
    /// The account's email address is unconfirmed.
    UnverifiedAccount,
    /// Anything else, including provider unavailability.
    Other(String),
}

impl AuthFailureKind {
    /// Classify a provider error.
    #[must_use]
    pub fn classify(error: &ProviderError) -> Self {
        match error {
            ProviderError::InvalidCredentials => Self::InvalidCredentials,
            ProviderError::UnverifiedAccount => Self::UnverifiedAccount,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::UnverifiedAccount => write!(f, "unverified account"),
            Self::Other(detail) => write!(f, "{detail}"),
        }
    }
}

impl AdminError {
    /// The message shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthFailed(AuthFailureKind::InvalidCredentials) => {
                "Invalid email or password. Please try again.".to_owned()
            }
            Self::AuthFailed(AuthFailureKind::UnverifiedAccount) => {
                "Please verify your email address before logging in.".to_owned()
            }
            Self::AuthFailed(AuthFailureKind::Other(_)) => {
                "Login failed. Please try again.".to_owned()
            }
            Self::AccessDenied => "Access denied. Admin privileges required.".to_owned(),
            Self::Expired => "Session expired. Please login again.".to_owned(),
            Self::Persistence(_) | Self::Upload(_) => {
                "Something went wrong. Please try again.".to_owned()
            }
            Self::Validation(message) => message.clone(),
        }
    }
}
