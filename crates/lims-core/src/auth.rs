//! Credential verification for the `login` action.
//!
//! The dispatcher never compares credentials itself. It asks a
//! [`CredentialVerifier`] and relays the outcome, so a real credential
//! store can replace [`StaticCredentials`] without touching the
//! dispatcher.
//!
//! A successful login issues no session or token; other actions do not
//! check it.

use lims_types::UserProfile;

use crate::config::{AuthConfig, UserConfig};

/// A source of truth for username/password pairs.
pub trait CredentialVerifier: Send + Sync {
    /// Return the user's profile when the pair is accepted.
    fn verify(&self, username: &str, password: &str) -> Option<UserProfile>;
}

/// Accepts exactly one configured credential pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
    user: UserConfig,
}

impl StaticCredentials {
    /// Build a verifier for the configured pair and profile.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            user: config.user.clone(),
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<UserProfile> {
        (username == self.username && password == self.password)
            .then(|| self.user.profile(username))
    }
}
