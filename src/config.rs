//! Configuration and settings management
//!
//! Loads settings from environment variables and optional config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::thehax::Credentials;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Discord bot token
    pub discord_token: String,

    /// TheHax API key, sent with every upload when present
    pub thehax_api_key: Option<String>,
    /// TheHax tenant key, sent with every upload when present
    pub thehax_tenant_key: Option<String>,
    /// `"1"` makes uploads private; anything else (or unset) keeps them public
    pub thehax_private: Option<String>,

    /// TheHax account username; login is disabled unless both username and
    /// password are set
    pub thehax_username: Option<String>,
    /// TheHax account password
    pub thehax_password: Option<String>,
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case;
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback: check environment variables directly if config didn't
        // pick them up
        env_fallback(&mut settings.thehax_api_key, "THEHAX_API_KEY");
        env_fallback(&mut settings.thehax_tenant_key, "THEHAX_TENANT_KEY");
        env_fallback(&mut settings.thehax_private, "THEHAX_PRIVATE");
        env_fallback(&mut settings.thehax_username, "THEHAX_USERNAME");
        env_fallback(&mut settings.thehax_password, "THEHAX_PASSWORD");

        Ok(settings)
    }

    /// Whether uploads should be marked private on the remote service
    #[must_use]
    pub fn private_uploads(&self) -> bool {
        self.thehax_private.as_deref() == Some("1")
    }

    /// Login credentials, present only when both username and password are set
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.thehax_username, &self.thehax_password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

fn env_fallback(slot: &mut Option<String>, var: &str) {
    if slot.is_none() {
        if let Ok(val) = std::env::var(var) {
            if !val.is_empty() {
                *slot = Some(val);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_settings() -> Settings {
        Settings {
            discord_token: "dummy".to_string(),
            thehax_api_key: None,
            thehax_tenant_key: None,
            thehax_private: None,
            thehax_username: None,
            thehax_password: None,
        }
    }

    #[test]
    fn test_private_flag_parsing() {
        let mut settings = bare_settings();
        assert!(!settings.private_uploads());

        settings.thehax_private = Some("1".to_string());
        assert!(settings.private_uploads());

        // Only the literal "1" enables private uploads
        settings.thehax_private = Some("true".to_string());
        assert!(!settings.private_uploads());

        settings.thehax_private = Some("0".to_string());
        assert!(!settings.private_uploads());
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let mut settings = bare_settings();
        assert!(settings.credentials().is_none());

        settings.thehax_username = Some("user".to_string());
        assert!(settings.credentials().is_none());

        settings.thehax_password = Some("pass".to_string());
        let creds = settings.credentials().expect("both fields set");
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "pass");
    }
}
