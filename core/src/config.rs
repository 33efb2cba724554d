//! Client configuration.
//!
//! `ClientConfig` can be deserialized from any serde source or loaded from
//! `PUSHWOOSH_*` environment variables. Call `validate` before use;
//! `PushwooshClient::from_config` does it for you.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://cp.pushwoosh.com/json/1.3";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API access token. Never logged or serialized.
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Application code, e.g. `"XXXXX-XXXXX"`.
    pub application: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Keep the token out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("auth_token", &"<REDACTED>")
            .field("application", &self.application)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(auth_token: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            application: application.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from `PUSHWOOSH_AUTH_TOKEN`, `PUSHWOOSH_APPLICATION`,
    /// `PUSHWOOSH_API_URL` and `PUSHWOOSH_TIMEOUT_SECS`.
    ///
    /// The first two are required; the rest fall back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let auth_token = lookup("PUSHWOOSH_AUTH_TOKEN")
            .ok_or_else(|| Error::config("PUSHWOOSH_AUTH_TOKEN is not set"))?;
        let application = lookup("PUSHWOOSH_APPLICATION")
            .ok_or_else(|| Error::config("PUSHWOOSH_APPLICATION is not set"))?;
        let base_url = lookup("PUSHWOOSH_API_URL").unwrap_or_else(default_base_url);
        let timeout_secs = match lookup("PUSHWOOSH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::config(format!("PUSHWOOSH_TIMEOUT_SECS is not a number: {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            auth_token,
            application,
            base_url,
            timeout_secs,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth_token.trim().is_empty() {
            return Err(Error::config("auth token cannot be empty"));
        }
        if self.application.trim().is_empty() {
            return Err(Error::config("application cannot be empty"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PUSHWOOSH_AUTH_TOKEN", "token"),
            ("PUSHWOOSH_APPLICATION", "APP-00"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn from_lookup_requires_credentials() {
        let err = ClientConfig::from_lookup(lookup(&[("PUSHWOOSH_APPLICATION", "APP-00")]))
            .unwrap_err();
        assert!(err.to_string().contains("PUSHWOOSH_AUTH_TOKEN"));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("PUSHWOOSH_AUTH_TOKEN", "token"),
            ("PUSHWOOSH_APPLICATION", "APP-00"),
            ("PUSHWOOSH_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_rejects_empty_and_bad_values() {
        assert!(ClientConfig::new("", "APP").validate().is_err());
        assert!(ClientConfig::new("token", " ").validate().is_err());

        let mut config = ClientConfig::new("token", "APP");
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::new("token", "APP");
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"auth_token":"t","application":"A"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn serialization_skips_token() {
        let value = serde_json::to_value(ClientConfig::new("super-secret", "APP")).unwrap();
        assert!(value.get("auth_token").is_none(), "{value}");
        assert_eq!(value["application"], "APP");
        assert!(!value.to_string().contains("super-secret"));
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret", "APP"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<REDACTED>"));
    }
}
