//! Client-wide settings.
//!
//! `ClientConfig` deserializes from JSON so an embedding host can pass it
//! across the FFI boundary; `timeout` is expressed in seconds there.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.proofy.io/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("proofy-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub verify_ssl: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            verify_ssl: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://127.0.0.1:3000","timeout":2.5}"#).unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:3000");
        assert_eq!(cfg.timeout, Duration::from_millis(2500));
        assert!(cfg.verify_ssl);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let res: Result<ClientConfig, _> = serde_json::from_str(r#"{"timeout":-1}"#);
        assert!(res.is_err());
    }
}
