/*!
Broker config resolution for the seks-tools CLIs.

Order:
  1. Env vars (SEKS_BROKER_URL + SEKS_BROKER_TOKEN)
  2. ~/.openclaw/openclaw.json -> seks.broker.primary / seks.broker.secondary
  3. ~/.openclaw/openclaw.json -> seks.broker.url / seks.broker.token (legacy)
*/

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// One broker endpoint. Exactly one of `token` / `token_command` is
/// expected; `token_command` is run through `sh -c` and its trimmed stdout
/// becomes the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerEndpointConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(
        default,
        rename = "tokenCommand",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_command: Option<String>,
}

impl BrokerEndpointConfig {
    fn usable(&self) -> bool {
        let has_token = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        !self.url.is_empty() && (has_token(&self.token) || has_token(&self.token_command))
    }
}

/// Resolved broker configuration: a primary endpoint and an optional
/// secondary used for transport-level failover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub primary: BrokerEndpointConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<BrokerEndpointConfig>,
}

const NO_CONFIG_HINT: &str = "No broker config found. Set SEKS_BROKER_URL + \
SEKS_BROKER_TOKEN or configure ~/.openclaw/openclaw.json";

/// Resolve the broker config from the environment, falling back to
/// `~/.openclaw/openclaw.json`.
pub fn load_config() -> Result<BrokerConfig> {
    let env_url = std::env::var("SEKS_BROKER_URL")
        .ok()
        .filter(|s| !s.is_empty());
    let env_token = std::env::var("SEKS_BROKER_TOKEN")
        .ok()
        .filter(|s| !s.is_empty());
    if let (Some(url), Some(token)) = (env_url, env_token) {
        return Ok(BrokerConfig {
            primary: BrokerEndpointConfig {
                url,
                token: Some(token),
                token_command: None,
            },
            secondary: None,
        });
    }

    let path = openclaw_config_path().ok_or_else(|| anyhow!(NO_CONFIG_HINT))?;
    let raw = std::fs::read_to_string(&path).map_err(|_| anyhow!(NO_CONFIG_HINT))?;
    parse_openclaw_config(&raw)
}

/// `~/.openclaw/openclaw.json`, when a home directory can be determined.
pub fn openclaw_config_path() -> Option<PathBuf> {
    let dirs = BaseDirs::new()?;
    Some(dirs.home_dir().join(".openclaw").join("openclaw.json"))
}

/// Parse the `seks.broker` section of an openclaw.json document.
pub fn parse_openclaw_config(raw: &str) -> Result<BrokerConfig> {
    let json: serde_json::Value = serde_json::from_str(raw)
        .map_err(|_| anyhow!("Invalid broker config in ~/.openclaw/openclaw.json"))?;

    let broker = json.get("seks").and_then(|s| s.get("broker"));
    let Some(broker) = broker else {
        bail!("No seks.broker section in ~/.openclaw/openclaw.json");
    };

    // Primary/secondary pattern
    if let Some(primary) = parse_endpoint(broker.get("primary")) {
        return Ok(BrokerConfig {
            primary,
            secondary: parse_endpoint(broker.get("secondary")),
        });
    }

    // Legacy single-broker
    let url = broker.get("url").and_then(|v| v.as_str());
    let token = broker.get("token").and_then(|v| v.as_str());
    if let (Some(url), Some(token)) = (url, token) {
        return Ok(BrokerConfig {
            primary: BrokerEndpointConfig {
                url: url.to_string(),
                token: Some(token.to_string()),
                token_command: None,
            },
            secondary: None,
        });
    }

    bail!("Invalid broker config in ~/.openclaw/openclaw.json");
}

fn parse_endpoint(value: Option<&serde_json::Value>) -> Option<BrokerEndpointConfig> {
    let endpoint: BrokerEndpointConfig = serde_json::from_value(value?.clone()).ok()?;
    endpoint.usable().then_some(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primary_and_secondary() {
        let raw = r#"{
            "seks": {
                "broker": {
                    "primary": { "url": "https://broker.example", "token": "tok-1" },
                    "secondary": { "url": "https://broker-2.example", "token": "tok-2" }
                }
            }
        }"#;
        let config = parse_openclaw_config(raw).unwrap();
        assert_eq!(config.primary.url, "https://broker.example");
        assert_eq!(config.primary.token.as_deref(), Some("tok-1"));
        let secondary = config.secondary.unwrap();
        assert_eq!(secondary.url, "https://broker-2.example");
        assert_eq!(secondary.token.as_deref(), Some("tok-2"));
    }

    #[test]
    fn parses_token_command() {
        let raw = r#"{
            "seks": {
                "broker": {
                    "primary": { "url": "https://broker.example", "tokenCommand": "pass show seks" }
                }
            }
        }"#;
        let config = parse_openclaw_config(raw).unwrap();
        assert_eq!(config.primary.token, None);
        assert_eq!(
            config.primary.token_command.as_deref(),
            Some("pass show seks")
        );
        assert!(config.secondary.is_none());
    }

    #[test]
    fn parses_legacy_layout() {
        let raw = r#"{ "seks": { "broker": { "url": "http://broker:8080", "token": "t" } } }"#;
        let config = parse_openclaw_config(raw).unwrap();
        assert_eq!(config.primary.url, "http://broker:8080");
        assert_eq!(config.primary.token.as_deref(), Some("t"));
        assert!(config.secondary.is_none());
    }

    #[test]
    fn ignores_unusable_secondary() {
        let raw = r#"{
            "seks": {
                "broker": {
                    "primary": { "url": "https://broker.example", "token": "tok" },
                    "secondary": { "url": "https://broker-2.example" }
                }
            }
        }"#;
        let config = parse_openclaw_config(raw).unwrap();
        assert!(config.secondary.is_none());
    }

    #[test]
    fn missing_broker_section() {
        let err = parse_openclaw_config(r#"{ "other": true }"#).unwrap_err();
        assert!(err.to_string().contains("No seks.broker section"));
    }

    #[test]
    fn rejects_incomplete_legacy() {
        let err = parse_openclaw_config(r#"{ "seks": { "broker": { "url": "x" } } }"#).unwrap_err();
        assert!(err.to_string().contains("Invalid broker config"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_openclaw_config("not json").unwrap_err();
        assert!(err.to_string().contains("Invalid broker config"));
    }
}
