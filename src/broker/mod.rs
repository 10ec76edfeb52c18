/*!
Thin client for the SEKS broker: the external service that stores and
returns credentials on behalf of an agent.

Surface mirrors the broker's four operations:
  get_secret        - resolve one secret value by name
  list_secrets      - enumerate secret names with their provider
  list_capabilities - what this agent is allowed to reach
  proxy_request     - HTTP request with credential injection done broker-side

When a secondary endpoint is configured, a transport-level failure against
the primary fails over once. HTTP error statuses are terminal for the
invocation: no failover, no retry.
*/

use anyhow::{Context, Result, anyhow, bail};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BrokerConfig, BrokerEndpointConfig};

/// One secret known to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretEntry {
    pub name: String,
    pub provider: String,
}

/// Capability summary for the calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SecretValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct SecretList {
    #[serde(default)]
    secrets: Vec<SecretEntry>,
}

#[derive(Debug)]
struct Endpoint {
    base: String,
    token: String,
}

/// Broker client over one or two configured endpoints.
pub struct BrokerClient {
    http: reqwest::Client,
    endpoints: Vec<Endpoint>,
}

impl BrokerClient {
    /// Build a client from resolved config. `tokenCommand` entries are run
    /// here, once, through `sh -c`.
    pub fn new(config: BrokerConfig) -> Result<Self> {
        let mut endpoints = vec![resolve_endpoint(&config.primary)?];
        if let Some(secondary) = &config.secondary {
            endpoints.push(resolve_endpoint(secondary)?);
        }
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, endpoints })
    }

    /// Resolve one secret value by name.
    pub async fn get_secret(&self, name: &str) -> Result<String> {
        debug!(secret = name, "resolving secret via broker");
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/secrets/{name}"))
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            bail!("secret not found: {name}");
        }
        let response = check_status(response, "secret lookup").await?;
        let secret: SecretValue = response
            .json()
            .await
            .context("broker returned a malformed secret payload")?;
        Ok(secret.value)
    }

    /// Enumerate secrets available to this agent.
    pub async fn list_secrets(&self) -> Result<Vec<SecretEntry>> {
        let response = self.request(reqwest::Method::GET, "/v1/secrets").await?;
        let response = check_status(response, "secret listing").await?;
        let list: SecretList = response
            .json()
            .await
            .context("broker returned a malformed secret list")?;
        Ok(list.secrets)
    }

    /// Fetch the agent's capability summary.
    pub async fn list_capabilities(&self) -> Result<Capabilities> {
        let response = self
            .request(reqwest::Method::GET, "/v1/capabilities")
            .await?;
        let response = check_status(response, "capability listing").await?;
        response
            .json()
            .await
            .context("broker returned a malformed capability payload")
    }

    /// Send a request through the broker's proxy, which injects the
    /// provider credential server-side. Returns the raw response whatever
    /// its status; the caller decides how to surface it.
    pub async fn proxy_request(
        &self,
        provider: &str,
        path_and_query: &str,
        method: reqwest::Method,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<reqwest::Response> {
        debug!(provider, path = path_and_query, "proxying request via broker");
        let mut last_err = None;
        for endpoint in &self.endpoints {
            let url = format!(
                "{}/v1/proxy/{provider}{path_and_query}",
                endpoint.base.trim_end_matches('/')
            );
            let mut request = self
                .http
                .request(method.clone(), &url)
                .headers(headers.clone())
                .bearer_auth(&endpoint.token);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(error = %e, endpoint = %endpoint.base, "broker endpoint unreachable");
                    last_err = Some(e);
                }
            }
        }
        Err(anyhow!(
            "broker unreachable: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        ))
    }

    async fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::Response> {
        let mut last_err = None;
        for endpoint in &self.endpoints {
            let url = format!("{}{path}", endpoint.base.trim_end_matches('/'));
            let request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&endpoint.token);
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(error = %e, endpoint = %endpoint.base, "broker endpoint unreachable");
                    last_err = Some(e);
                }
            }
        }
        Err(anyhow!(
            "broker unreachable: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        ))
    }
}

async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("broker {what} failed: {} {body}", status.as_u16());
}

fn resolve_endpoint(config: &BrokerEndpointConfig) -> Result<Endpoint> {
    let token = match (&config.token, &config.token_command) {
        (Some(token), _) => token.clone(),
        (None, Some(command)) => run_token_command(command)?,
        (None, None) => bail!("broker endpoint {} has no token", config.url),
    };
    Ok(Endpoint {
        base: config.url.clone(),
        token,
    })
}

fn run_token_command(command: &str) -> Result<String> {
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .with_context(|| format!("failed to run tokenCommand: {command}"))?;
    if !output.status.success() {
        bail!("tokenCommand exited with {}", output.status);
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        bail!("tokenCommand produced no output");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_requires_some_token_source() {
        let config = BrokerEndpointConfig {
            url: "https://broker.example".into(),
            token: None,
            token_command: None,
        };
        let err = resolve_endpoint(&config).unwrap_err();
        assert!(err.to_string().contains("no token"));
    }

    #[test]
    fn static_token_wins_over_command() {
        let config = BrokerEndpointConfig {
            url: "https://broker.example".into(),
            token: Some("tok".into()),
            token_command: Some("false".into()),
        };
        let endpoint = resolve_endpoint(&config).unwrap();
        assert_eq!(endpoint.token, "tok");
    }

    #[test]
    fn token_command_output_is_trimmed() {
        let endpoint = resolve_endpoint(&BrokerEndpointConfig {
            url: "https://broker.example".into(),
            token: None,
            token_command: Some("echo '  spaced-token  '".into()),
        })
        .unwrap();
        assert_eq!(endpoint.token, "spaced-token");
    }

    #[test]
    fn failing_token_command_is_an_error() {
        let err = resolve_endpoint(&BrokerEndpointConfig {
            url: "https://broker.example".into(),
            token: None,
            token_command: Some("exit 3".into()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("tokenCommand"));
    }
}
