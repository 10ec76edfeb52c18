//! seks-http - HTTP client with credential injection via the SEKS broker.
//!
//! Auth material is referenced by secret name and resolved at call time;
//! `--capability` skips local resolution entirely and lets the broker
//! inject the credential while proxying the request.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, ValueEnum};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use seks_tools::broker::BrokerClient;
use seks_tools::config;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "seks-http",
    version,
    about = "HTTP client with credential injection via SEKS broker"
)]
struct Cli {
    /// HTTP method
    #[arg(value_enum, ignore_case = true)]
    method: HttpMethod,

    /// Request URL
    url: String,

    /// Bearer token from broker (provider/field)
    #[arg(long = "auth-bearer", value_name = "SECRET")]
    auth_bearer: Option<String>,

    /// Basic auth username from broker
    #[arg(long = "auth-basic-user", value_name = "SECRET")]
    auth_basic_user: Option<String>,

    /// Basic auth password from broker
    #[arg(long = "auth-basic-pass", value_name = "SECRET")]
    auth_basic_pass: Option<String>,

    /// Inject secret as header value ('Header:secret', repeatable)
    #[arg(long = "header-secret", value_name = "HEADER:SECRET")]
    header_secrets: Vec<String>,

    /// Broker resolves the credential ('provider/action')
    #[arg(long, value_name = "CAPABILITY")]
    capability: Option<String>,

    /// Static header ('Name: value', repeatable)
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Request body
    #[arg(long, value_name = "BODY")]
    data: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    seks_tools::init_tracing();

    let mut headers: Vec<(String, String)> = Vec::new();
    for raw in &cli.headers {
        match split_header(raw) {
            Some((name, value)) => set_header(&mut headers, &name, value),
            None => {
                eprintln!("Invalid header: {raw}");
                std::process::exit(1);
            }
        }
    }

    // A capability of the form provider/action routes through the broker
    // proxy; anything else falls through to the direct request path.
    let capability_provider = cli
        .capability
        .as_deref()
        .and_then(|cap| cap.find('/').filter(|slash| *slash > 0).map(|slash| cap[..slash].to_string()));

    let wants_broker = capability_provider.is_some()
        || cli.auth_bearer.is_some()
        || cli.auth_basic_user.is_some()
        || cli.auth_basic_pass.is_some()
        || !cli.header_secrets.is_empty();
    let broker = if wants_broker {
        Some(BrokerClient::new(config::load_config()?)?)
    } else {
        None
    };

    if let (Some(provider), Some(broker)) = (&capability_provider, &broker) {
        match proxy_through_broker(broker, provider, &cli, &headers).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                eprintln!("Capability request failed: {e}");
                std::process::exit(1);
            }
        }
    }

    // Resolve auth material locally.
    if let (Some(secret), Some(broker)) = (&cli.auth_bearer, &broker) {
        let token = broker.get_secret(secret).await?;
        set_header(&mut headers, "Authorization", format!("Bearer {token}"));
    }

    if (cli.auth_basic_user.is_some() || cli.auth_basic_pass.is_some())
        && let Some(broker) = &broker
    {
        let user = match &cli.auth_basic_user {
            Some(secret) => broker.get_secret(secret).await?,
            None => String::new(),
        };
        let pass = match &cli.auth_basic_pass {
            Some(secret) => broker.get_secret(secret).await?,
            None => String::new(),
        };
        set_header(
            &mut headers,
            "Authorization",
            format!("Basic {}", BASE64.encode(format!("{user}:{pass}"))),
        );
    }

    for raw in &cli.header_secrets {
        let Some((name, secret)) = split_header(raw) else {
            eprintln!("Invalid header-secret: {raw}");
            std::process::exit(1);
        };
        if let Some(broker) = &broker {
            let value = broker.get_secret(&secret).await?;
            set_header(&mut headers, &name, value);
        }
    }

    // Make the request.
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Request failed: {e}");
            std::process::exit(1);
        }
    };
    let mut request = client.request(cli.method.as_reqwest(), &cli.url);
    for (name, value) in &headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(data) = &cli.data {
        request = request.body(data.clone());
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            eprintln!("Request timed out after {}s", cli.timeout);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Request failed: {e}");
            std::process::exit(1);
        }
    };

    print_response(response, cli.timeout).await
}

/// Proxy the request through the broker, which injects the credential.
async fn proxy_through_broker(
    broker: &BrokerClient,
    provider: &str,
    cli: &Cli,
    headers: &[(String, String)],
) -> Result<()> {
    let url = Url::parse(&cli.url)?;
    let path_and_query = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };

    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        header_map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }

    let response = broker
        .proxy_request(
            provider,
            &path_and_query,
            cli.method.as_reqwest(),
            header_map,
            cli.data.clone(),
        )
        .await?;
    print_response(response, cli.timeout).await
}

/// Status line and headers to stderr, raw body bytes to stdout.
async fn print_response(response: reqwest::Response, timeout: u64) -> Result<()> {
    let status = response.status();
    eprintln!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in response.headers() {
        eprintln!("{name}: {}", value.to_str().unwrap_or(""));
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) if e.is_timeout() => {
            eprintln!("Request timed out after {timeout}s");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Request failed: {e}");
            std::process::exit(1);
        }
    };
    std::io::stdout().write_all(&body)?;
    Ok(())
}

/// Insert or overwrite a header by exact name match (later sources win,
/// as when headers live in a plain map).
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    if let Some(slot) = headers.iter_mut().find(|(n, _)| n == name) {
        slot.1 = value;
    } else {
        headers.push((name.to_string(), value));
    }
}

/// Split `Name: value` (or `Name:secret`) on the first colon; the colon
/// must not lead the string.
fn split_header(raw: &str) -> Option<(String, String)> {
    let colon = raw.find(':').filter(|idx| *idx >= 1)?;
    Some((
        raw[..colon].trim().to_string(),
        raw[colon + 1..].trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "seks-http",
            "post",
            "https://api.example.com/items",
            "--auth-bearer",
            "HETZNER_API_TOKEN",
            "--header",
            "Accept: application/json",
            "--data",
            "{\"a\":1}",
            "--timeout",
            "5",
        ])
        .unwrap();
        assert!(matches!(cli.method, HttpMethod::Post));
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.headers.len(), 1);
    }

    #[test]
    fn method_is_case_insensitive() {
        let cli = Cli::try_parse_from(["seks-http", "GET", "https://example.com"]).unwrap();
        assert!(matches!(cli.method, HttpMethod::Get));
    }

    #[test]
    fn unknown_method_rejected() {
        assert!(Cli::try_parse_from(["seks-http", "brew", "https://example.com"]).is_err());
    }

    #[test]
    fn split_header_on_first_colon() {
        assert_eq!(
            split_header("Accept: application/json"),
            Some(("Accept".to_string(), "application/json".to_string()))
        );
        assert_eq!(
            split_header("X-Auth:provider/field"),
            Some(("X-Auth".to_string(), "provider/field".to_string()))
        );
        assert_eq!(split_header("no-colon"), None);
        assert_eq!(split_header(":leading"), None);
    }

    #[test]
    fn set_header_overwrites_exact_name() {
        let mut headers = vec![("Accept".to_string(), "text/plain".to_string())];
        set_header(&mut headers, "Authorization", "Bearer a".to_string());
        set_header(&mut headers, "Authorization", "Basic b".to_string());
        set_header(&mut headers, "Accept", "application/json".to_string());
        assert_eq!(
            headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Basic b".to_string()),
            ]
        );
    }

    #[test]
    fn capability_needs_a_separating_slash() {
        let route = |cap: &str| {
            cap.find('/')
                .filter(|slash| *slash > 0)
                .map(|slash| cap[..slash].to_string())
        };
        assert_eq!(route("hetzner/servers.list"), Some("hetzner".to_string()));
        assert_eq!(route("/leading"), None);
        assert_eq!(route("noslash"), None);
    }
}
