/*!
Action execution: argument resolution, URL building, and the one-shot
request/response flow against a provider.

Flow for one invocation:
  CLI tokens -> parse_action_args -> ResolvedParams
             -> build_url + auth headers -> HTTP call (or seks-git delegation)
             -> format::format_response -> stdout

Hard-failure paths (non-2xx status, child process exit) print their
diagnostic and terminate the process directly; everything else propagates
`anyhow::Result` back to `main`.
*/

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;
use url::Url;

use super::format::format_response;
use super::types::{
    Action, AuthType, BodyKind, ExecuteOptions, Method, ProviderSchema, ResolvedParams,
};
use crate::broker::BrokerClient;

/// Resolve positional args and `--flag value` pairs into the action's
/// path/query/body buckets.
///
/// Positional params resolve first (ascending by declared position), then
/// flag params; a param reachable both ways ends up with the flag value.
pub fn parse_action_args(
    action: &Action,
    args: &[String],
    flags: &HashMap<String, String>,
) -> Result<ResolvedParams> {
    let mut result = ResolvedParams::default();

    let mut positionals: Vec<_> = action
        .params
        .iter()
        .filter(|p| p.position.is_some())
        .collect();
    positionals.sort_by_key(|p| p.position);
    for param in positionals {
        let Some(position) = param.position else {
            continue;
        };
        match args.get(position) {
            Some(value) => {
                result
                    .bucket_mut(param.location)
                    .insert(param.name.to_string(), value.clone());
            }
            None if param.required => {
                bail!(
                    "Missing required positional argument: {} (position {})",
                    param.name,
                    position
                );
            }
            None => {}
        }
    }

    for param in action.params {
        let Some(flag) = param.flag else { continue };
        let flag_name = flag.trim_start_matches("--");
        if let Some(value) = flags.get(flag_name) {
            result
                .bucket_mut(param.location)
                .insert(param.name.to_string(), value.clone());
        } else if param.required && !result.bucket_mut(param.location).contains_key(param.name) {
            bail!("Missing required flag: {flag}");
        }
    }

    Ok(result)
}

/// Substitute `{key}` placeholders in a path template with percent-encoded
/// values and prepend the base URL. Each key replaces the first occurrence
/// of its placeholder. A placeholder left over after substitution is a
/// hard error rather than the silent pass-through some callers may expect.
pub fn build_url(
    base_url: &str,
    path_template: &str,
    path_params: &std::collections::BTreeMap<String, String>,
) -> Result<String> {
    let mut path = path_template.to_string();
    for (key, value) in path_params {
        let placeholder = format!("{{{key}}}");
        if let Some(start) = path.find(&placeholder) {
            path.replace_range(start..start + placeholder.len(), &urlencoding::encode(value));
        }
    }
    if let Some(start) = path.find('{') {
        let end = path[start..]
            .find('}')
            .map(|offset| start + offset + 1)
            .unwrap_or(path.len());
        bail!(
            "Unresolved path placeholder {} in template {path_template}",
            &path[start..end]
        );
    }
    Ok(format!("{base_url}{path}"))
}

/// Execute one action end-to-end: auth resolution, request, rendering.
pub async fn execute(
    broker: &BrokerClient,
    schema: &ProviderSchema,
    action: &Action,
    params: &ResolvedParams,
    opts: &ExecuteOptions,
) -> Result<()> {
    if action.method.is_git() {
        return execute_git(params, opts).await;
    }

    let url = build_url(schema.base_url, action.path, &params.path)?;
    let mut url = Url::parse(&url).with_context(|| format!("invalid request URL: {url}"))?;
    for (key, value) in &params.query {
        url.query_pairs_mut().append_pair(key, value);
    }

    let body = if action.body == BodyKind::Json && !params.body.is_empty() {
        Some(serde_json::to_string(&params.body).context("failed to serialize request body")?)
    } else {
        None
    };

    let secret = broker.get_secret(schema.auth.secret_name).await?;

    // Header order here is also the verbose/dry-run display order.
    let mut headers: Vec<(String, String)> = Vec::new();
    match schema.auth.auth_type {
        AuthType::Bearer => headers.push(("Authorization".into(), format!("Bearer {secret}"))),
        AuthType::Header => {
            let name = schema
                .auth
                .header_name
                .context("auth pattern of type header is missing its header name")?;
            headers.push((name.to_string(), secret));
        }
        AuthType::Basic => headers.push((
            "Authorization".into(),
            format!("Basic {}", BASE64.encode(&secret)),
        )),
    }
    if body.is_some() {
        headers.push(("Content-Type".into(), "application/json".into()));
    }
    // GitHub rejects requests without a User-Agent.
    if schema.name == "github" {
        headers.push(("User-Agent".into(), "do-seks/1.0".into()));
    }

    if opts.verbose {
        eprintln!("{} {url}", action.method);
        for (name, value) in &headers {
            if name == "Authorization" {
                eprintln!("{name}: {}", redact(value));
            } else {
                eprintln!("{name}: {value}");
            }
        }
        if let Some(body) = &body {
            eprintln!("Body: {body}");
        }
    }

    if opts.dry_run {
        let mut header_map = serde_json::Map::new();
        for (name, value) in &headers {
            let shown = if name == "Authorization" {
                redact(value)
            } else {
                value.clone()
            };
            header_map.insert(name.clone(), serde_json::Value::String(shown));
        }
        let mut info = serde_json::Map::new();
        info.insert("method".into(), action.method.to_string().into());
        info.insert("url".into(), url.to_string().into());
        info.insert("headers".into(), serde_json::Value::Object(header_map));
        if let Some(body) = &body {
            info.insert(
                "body".into(),
                serde_json::from_str(body).context("request body is not valid JSON")?,
            );
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(info))?
        );
        return Ok(());
    }

    debug!(provider = schema.name, action = action.name, %url, "sending request");
    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let mut request = http.request(http_method(action.method)?, url);
    for (name, value) in &headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &body {
        request = request.body(body.clone());
    }
    let response = request.send().await.context("request failed")?;

    let status = response.status();
    if opts.verbose {
        eprintln!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
    }
    let text = response
        .text()
        .await
        .context("failed to read response body")?;

    if !status.is_success() {
        eprintln!(
            "Error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        eprintln!("{text}");
        std::process::exit(1);
    }

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(data) if opts.json => println!("{}", serde_json::to_string_pretty(&data)?),
        Ok(data) => println!("{}", format_response(&data, action)),
        Err(_) => println!("{text}"),
    }
    Ok(())
}

/// `GIT` actions delegate to the seks-git clone helper as a subprocess
/// with inherited stdio. Exit code mirrors the child's (default 1).
async fn execute_git(params: &ResolvedParams, opts: &ExecuteOptions) -> Result<()> {
    let owner = params
        .path
        .get("owner")
        .context("clone requires an owner path parameter")?;
    let repo = params
        .path
        .get("repo")
        .context("clone requires a repo path parameter")?;
    let dest = params
        .body
        .get("dest")
        .filter(|d| !d.is_empty())
        .unwrap_or(repo)
        .clone();
    let repo_url = format!("https://github.com/{owner}/{repo}.git");

    if opts.dry_run {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "command": "seks-git",
                "args": ["clone", repo_url, dest],
            }))?
        );
        return Ok(());
    }

    if opts.verbose {
        eprintln!("seks-git clone {repo_url} {dest}");
    }

    let status = tokio::process::Command::new("seks-git")
        .arg("clone")
        .arg(&repo_url)
        .arg(&dest)
        .status()
        .await;
    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: failed to run seks-git: {e}");
            std::process::exit(1);
        }
    }
}

fn http_method(method: Method) -> Result<reqwest::Method> {
    let m = match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Git => bail!("GIT actions delegate to seks-git, not HTTP"),
    };
    Ok(m)
}

/// First 15 characters of a credential header value, then an ellipsis.
fn redact(value: &str) -> String {
    let head: String = value.chars().take(15).collect();
    format!("{head}...")
}
