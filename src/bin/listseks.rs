//! listseks - list available secrets/capabilities from the SEKS broker.

use anyhow::Result;
use clap::Parser;

use seks_tools::broker::BrokerClient;
use seks_tools::config;

#[derive(Parser, Debug)]
#[command(
    name = "listseks",
    version,
    about = "List available secrets and capabilities from the SEKS broker"
)]
struct Cli {
    /// List by capability
    #[arg(long)]
    capabilities: bool,

    /// Filter by provider
    #[arg(long, value_name = "NAME")]
    provider: Option<String>,

    /// JSON output
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    seks_tools::init_tracing();

    let broker = BrokerClient::new(config::load_config()?)?;

    // Default mode: list secrets directly (most useful right now)
    if !cli.capabilities {
        let secrets = broker.list_secrets().await?;
        let filtered: Vec<_> = match &cli.provider {
            Some(provider) => secrets
                .into_iter()
                .filter(|s| &s.provider == provider)
                .collect(),
            None => secrets,
        };

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
            return Ok(());
        }

        if filtered.is_empty() {
            match &cli.provider {
                Some(provider) => println!("No secrets for provider: {provider}"),
                None => println!("No secrets available."),
            }
            return Ok(());
        }

        println!("Available secrets:");
        for secret in &filtered {
            println!("  {}  ({})", secret.name, secret.provider);
        }
        return Ok(());
    }

    let caps = broker.list_capabilities().await?;

    if cli.json {
        // The capability view drops the agent fields; a --provider filter
        // has no effect here.
        let output = serde_json::json!({
            "providers": caps.providers,
            "channels": caps.channels,
            "features": caps.features,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Capabilities:");
    println!("  Providers: {}", join_or_none(&caps.providers));
    println!("  Channels:  {}", join_or_none(&caps.channels));
    println!("  Features:  {}", join_or_none(&caps.features));
    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_flags() {
        let cli =
            Cli::try_parse_from(["listseks", "--capabilities", "--provider", "github", "--json"])
                .unwrap();
        assert!(cli.capabilities);
        assert_eq!(cli.provider.as_deref(), Some("github"));
        assert!(cli.json);
    }

    #[test]
    fn join_or_none_fallback() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(
            join_or_none(&["a".to_string(), "b".to_string()]),
            "a, b"
        );
    }
}
