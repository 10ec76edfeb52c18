//! do-seks - Capability-first CLI for agents to interact with external services.
//!
//! Usage:
//!   do-seks providers                     List available providers
//!   do-seks <provider> actions            List actions for a provider
//!   do-seks <provider> <action> --help    Show action details
//!   do-seks <provider> <action> [positional...] [--flag value ...]
//!
//! Global flags (`--json`, `--verbose`, `--dry-run`) are recognized anywhere
//! on the command line. Action parameters are declared by the provider
//! schema, not by clap, so everything after the action name is captured raw
//! and split by the argument resolver.

use std::collections::HashMap;

use anyhow::Result;
use clap::Parser;

use seks_tools::broker::BrokerClient;
use seks_tools::config;
use seks_tools::providers::types::{Action, ExecuteOptions, ProviderSchema};
use seks_tools::providers::{ProviderRegistry, execute, parse_action_args};

#[derive(Parser, Debug)]
#[command(
    name = "do-seks",
    version,
    about = "Capability-first CLI for agents to interact with external services"
)]
struct Cli {
    /// JSON output (default for API responses)
    #[arg(long)]
    json: bool,

    /// Show request details on stderr
    #[arg(long)]
    verbose: bool,

    /// Show what would happen without executing
    #[arg(long)]
    dry_run: bool,

    /// Provider name, or `providers` to list them
    #[arg(value_name = "PROVIDER")]
    command: String,

    /// Action name, or `actions` to list a provider's actions
    #[arg(value_name = "ACTION")]
    action: Option<String>,

    /// Positional arguments and `--flag value` pairs for the action
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    seks_tools::init_tracing();

    let registry = ProviderRegistry::builtin();

    let mut opts = ExecuteOptions {
        json: cli.json,
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    if cli.command == "providers" {
        println!("PROVIDER     DESCRIPTION");
        for provider in registry.list() {
            println!("{:<13}{}", provider.name, provider.display_name);
        }
        return Ok(());
    }

    let Some(schema) = registry.get(&cli.command) else {
        eprintln!("Unknown provider: {}", cli.command);
        eprintln!("Run 'do-seks providers' to see available providers.");
        std::process::exit(1);
    };

    let action_name = match cli.action.as_deref() {
        None | Some("actions") => {
            println!("Actions for {}:\n", schema.display_name);
            println!("ACTION           DESCRIPTION");
            for action in schema.actions {
                println!("{:<17}{}", action.name, action.description);
            }
            return Ok(());
        }
        Some(name) => name,
    };

    let Some(action) = schema.action(action_name) else {
        eprintln!("Unknown action: {action_name} for provider {}", schema.name);
        eprintln!(
            "Run 'do-seks {} actions' to see available actions.",
            schema.name
        );
        std::process::exit(1);
    };

    let (mut positionals, flags, wants_help) = split_action_args(&cli.rest, &mut opts);
    if wants_help {
        print_action_help(schema, action);
        return Ok(());
    }

    apply_github_shorthand(schema.name, &mut positionals);

    let params = parse_action_args(action, &positionals, &flags)?;

    let broker = BrokerClient::new(config::load_config()?)?;
    execute(&broker, schema, action, &params, &opts).await?;
    Ok(())
}

/// Split raw action tokens into positionals and a flag map. Global flags
/// and `--help` are pulled out first (they may appear anywhere); every
/// other `--x` consumes exactly the next token as its value, or the empty
/// string when none remains.
fn split_action_args(
    rest: &[String],
    opts: &mut ExecuteOptions,
) -> (Vec<String>, HashMap<String, String>, bool) {
    let mut wants_help = false;
    let mut tokens: Vec<&str> = Vec::with_capacity(rest.len());
    for token in rest {
        match token.as_str() {
            "--json" => opts.json = true,
            "--verbose" => opts.verbose = true,
            "--dry-run" => opts.dry_run = true,
            "--help" => wants_help = true,
            other => tokens.push(other),
        }
    }

    let mut positionals = Vec::new();
    let mut flags = HashMap::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Some(name) = tokens[i].strip_prefix("--") {
            let value = tokens.get(i + 1).copied().unwrap_or("");
            flags.insert(name.to_string(), value.to_string());
            i += 1;
        } else {
            positionals.push(tokens[i].to_string());
        }
        i += 1;
    }
    (positionals, flags, wants_help)
}

/// `owner/repo` shorthand for github: a single positional containing a
/// slash splits into two (anything past the second segment is dropped).
fn apply_github_shorthand(provider: &str, positionals: &mut Vec<String>) {
    if provider == "github" && positionals.len() == 1 && positionals[0].contains('/') {
        let mut segments = positionals[0].split('/');
        let owner = segments.next().unwrap_or_default().to_string();
        let repo = segments.next().unwrap_or_default().to_string();
        *positionals = vec![owner, repo];
    }
}

fn print_action_help(schema: &ProviderSchema, action: &Action) {
    println!(
        "{} {} — {}\n",
        schema.name, action.name, action.description
    );
    println!("Method: {}", action.method);
    println!("Path:   {}", action.path);
    if !action.params.is_empty() {
        println!("\nParameters:");
        for param in action.params {
            let pos = param
                .position
                .map(|n| format!("(positional {n})"))
                .unwrap_or_default();
            let req = if param.required { "required" } else { "optional" };
            let label = param.flag.unwrap_or(param.name);
            println!("  {label:<15} {req:<10} {pos} [{}]", param.location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_discovery_forms() {
        let cli = Cli::try_parse_from(["do-seks", "providers"]).unwrap();
        assert_eq!(cli.command, "providers");
        assert!(cli.action.is_none());

        let cli = Cli::try_parse_from(["do-seks", "hetzner", "actions"]).unwrap();
        assert_eq!(cli.command, "hetzner");
        assert_eq!(cli.action.as_deref(), Some("actions"));
    }

    #[test]
    fn clap_captures_action_args_raw() {
        let cli = Cli::try_parse_from([
            "do-seks",
            "--verbose",
            "hetzner",
            "create-server",
            "--name",
            "web-1",
            "--type",
            "cx22",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.rest,
            vec!["--name", "web-1", "--type", "cx22"]
        );
    }

    #[test]
    fn global_flags_extracted_anywhere() {
        let rest: Vec<String> = ["--name", "web-1", "--json", "--dry-run"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut opts = ExecuteOptions::default();
        let (positionals, flags, help) = split_action_args(&rest, &mut opts);
        assert!(opts.json);
        assert!(opts.dry_run);
        assert!(!help);
        assert!(positionals.is_empty());
        assert_eq!(flags.get("name").map(String::as_str), Some("web-1"));
    }

    #[test]
    fn flag_without_value_gets_empty_string() {
        let rest: Vec<String> = ["123", "--zone"].iter().map(|s| s.to_string()).collect();
        let mut opts = ExecuteOptions::default();
        let (positionals, flags, _) = split_action_args(&rest, &mut opts);
        assert_eq!(positionals, vec!["123"]);
        assert_eq!(flags.get("zone").map(String::as_str), Some(""));
    }

    #[test]
    fn help_token_detected() {
        let rest: Vec<String> = vec!["--help".to_string()];
        let mut opts = ExecuteOptions::default();
        let (_, _, help) = split_action_args(&rest, &mut opts);
        assert!(help);
    }

    #[test]
    fn github_shorthand_splits_once() {
        let mut positionals = vec!["acme/widgets".to_string()];
        apply_github_shorthand("github", &mut positionals);
        assert_eq!(positionals, vec!["acme", "widgets"]);

        let mut deep = vec!["acme/widgets/extra".to_string()];
        apply_github_shorthand("github", &mut deep);
        assert_eq!(deep, vec!["acme", "widgets"]);
    }

    #[test]
    fn shorthand_only_for_github() {
        let mut positionals = vec!["a/b".to_string()];
        apply_github_shorthand("hetzner", &mut positionals);
        assert_eq!(positionals, vec!["a/b"]);

        let mut two = vec!["a/b".to_string(), "c".to_string()];
        apply_github_shorthand("github", &mut two);
        assert_eq!(two, vec!["a/b", "c"]);
    }
}
