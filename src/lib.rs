//! seks-tools: CLI tools that let an automated agent perform credentialed
//! actions against third-party services without ever holding raw
//! credentials. Secrets are resolved at call time from an external broker.
//!
//! Binaries:
//!   do-seks   - provider/action dispatch (Hetzner, GitHub, Cloudflare)
//!   listseks  - list secrets/capabilities known to the broker
//!   seks-git  - git wrapper with credential injection
//!   seks-http - direct HTTP client with broker-resolved auth

pub mod broker;
pub mod config;
pub mod providers;

/// Initialize stderr tracing, filtered by `RUST_LOG` (default `warn`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
