/*!
Provider registry and the action dispatch layer built on it.

Modules:
  types     - schema value types (ProviderSchema / Action / ParamDef / ...)
  hetzner, github, cloudflare - builtin schemas
  executor  - argument resolution, URL building, action execution
  format    - tabular response rendering

The registry is an explicitly constructed value passed down from each
binary's `main`, not a process-wide singleton, so tests can build their own.
*/

pub mod cloudflare;
pub mod executor;
pub mod format;
pub mod github;
pub mod hetzner;
pub mod types;

pub use executor::{build_url, execute, parse_action_args};
pub use types::{Action, ExecuteOptions, ProviderSchema, ResolvedParams};

/// Ordered collection of provider schemas, keyed by `ProviderSchema::name`.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderSchema>,
}

impl ProviderRegistry {
    /// Empty registry. Use [`ProviderRegistry::builtin`] for the stock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the builtin providers, in display order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(hetzner::HETZNER);
        registry.register(github::GITHUB);
        registry.register(cloudflare::CLOUDFLARE);
        registry
    }

    /// Insert a schema keyed by its name. A duplicate name silently replaces
    /// the existing schema in place, keeping its listing position.
    pub fn register(&mut self, schema: ProviderSchema) {
        if let Some(slot) = self.providers.iter_mut().find(|p| p.name == schema.name) {
            *slot = schema;
        } else {
            self.providers.push(schema);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProviderSchema> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// All registered schemas in registration order.
    pub fn list(&self) -> &[ProviderSchema] {
        &self.providers
    }
}

#[cfg(test)]
mod tests {
    use super::types::{AuthPattern, AuthType, Method};
    use super::*;

    #[test]
    fn builtin_round_trip() {
        let registry = ProviderRegistry::builtin();
        let names: Vec<&str> = registry.list().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["hetzner", "github", "cloudflare"]);
        for name in names {
            assert_eq!(registry.get(name).map(|p| p.name), Some(name));
        }
    }

    #[test]
    fn unknown_provider_absent() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn register_overwrites_in_place() {
        let mut registry = ProviderRegistry::builtin();
        let replacement = ProviderSchema {
            name: "github",
            display_name: "GitHub (patched)",
            base_url: "https://github.example",
            auth: AuthPattern {
                auth_type: AuthType::Bearer,
                secret_name: "OTHER_TOKEN",
                header_name: None,
            },
            actions: &[],
        };
        registry.register(replacement);
        assert_eq!(registry.list().len(), 3);
        assert_eq!(registry.list()[1].display_name, "GitHub (patched)");
    }

    #[test]
    fn hetzner_schema_structure() {
        let hetzner = hetzner::HETZNER;
        assert_eq!(hetzner.name, "hetzner");
        assert_eq!(hetzner.auth.auth_type, AuthType::Bearer);
        assert!(hetzner.action("list-servers").is_some());
        assert!(hetzner.action("create-server").is_some());
        assert!(hetzner.action("delete-server").is_some());
    }

    #[test]
    fn github_schema_structure() {
        let github = github::GITHUB;
        assert_eq!(github.name, "github");
        assert!(github.action("list-repos").is_some());
        let clone = github.action("clone").unwrap();
        assert_eq!(clone.method, Method::Git);
    }

    #[test]
    fn cloudflare_schema_structure() {
        let cloudflare = cloudflare::CLOUDFLARE;
        assert_eq!(cloudflare.name, "cloudflare");
        assert!(cloudflare.action("dns-list").is_some());
        assert!(cloudflare.action("dns-add").is_some());
        assert!(cloudflare.action("missing").is_none());
    }
}
