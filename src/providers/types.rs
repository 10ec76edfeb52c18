/*!
Provider schema types for the action dispatch layer.

A provider is described entirely by immutable data: an auth pattern, a base
URL, and a list of actions (HTTP method + path template + parameter
contract). The executor drives the same logic for every provider off these
records; there is no per-provider behavior.
*/

use std::collections::BTreeMap;
use std::fmt;

/// How the provider authenticates requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// `Authorization: Bearer <secret>`
    Bearer,
    /// `Authorization: Basic <base64(secret)>` — the single secret value is
    /// encoded as-is, not a `user:pass` pair. The broker contract depends on
    /// this exact form.
    Basic,
    /// Raw secret under a provider-named header.
    Header,
}

/// Auth pattern: type plus the broker secret name that backs it.
#[derive(Debug, Clone, Copy)]
pub struct AuthPattern {
    pub auth_type: AuthType,
    pub secret_name: &'static str,
    /// Required when `auth_type` is [`AuthType::Header`].
    pub header_name: Option<&'static str>,
}

/// Request method. `Git` is synthetic: it signals delegation to the
/// `seks-git` clone helper instead of an HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Git,
}

impl Method {
    pub fn is_git(self) -> bool {
        matches!(self, Method::Git)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Git => "GIT",
        };
        f.write_str(s)
    }
}

/// Destination bucket for a resolved parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Body => "body",
        };
        f.write_str(s)
    }
}

/// One parameter slot of an action. Reachable from the CLI through a
/// 0-based positional index, a `--flag`, or both.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub name: &'static str,
    pub position: Option<usize>,
    pub flag: Option<&'static str>,
    pub required: bool,
    pub location: ParamLocation,
}

/// Whether the body bucket is serialized as a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    None,
}

/// One named operation against a provider.
#[derive(Debug, Clone, Copy)]
pub struct Action {
    pub name: &'static str,
    pub description: &'static str,
    pub method: Method,
    /// Path template with `{name}` placeholders.
    pub path: &'static str,
    pub params: &'static [ParamDef],
    pub body: BodyKind,
    /// Opaque tag selecting a response column layout. Not a permission
    /// construct, despite the broker using the same word.
    pub capability: &'static str,
}

/// A third-party API exposed through the uniform action schema.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSchema {
    pub name: &'static str,
    pub display_name: &'static str,
    pub base_url: &'static str,
    pub auth: AuthPattern,
    /// Declaration order is display order; names are unique by construction.
    pub actions: &'static [Action],
}

impl ProviderSchema {
    /// Look up an action by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Parameter values resolved from CLI input, split by destination. Built
/// fresh per invocation and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParams {
    pub path: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: BTreeMap<String, String>,
}

impl ResolvedParams {
    pub fn bucket_mut(&mut self, location: ParamLocation) -> &mut BTreeMap<String, String> {
        match location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
            ParamLocation::Body => &mut self.body,
        }
    }
}

/// Cross-cutting presentation/execution flags for one invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    pub json: bool,
    pub verbose: bool,
    pub dry_run: bool,
}
