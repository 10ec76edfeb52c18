//! GitHub provider schema.
//!
//! The `clone` action carries the synthetic `GIT` method and delegates to
//! the `seks-git` helper instead of issuing an HTTP request.

use super::types::{
    Action, AuthPattern, AuthType, BodyKind, Method, ParamDef, ParamLocation, ProviderSchema,
};

pub const GITHUB: ProviderSchema = ProviderSchema {
    name: "github",
    display_name: "GitHub",
    base_url: "https://api.github.com",
    auth: AuthPattern {
        auth_type: AuthType::Bearer,
        secret_name: "SEKSBOT_GITHUB_PERSONAL_ACCESS_TOKEN",
        header_name: None,
    },
    actions: &[
        Action {
            name: "list-repos",
            description: "List repositories for authenticated user",
            method: Method::Get,
            path: "/user/repos",
            params: &[],
            body: BodyKind::None,
            capability: "repos.list",
        },
        Action {
            name: "get-repo",
            description: "Get repository details",
            method: Method::Get,
            path: "/repos/{owner}/{repo}",
            params: &[
                ParamDef {
                    name: "owner",
                    position: Some(0),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "repo",
                    position: Some(1),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
            ],
            body: BodyKind::None,
            capability: "repos.read",
        },
        Action {
            name: "list-issues",
            description: "List issues for a repository",
            method: Method::Get,
            path: "/repos/{owner}/{repo}/issues",
            params: &[
                ParamDef {
                    name: "owner",
                    position: Some(0),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "repo",
                    position: Some(1),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
            ],
            body: BodyKind::None,
            capability: "issues.list",
        },
        Action {
            name: "create-issue",
            description: "Create an issue",
            method: Method::Post,
            path: "/repos/{owner}/{repo}/issues",
            params: &[
                ParamDef {
                    name: "owner",
                    position: Some(0),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "repo",
                    position: Some(1),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "title",
                    position: None,
                    flag: Some("--title"),
                    required: true,
                    location: ParamLocation::Body,
                },
                ParamDef {
                    name: "body",
                    position: None,
                    flag: Some("--body"),
                    required: false,
                    location: ParamLocation::Body,
                },
            ],
            body: BodyKind::Json,
            capability: "issues.write",
        },
        Action {
            name: "clone",
            description: "Clone a repository (delegates to seks-git)",
            method: Method::Git,
            path: "/{owner}/{repo}",
            params: &[
                ParamDef {
                    name: "owner",
                    position: Some(0),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "repo",
                    position: Some(1),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "dest",
                    position: Some(2),
                    flag: None,
                    required: false,
                    location: ParamLocation::Body,
                },
            ],
            body: BodyKind::None,
            capability: "repos.read",
        },
    ],
};
