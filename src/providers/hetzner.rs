//! Hetzner Cloud provider schema.

use super::types::{
    Action, AuthPattern, AuthType, BodyKind, Method, ParamDef, ParamLocation, ProviderSchema,
};

pub const HETZNER: ProviderSchema = ProviderSchema {
    name: "hetzner",
    display_name: "Hetzner Cloud",
    base_url: "https://api.hetzner.cloud/v1",
    auth: AuthPattern {
        auth_type: AuthType::Bearer,
        secret_name: "HETZNER_API_TOKEN",
        header_name: None,
    },
    actions: &[
        Action {
            name: "list-servers",
            description: "List all servers",
            method: Method::Get,
            path: "/servers",
            params: &[],
            body: BodyKind::None,
            capability: "servers.list",
        },
        Action {
            name: "get-server",
            description: "Get server details",
            method: Method::Get,
            path: "/servers/{id}",
            params: &[ParamDef {
                name: "id",
                position: Some(0),
                flag: None,
                required: true,
                location: ParamLocation::Path,
            }],
            body: BodyKind::None,
            capability: "servers.read",
        },
        Action {
            name: "create-server",
            description: "Create a new server",
            method: Method::Post,
            path: "/servers",
            params: &[
                ParamDef {
                    name: "name",
                    position: None,
                    flag: Some("--name"),
                    required: true,
                    location: ParamLocation::Body,
                },
                ParamDef {
                    name: "server_type",
                    position: None,
                    flag: Some("--type"),
                    required: true,
                    location: ParamLocation::Body,
                },
                ParamDef {
                    name: "image",
                    position: None,
                    flag: Some("--image"),
                    required: true,
                    location: ParamLocation::Body,
                },
            ],
            body: BodyKind::Json,
            capability: "servers.create",
        },
        Action {
            name: "delete-server",
            description: "Delete a server",
            method: Method::Delete,
            path: "/servers/{id}",
            params: &[ParamDef {
                name: "id",
                position: Some(0),
                flag: None,
                required: true,
                location: ParamLocation::Path,
            }],
            body: BodyKind::None,
            capability: "servers.delete",
        },
        Action {
            name: "list-ssh-keys",
            description: "List all SSH keys",
            method: Method::Get,
            path: "/ssh_keys",
            params: &[],
            body: BodyKind::None,
            capability: "ssh-keys.list",
        },
        Action {
            name: "list-images",
            description: "List all images",
            method: Method::Get,
            path: "/images",
            params: &[],
            body: BodyKind::None,
            capability: "images.list",
        },
    ],
};
