//! Cloudflare provider schema.

use super::types::{
    Action, AuthPattern, AuthType, BodyKind, Method, ParamDef, ParamLocation, ProviderSchema,
};

pub const CLOUDFLARE: ProviderSchema = ProviderSchema {
    name: "cloudflare",
    display_name: "Cloudflare",
    base_url: "https://api.cloudflare.com/client/v4",
    auth: AuthPattern {
        auth_type: AuthType::Bearer,
        secret_name: "CLOUDFLARE_API_TOKEN",
        header_name: None,
    },
    actions: &[
        Action {
            name: "list-zones",
            description: "List all zones",
            method: Method::Get,
            path: "/zones",
            params: &[],
            body: BodyKind::None,
            capability: "zones.list",
        },
        Action {
            name: "dns-list",
            description: "List DNS records for a zone",
            method: Method::Get,
            path: "/zones/{zone_id}/dns_records",
            params: &[ParamDef {
                name: "zone_id",
                position: None,
                flag: Some("--zone"),
                required: true,
                location: ParamLocation::Path,
            }],
            body: BodyKind::None,
            capability: "dns.list",
        },
        Action {
            name: "dns-add",
            description: "Add a DNS record",
            method: Method::Post,
            path: "/zones/{zone_id}/dns_records",
            params: &[
                ParamDef {
                    name: "zone_id",
                    position: None,
                    flag: Some("--zone"),
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "type",
                    position: None,
                    flag: Some("--type"),
                    required: true,
                    location: ParamLocation::Body,
                },
                ParamDef {
                    name: "name",
                    position: None,
                    flag: Some("--name"),
                    required: true,
                    location: ParamLocation::Body,
                },
                ParamDef {
                    name: "content",
                    position: None,
                    flag: Some("--content"),
                    required: true,
                    location: ParamLocation::Body,
                },
            ],
            body: BodyKind::Json,
            capability: "dns.write",
        },
        Action {
            name: "dns-delete",
            description: "Delete a DNS record",
            method: Method::Delete,
            path: "/zones/{zone_id}/dns_records/{id}",
            params: &[
                ParamDef {
                    name: "zone_id",
                    position: None,
                    flag: Some("--zone"),
                    required: true,
                    location: ParamLocation::Path,
                },
                ParamDef {
                    name: "id",
                    position: Some(0),
                    flag: None,
                    required: true,
                    location: ParamLocation::Path,
                },
            ],
            body: BodyKind::None,
            capability: "dns.delete",
        },
    ],
};
