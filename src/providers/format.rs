/*!
Best-effort tabular rendering of provider API responses.

The formatter never fails: anything it cannot shape into a table falls back
to pretty JSON (or the raw text upstream). Column layouts are keyed by the
action's capability string; keys may be dot-separated paths into nested
objects (`public_net.ipv4.ip`).
*/

use serde_json::Value;

use super::types::Action;

/// One table column: a (possibly nested) item key and its header label.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

/// Wrapper keys providers use around list payloads, probed in order.
/// Hetzner wraps in e.g. `{"servers": [...]}`, Cloudflare in `{"result": [...]}`.
const WRAPPER_KEYS: &[&str] = &[
    "servers",
    "ssh_keys",
    "images",
    "result",
    "zones",
    "dns_records",
];

/// Render a parsed JSON response for human consumption.
pub fn format_response(data: &Value, action: &Action) -> String {
    let items: &[Value] = match data {
        Value::Array(items) => items,
        Value::Object(obj) => {
            match WRAPPER_KEYS
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_array))
            {
                Some(items) => items,
                // Single object response
                None => return pretty(data),
            }
        }
        _ => &[],
    };

    if items.is_empty() {
        return "(no results)".to_string();
    }

    match pick_columns(action.capability) {
        Some(columns) => format_table(items, columns),
        None => pretty(&Value::Array(items.to_vec())),
    }
}

/// Column layout for a capability, or `None` to fall back to raw JSON.
pub fn pick_columns(capability: &str) -> Option<&'static [Column]> {
    let columns: &'static [Column] = match capability {
        "servers.list" => &[
            Column { key: "name", label: "NAME" },
            Column { key: "status", label: "STATUS" },
            Column { key: "public_net.ipv4.ip", label: "IP" },
            Column { key: "server_type.name", label: "TYPE" },
            Column { key: "datacenter.name", label: "DATACENTER" },
        ],
        "ssh-keys.list" => &[
            Column { key: "id", label: "ID" },
            Column { key: "name", label: "NAME" },
            Column { key: "fingerprint", label: "FINGERPRINT" },
        ],
        "images.list" => &[
            Column { key: "id", label: "ID" },
            Column { key: "name", label: "NAME" },
            Column { key: "type", label: "TYPE" },
            Column { key: "status", label: "STATUS" },
        ],
        "repos.list" => &[
            Column { key: "full_name", label: "REPO" },
            Column { key: "private", label: "PRIVATE" },
            Column { key: "language", label: "LANG" },
            Column { key: "updated_at", label: "UPDATED" },
        ],
        "issues.list" => &[
            Column { key: "number", label: "#" },
            Column { key: "title", label: "TITLE" },
            Column { key: "state", label: "STATE" },
            Column { key: "user.login", label: "AUTHOR" },
        ],
        "zones.list" => &[
            Column { key: "id", label: "ID" },
            Column { key: "name", label: "NAME" },
            Column { key: "status", label: "STATUS" },
        ],
        "dns.list" => &[
            Column { key: "id", label: "ID" },
            Column { key: "type", label: "TYPE" },
            Column { key: "name", label: "NAME" },
            Column { key: "content", label: "CONTENT" },
        ],
        _ => return None,
    };
    Some(columns)
}

/// Walk a dot-separated path into nested objects. Missing keys, null
/// values, and non-object intermediates all render as the empty string.
fn nested_value(item: &Value, path: &str) -> String {
    let mut current = item;
    for part in path.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    match current {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fixed-width table: each column as wide as its widest cell or label,
/// cells right-padded, columns joined by two spaces.
fn format_table(items: &[Value], columns: &[Column]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.label.chars().count()).collect();
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|c| nested_value(item, c.key))
                .collect::<Vec<String>>()
        })
        .collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c.label, widths[i]))
        .collect();
    out.push_str(&header.join("  "));
    for row in &rows {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths[i]))
            .collect();
        out.push_str(&cells.join("  "));
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    let mut out = s.to_string();
    for _ in s.chars().count()..width {
        out.push(' ');
    }
    out
}

fn pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{github, hetzner};
    use serde_json::json;

    fn action(schema: &crate::providers::ProviderSchema, name: &str) -> Action {
        *schema.action(name).unwrap()
    }

    #[test]
    fn empty_list_is_no_results() {
        let list_servers = action(&hetzner::HETZNER, "list-servers");
        assert_eq!(format_response(&json!([]), &list_servers), "(no results)");
        assert_eq!(
            format_response(&json!({"servers": []}), &list_servers),
            "(no results)"
        );
    }

    #[test]
    fn scalar_body_is_no_results() {
        let list_servers = action(&hetzner::HETZNER, "list-servers");
        assert_eq!(format_response(&json!("ok"), &list_servers), "(no results)");
    }

    #[test]
    fn unwraps_provider_specific_list_key() {
        let list_zones = action(&crate::providers::cloudflare::CLOUDFLARE, "list-zones");
        let data = json!({"result": [
            {"id": "z1", "name": "example.com", "status": "active"},
            {"id": "z2", "name": "example.org", "status": "pending"}
        ]});
        let table = format_response(&data, &list_zones);
        assert_eq!(
            table,
            "ID  NAME         STATUS \n\
             z1  example.com  active \n\
             z2  example.org  pending"
        );
    }

    #[test]
    fn nested_keys_and_missing_values() {
        let list_servers = action(&hetzner::HETZNER, "list-servers");
        let data = json!({"servers": [
            {
                "name": "web-1",
                "status": "running",
                "public_net": {"ipv4": {"ip": "203.0.113.5"}},
                "server_type": {"name": "cx22"},
                "datacenter": {"name": "fsn1-dc14"}
            },
            {"name": "web-2", "status": "off", "public_net": null}
        ]});
        let table = format_response(&data, &list_servers);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME   STATUS "));
        assert!(lines[1].contains("203.0.113.5"));
        assert!(lines[2].starts_with("web-2  off"));
        // missing nested values render as empty cells
        assert!(!lines[2].contains("null"));
    }

    #[test]
    fn single_object_renders_as_json() {
        let get_repo = action(&github::GITHUB, "get-repo");
        let data = json!({"full_name": "acme/widgets", "private": false});
        let out = format_response(&data, &get_repo);
        assert!(out.starts_with('{'));
        assert!(out.contains("acme/widgets"));
    }

    #[test]
    fn unknown_capability_falls_back_to_json_list() {
        let get_server = action(&hetzner::HETZNER, "get-server");
        // servers.read has no column layout
        let data = json!([{"id": 1}]);
        let out = format_response(&data, &get_server);
        assert!(out.starts_with('['));
    }

    #[test]
    fn booleans_and_numbers_stringify() {
        let list_issues = action(&github::GITHUB, "list-issues");
        let data = json!([
            {"number": 7, "title": "Crash", "state": "open", "user": {"login": "amy"}}
        ]);
        let table = format_response(&data, &list_issues);
        assert_eq!(
            table,
            "#  TITLE  STATE  AUTHOR\n\
             7  Crash  open   amy   "
        );
    }

    #[test]
    fn nested_value_edge_cases() {
        let item = json!({"a": {"b": null}, "scalar": 3});
        assert_eq!(nested_value(&item, "a.b"), "");
        assert_eq!(nested_value(&item, "a.b.c"), "");
        assert_eq!(nested_value(&item, "missing"), "");
        assert_eq!(nested_value(&item, "scalar"), "3");
        assert_eq!(nested_value(&item, "scalar.deeper"), "");
    }
}
