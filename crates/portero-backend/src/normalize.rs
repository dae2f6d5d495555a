//! Normalization of heterogeneous backend payload shapes.
//!
//! Deployed backend versions disagree on key names (English vs Spanish,
//! camelCase vs snake_case, list nesting). Each function here accepts
//! the union of observed shapes and produces exactly one canonical
//! struct, so everything above this module is variance-free. Missing or
//! malformed pieces degrade to empty defaults, never to errors.

use serde_json::Value;

use portero_core::{Gate, GateList, Group, Menu, Module, UserProfile};

/// Outcome of a command POST as reported in the body, independent of
/// the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReceipt {
    /// Whether the body accepted the command. A 2xx response without any
    /// recognizable flag counts as accepted.
    pub accepted: bool,
    /// Rejection detail (`FORBIDDEN`, `INVALID_ACTION`, ...), when given.
    pub reason: Option<String>,
}

/// Normalize the menu payload.
#[must_use]
pub fn menu(data: Option<&Value>) -> Menu {
    let Some(data) = data else {
        return Menu::default();
    };

    let modules = first_array(data, &["modules", "menu", "items"])
        .map(|items| items.iter().filter_map(module).collect())
        .unwrap_or_default();

    let user = data.get("user").map(|u| UserProfile {
        full_name: string_of(u, &["fullName", "full_name", "name"]),
        account_name: string_of(u, &["accountName", "account_name"]),
        account_id: id_of(u, &["accountId", "account_id"]),
    });

    let requires_account_selection = flag_of(
        data,
        &["requiresAccountSelection", "requires_account_selection"],
    )
    .unwrap_or(false);

    Menu {
        modules,
        user,
        requires_account_selection,
    }
}

/// Normalize the group-list payload.
#[must_use]
pub fn groups(data: Option<&Value>) -> Vec<Group> {
    data.and_then(|d| first_array(d, &["groups", "gateGroups", "grupos"]))
        .map(|items| items.iter().filter_map(group).collect())
        .unwrap_or_default()
}

/// Normalize the gate-list payload. `fallback_group_id` labels the group
/// when the backend omits the wrapper object.
#[must_use]
pub fn gate_list(data: Option<&Value>, fallback_group_id: i64) -> GateList {
    let gates = data
        .and_then(|d| first_array(d, &["gates", "portones", "items", "data"]))
        .map(|items| items.iter().filter_map(gate).collect())
        .unwrap_or_default();

    let group = data
        .and_then(|d| d.get("group").or_else(|| d.get("grupo")))
        .and_then(group)
        .unwrap_or(Group {
            id: fallback_group_id,
            name: format!("Group {fallback_group_id}"),
        });

    GateList { group, gates }
}

/// Normalize the command-response body. The success flag is named
/// `ok`, `accepted` or `success` depending on backend version; the
/// first one present wins.
#[must_use]
pub fn command_receipt(data: Option<&Value>) -> CommandReceipt {
    let accepted = data
        .and_then(|d| flag_of(d, &["ok", "accepted", "success"]))
        .unwrap_or(true);
    let reason = data.and_then(|d| string_of(d, &["reason", "error"]));
    CommandReceipt { accepted, reason }
}

fn module(value: &Value) -> Option<Module> {
    let key = string_of(value, &["key"])?;
    let label = string_of(value, &["label", "name"]).unwrap_or_else(|| key.clone());
    // Original contract: anything but an explicit `false` is enabled.
    let enabled = flag_of(value, &["enabled"]).unwrap_or(true);
    Some(Module {
        key,
        label,
        enabled,
    })
}

fn group(value: &Value) -> Option<Group> {
    let id = id_of(value, &["id", "groupId", "grupoId"])?;
    let name = string_of(value, &["name", "nombre"]).unwrap_or_else(|| format!("Group {id}"));
    Some(Group { id, name })
}

fn gate(value: &Value) -> Option<Gate> {
    let id = id_of(value, &["id", "gateId"])?;
    let name =
        string_of(value, &["name", "nombre", "gateName"]).unwrap_or_else(|| format!("Gate {id}"));
    Some(Gate { id, name })
}

fn first_array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(Value::as_array))
}

fn string_of(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    })
}

/// Ids arrive as numbers or as numeric strings depending on version.
fn id_of(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| {
        let v = value.get(key)?;
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

fn flag_of(value: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| value.get(key).and_then(Value::as_bool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn menu_canonical_shape() {
        let data = json!({
            "modules": [
                {"key": "gates", "label": "Gates", "enabled": true},
                {"key": "crops", "label": "Crops", "enabled": false},
            ],
            "user": {"fullName": "Ana", "accountName": "Quinta Norte", "accountId": 4},
            "requiresAccountSelection": false,
        });
        let menu = menu(Some(&data));
        assert_eq!(menu.modules.len(), 2);
        assert_eq!(menu.modules[0].key, "gates");
        assert!(!menu.modules[1].enabled);
        let user = menu.user.unwrap();
        assert_eq!(user.full_name.as_deref(), Some("Ana"));
        assert_eq!(user.account_id, Some(4));
        assert!(!menu.requires_account_selection);
    }

    #[test]
    fn menu_accepts_alternate_list_keys() {
        for key in ["modules", "menu", "items"] {
            let data = json!({key: [{"key": "gates"}]});
            let menu = menu(Some(&data));
            assert_eq!(menu.modules.len(), 1, "{key}");
            // Label falls back to the key, enabled defaults to true.
            assert_eq!(menu.modules[0].label, "gates");
            assert!(menu.modules[0].enabled);
        }
    }

    #[test]
    fn menu_of_nothing_is_empty() {
        assert_eq!(menu(None), Menu::default());
        assert_eq!(menu(Some(&json!("garbage"))), Menu::default());
    }

    #[test]
    fn groups_accepts_all_observed_keys() {
        for key in ["groups", "gateGroups", "grupos"] {
            let data = json!({key: [{"id": 5, "name": "North"}]});
            let parsed = groups(Some(&data));
            assert_eq!(parsed, vec![Group { id: 5, name: "North".to_owned() }], "{key}");
        }
    }

    #[test]
    fn groups_skips_items_without_id() {
        let data = json!({"groups": [{"name": "orphan"}, {"id": "7", "nombre": "Sur"}]});
        let parsed = groups(Some(&data));
        assert_eq!(parsed, vec![Group { id: 7, name: "Sur".to_owned() }]);
    }

    #[test]
    fn gate_list_resolves_group_and_gates() {
        let data = json!({
            "group": {"id": 3, "name": "Front"},
            "gates": [{"id": 12, "name": "Main gate"}, {"gateId": 13}],
        });
        let list = gate_list(Some(&data), 3);
        assert_eq!(list.group.name, "Front");
        assert_eq!(list.gates.len(), 2);
        assert_eq!(list.gates[1].name, "Gate 13");
    }

    #[test]
    fn gate_list_falls_back_to_requested_group() {
        let data = json!({"portones": [{"id": 1, "nombre": "Portón 1"}]});
        let list = gate_list(Some(&data), 9);
        assert_eq!(list.group.id, 9);
        assert_eq!(list.group.name, "Group 9");
        assert_eq!(list.gates[0].name, "Portón 1");
    }

    #[test]
    fn gate_list_of_malformed_body_is_empty() {
        let list = gate_list(None, 2);
        assert!(list.gates.is_empty());
        assert_eq!(list.group.id, 2);
    }

    #[test]
    fn command_receipt_accepts_flag_variants() {
        for key in ["ok", "accepted", "success"] {
            let data = json!({key: true});
            assert!(command_receipt(Some(&data)).accepted, "{key}");
            let data = json!({key: false});
            assert!(!command_receipt(Some(&data)).accepted, "{key}");
        }
    }

    #[test]
    fn command_receipt_without_flag_counts_as_accepted() {
        assert!(command_receipt(None).accepted);
        assert!(command_receipt(Some(&json!({}))).accepted);
    }

    #[test]
    fn command_receipt_reads_reason_then_error() {
        let data = json!({"accepted": false, "reason": "FORBIDDEN"});
        assert_eq!(
            command_receipt(Some(&data)).reason.as_deref(),
            Some("FORBIDDEN")
        );
        let data = json!({"accepted": false, "error": "boom"});
        assert_eq!(command_receipt(Some(&data)).reason.as_deref(), Some("boom"));
    }
}
