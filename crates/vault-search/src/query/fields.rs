//! Flattens a vault item into the text fields that terms are matched against.
//!
//! Every string property of the serialized item is collected by walking it
//! recursively (arrays are not entered). Paths listed in
//! [`SENSITIVE_FIELD_PATHS`] never reach the output, whether they are walked
//! directly or reached through a linked custom field.

use serde_json::{Map, Value};

use crate::types::{CipherView, FieldType};

/// Properties that hold secrets. Terms must never match through them.
pub const SENSITIVE_FIELD_PATHS: &[&str] = &[
    "login.password",
    "login.totp",
    "card.code",
    "sshKey.privateKey",
];

/// Item-level bookkeeping that is not user text.
const METADATA_KEYS: &[&str] = &[
    "id",
    "organizationId",
    "folderId",
    "type",
    "creationDate",
    "revisionDate",
    "deletedDate",
];

pub fn is_sensitive_path(path: &str) -> bool {
    SENSITIVE_FIELD_PATHS.contains(&path)
}

/// One matchable text value of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableField {
    /// Dotted property path, e.g. `login.username` or `fields.Recovery`.
    pub path: String,
    /// Name used by field terms: the last path segment, or the custom field
    /// name.
    pub name: String,
    pub value: String,
}

pub fn searchable_fields(item: &CipherView) -> Vec<SearchableField> {
    let mut fields = Vec::new();

    let serialized = match serde_json::to_value(item) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            log::debug!("failed to serialize item {} for search: {}", item.id, e);
            Map::new()
        }
    };

    for (key, value) in &serialized {
        if METADATA_KEYS.contains(&key.as_str()) {
            continue;
        }
        collect_properties(key, key, value, &mut fields);
    }

    for field in &item.fields {
        let name = field.name.clone().unwrap_or_default();
        let value = match field.field_type {
            FieldType::Text => field.value.clone(),
            FieldType::Linked => field
                .linked_id
                .map(|linked| linked.property_path())
                .filter(|path| !is_sensitive_path(path))
                .and_then(|path| lookup_path(&serialized, path))
                .map(str::to_string),
            FieldType::Hidden | FieldType::Boolean => None,
        };
        if let Some(value) = value {
            fields.push(SearchableField {
                path: format!("fields.{name}"),
                name,
                value,
            });
        }
    }

    for attachment in &item.attachments {
        if let Some(file_name) = &attachment.file_name {
            fields.push(SearchableField {
                path: "attachments.fileName".to_string(),
                name: "fileName".to_string(),
                value: file_name.clone(),
            });
        }
    }

    fields
}

fn collect_properties(path: &str, name: &str, value: &Value, out: &mut Vec<SearchableField>) {
    match value {
        Value::String(text) => {
            if !is_sensitive_path(path) {
                out.push(SearchableField {
                    path: path.to_string(),
                    name: name.to_string(),
                    value: text.clone(),
                });
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                collect_properties(&format!("{path}.{key}"), key, child, out);
            }
        }
        Value::Array(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

fn lookup_path<'v>(root: &'v Map<String, Value>, path: &str) -> Option<&'v str> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    current.as_str()
}
