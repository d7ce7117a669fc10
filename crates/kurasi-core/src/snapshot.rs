//! Export/import document model, structural validation and identifier coercion.
//!
//! Import documents are untrusted JSON. They are checked structurally on the
//! raw [`Value`] first, then numeric identifiers are coerced to strings, and
//! only then decoded into domain types. Nothing here touches a registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::client::Client;
use crate::error::{KurasiError, Result};
use crate::module::MasterModule;
use crate::sector::Sector;

/// Full console state as exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default, rename = "masterModules")]
    pub master_modules: Vec<MasterModule>,
}

/// A decoded import document. Absent keys leave their registry untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub sectors: Option<Vec<Sector>>,
    #[serde(default)]
    pub clients: Option<Vec<Client>>,
    #[serde(default, rename = "masterModules")]
    pub master_modules: Option<Vec<MasterModule>>,
}

impl ImportDocument {
    pub fn is_empty(&self) -> bool {
        self.sectors.is_none() && self.clients.is_none() && self.master_modules.is_none()
    }
}

impl From<DataSnapshot> for ImportDocument {
    fn from(snapshot: DataSnapshot) -> Self {
        Self {
            sectors: Some(snapshot.sectors),
            clients: Some(snapshot.clients),
            master_modules: Some(snapshot.master_modules),
        }
    }
}

// ============================================================================
// Structural validation
// ============================================================================

fn is_valid_id(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(_)) | Some(Value::Number(_)))
}

fn is_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(_)))
}

fn modules_ok(entry: &Map<String, Value>) -> bool {
    matches!(entry.get("modules"), None | Some(Value::Object(_)))
}

/// Returns the array under `key`, `Ok(None)` when the key is absent.
fn array_at<'a>(doc: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(KurasiError::validation(format!("{} must be an array", key))),
    }
}

fn objects<'a>(items: &'a [Value], what: &str) -> Result<Vec<&'a Map<String, Value>>> {
    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| KurasiError::validation(format!("Each {} must be an object", what)))
        })
        .collect()
}

/// Checks the shape of an import document without decoding it.
///
/// # Errors
///
/// Returns `KurasiError::Validation` with the first problem found.
pub fn validate_document(value: &Value) -> Result<()> {
    let doc = value
        .as_object()
        .ok_or_else(|| KurasiError::validation("Data must be an object"))?;

    if let Some(sectors) = array_at(doc, "sectors")? {
        for sector in objects(sectors, "sector")? {
            if !is_valid_id(sector.get("id")) || !is_string(sector.get("name")) {
                return Err(KurasiError::validation("Sector must have id and name"));
            }
            if !modules_ok(sector) {
                return Err(KurasiError::validation("Sector modules must be an object"));
            }
        }
    }

    if let Some(clients) = array_at(doc, "clients")? {
        for client in objects(clients, "client")? {
            let has_id = is_valid_id(client.get("client_id")) || is_valid_id(client.get("id"));
            if !has_id || !is_string(client.get("name")) {
                return Err(KurasiError::validation(
                    "Client must have client_id (or id) and name",
                ));
            }
            if !modules_ok(client) {
                return Err(KurasiError::validation("Client modules must be an object"));
            }
        }
    }

    if let Some(modules) = array_at(doc, "masterModules")? {
        for module in objects(modules, "module")? {
            if !is_valid_id(module.get("id")) || !is_string(module.get("name")) {
                return Err(KurasiError::validation("Module must have id and name"));
            }
            if !matches!(module.get("config_schema"), Some(Value::Array(_))) {
                return Err(KurasiError::validation(
                    "Module must have config_schema as array",
                ));
            }
        }
    }

    Ok(())
}

// ============================================================================
// Identifier coercion
// ============================================================================

/// Formats a JSON number the way a JavaScript `String(n)` would.
///
/// Integral values below 1e21 print without a fractional part, so `7.0` and
/// `7` both become `"7"`. Larger magnitudes keep the exponent form with an
/// explicit sign (`1e+21`).
fn number_to_id(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => {
            let text = n.to_string();
            match text.split_once('e') {
                Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
                _ => text,
            }
        }
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_id(n)),
        _ => None,
    }
}

fn coerce_field(entry: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Number(n)) = entry.get(key) {
        let text = number_to_id(n);
        entry.insert(key.to_string(), Value::String(text));
    }
}

fn entries_mut<'a>(doc: &'a mut Map<String, Value>, key: &str) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    doc.get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
        .filter_map(Value::as_object_mut)
}

/// Turns numeric identifiers into their string form, in place.
///
/// Covers `masterModules[].id`, `sectors[].id`, `clients[].client_id` (filled
/// from the legacy `id` key when missing) and `clients[].sector_id`. Older
/// exports stored some of these as numbers while instance maps are always
/// keyed by string.
pub fn coerce_identifiers(value: &mut Value) {
    let Some(doc) = value.as_object_mut() else {
        return;
    };

    for module in entries_mut(doc, "masterModules") {
        coerce_field(module, "id");
    }
    for sector in entries_mut(doc, "sectors") {
        coerce_field(sector, "id");
    }
    for client in entries_mut(doc, "clients") {
        let client_id = client
            .get("client_id")
            .and_then(id_to_string)
            .or_else(|| client.get("id").and_then(id_to_string));
        if let Some(client_id) = client_id {
            client.insert("client_id".to_string(), Value::String(client_id));
        }
        coerce_field(client, "sector_id");
    }
}

/// Parses, validates, coerces and decodes an import document.
///
/// # Errors
///
/// Every failure, including invalid JSON and a document that passes the
/// structural checks but still cannot be decoded, is a `Validation` error.
pub fn parse_import_document(json_text: &str) -> Result<ImportDocument> {
    let mut value: Value = serde_json::from_str(json_text)
        .map_err(|e| KurasiError::validation(format!("Invalid JSON: {}", e)))?;
    validate_document(&value)?;
    coerce_identifiers(&mut value);
    serde_json::from_value(value)
        .map_err(|e| KurasiError::validation(format!("Malformed import data: {}", e)))
}
