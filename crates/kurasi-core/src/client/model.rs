use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::module::ModuleMap;

/// Represents a client (tenant) that inherits module configuration from its
/// sector and may override it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier
    pub client_id: String,
    pub name: String,
    /// Always written as a number; read from a number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_project_id")]
    pub project_id: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// The client's own module instances. Independent of the sector's map.
    #[serde(default)]
    pub modules: ModuleMap,
}

impl Client {
    /// Creates a client without a sector and without modules.
    pub fn new(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: name.into(),
            project_id: 0,
            category: String::new(),
            sector_id: None,
            logo: None,
            modules: ModuleMap::new(),
        }
    }

    pub fn with_sector(mut self, sector_id: impl Into<String>) -> Self {
        self.sector_id = Some(sector_id.into());
        self
    }

    pub fn with_project_id(mut self, project_id: i64) -> Self {
        self.project_id = project_id;
        self
    }
}

/// Partial update for a [`Client`].
///
/// The nested options on `sector_id` and `logo` distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub project_id: Option<i64>,
    pub category: Option<String>,
    pub sector_id: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub modules: Option<ModuleMap>,
}

impl ClientPatch {
    pub(crate) fn apply(self, client: &mut Client) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(project_id) = self.project_id {
            client.project_id = project_id;
        }
        if let Some(category) = self.category {
            client.category = category;
        }
        if let Some(sector_id) = self.sector_id {
            client.sector_id = sector_id;
        }
        if let Some(logo) = self.logo {
            client.logo = logo;
        }
        if let Some(modules) = self.modules {
            client.modules = modules;
        }
    }
}

fn deserialize_project_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| de::Error::custom(format!("invalid project_id: {}", n))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid project_id: {:?}", s)))
        }
        other => Err(de::Error::custom(format!("invalid project_id: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_id_reads_leniently() {
        let from_string: Client =
            serde_json::from_value(json!({"client_id": "c1", "name": "A", "project_id": "42"}))
                .unwrap();
        assert_eq!(from_string.project_id, 42);

        let from_empty: Client =
            serde_json::from_value(json!({"client_id": "c1", "name": "A", "project_id": ""}))
                .unwrap();
        assert_eq!(from_empty.project_id, 0);

        let missing: Client =
            serde_json::from_value(json!({"client_id": "c1", "name": "A"})).unwrap();
        assert_eq!(missing.project_id, 0);
    }

    #[test]
    fn test_project_id_rejects_garbage() {
        let result = serde_json::from_value::<Client>(
            json!({"client_id": "c1", "name": "A", "project_id": "abc"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_project_id_accepts_only_whole_numbers() {
        let whole: Client =
            serde_json::from_value(json!({"client_id": "c1", "name": "A", "project_id": 42.0}))
                .unwrap();
        assert_eq!(whole.project_id, 42);

        for bad in [json!(4.5), json!(1e30), json!(-1e30)] {
            let result = serde_json::from_value::<Client>(
                json!({"client_id": "c1", "name": "A", "project_id": bad}),
            );
            assert!(result.is_err(), "project_id {} should be rejected", bad);
        }
    }

    #[test]
    fn test_client_serializes_project_id_as_number() {
        let client = Client::new("c1", "Acme").with_project_id(7);
        let value = serde_json::to_value(&client).unwrap();

        assert_eq!(value["project_id"], json!(7));
        assert!(value.get("sector_id").is_none());
        assert!(value.get("logo").is_none());
    }

    #[test]
    fn test_client_patch_can_clear_sector() {
        let mut client = Client::new("c1", "Acme").with_sector("s1");
        ClientPatch {
            sector_id: Some(None),
            ..ClientPatch::default()
        }
        .apply(&mut client);
        assert_eq!(client.sector_id, None);
    }
}
