//! Storage backend configuration.

use serde::{Deserialize, Serialize};

/// Selects and configures the engine behind a store.
///
/// ```json
/// { "type": "SlateDb", "path": "data", "object_store": { "type": "Local", "path": "/tmp/db" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Volatile storage backed by a `BTreeMap`. Useful for tests.
    #[default]
    InMemory,
    /// SlateDB on top of an object store. Requires the `slatedb` feature.
    SlateDb(SlateDbStorageConfig),
}

/// SlateDB database location and tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlateDbStorageConfig {
    /// Path prefix of the database inside the object store.
    pub path: String,
    /// Object store holding the database files.
    pub object_store: ObjectStoreConfig,
    /// Optional SlateDB settings file. When absent, settings are loaded from
    /// the environment or defaulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectStoreConfig {
    InMemory,
    Local(LocalObjectStoreConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectStoreConfig {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_in_memory() {
        assert_eq!(StorageConfig::default(), StorageConfig::InMemory);
    }

    #[test]
    fn should_deserialize_in_memory_config() {
        // given
        let json = r#"{ "type": "InMemory" }"#;

        // when
        let config: StorageConfig = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(config, StorageConfig::InMemory);
    }

    #[test]
    fn should_deserialize_slatedb_config_without_settings_path() {
        // given
        let json = r#"{
            "type": "SlateDb",
            "path": "linked",
            "object_store": { "type": "Local", "path": "/var/lib/linked" }
        }"#;

        // when
        let config: StorageConfig = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(
            config,
            StorageConfig::SlateDb(SlateDbStorageConfig {
                path: "linked".to_string(),
                object_store: ObjectStoreConfig::Local(LocalObjectStoreConfig {
                    path: "/var/lib/linked".to_string(),
                }),
                settings_path: None,
            })
        );
    }

    #[test]
    fn should_reject_unknown_storage_type() {
        let result = serde_json::from_str::<StorageConfig>(r#"{ "type": "Postgres" }"#);

        assert!(result.is_err());
    }
}
