//! Settings store: the externally owned home of the desired `enabled` flag.
//!
//! Anything may write the flag; the runtime only polls it through `reconcile()`.

mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Result;

pub use sqlite::SqliteSettings;

/// Key/value settings shared with other actors.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting, `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a setting.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Interpret a setting as a boolean.
///
/// Accepts booleans, 0/1 numbers, and the usual truthy/falsy strings. Anything else
/// is `None`.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Process-local settings.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value before handing the store to the runtime.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.get_mut().insert(key.into(), value);
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_bool_booleans() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!(false)), Some(false));
    }

    #[test]
    fn test_coerce_bool_strings() {
        assert_eq!(coerce_bool(&json!("true")), Some(true));
        assert_eq!(coerce_bool(&json!(" TRUE ")), Some(true));
        assert_eq!(coerce_bool(&json!("1")), Some(true));
        assert_eq!(coerce_bool(&json!("on")), Some(true));
        assert_eq!(coerce_bool(&json!("False")), Some(false));
        assert_eq!(coerce_bool(&json!("no")), Some(false));
        assert_eq!(coerce_bool(&json!("maybe")), None);
        assert_eq!(coerce_bool(&json!("")), None);
    }

    #[test]
    fn test_coerce_bool_numbers_and_others() {
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!(2)), None);
        assert_eq!(coerce_bool(&json!(null)), None);
        assert_eq!(coerce_bool(&json!({"enabled": true})), None);
    }

    #[tokio::test]
    async fn test_in_memory_get_set() {
        let settings = InMemorySettings::new();
        assert_eq!(settings.get("AUTONOMY_ENABLED").await.unwrap(), None);

        settings.set("AUTONOMY_ENABLED", json!(true)).await.unwrap();
        assert_eq!(
            settings.get("AUTONOMY_ENABLED").await.unwrap(),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn test_in_memory_seeded() {
        let settings = InMemorySettings::new().with("AUTONOMY_ENABLED", json!("true"));
        assert_eq!(
            settings.get("AUTONOMY_ENABLED").await.unwrap(),
            Some(json!("true"))
        );
    }
}
