//! Data records that rules are evaluated against

use crate::error::{Result, RuleEngineError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to value mapping supplied per evaluation.
///
/// Only string and number values can be compared. Other JSON values may be
/// stored, but a condition on such a field is an evaluation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: AHashMap<String, Value>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            RuleEngineError::InvalidStructure("Data record must be a JSON object".to_string())
        })?;
        Ok(object
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Insert or replace a field, returning `self` for chaining
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        DataRecord {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let record = DataRecord::new()
            .with("age", 35)
            .with("department", "Sales")
            .with("score", 7.5);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("age"), Some(&json!(35)));
        assert_eq!(record.get("department"), Some(&json!("Sales")));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_from_json() {
        let record = DataRecord::from_json(&json!({"age": 35, "active": true})).unwrap();
        assert_eq!(record.get("active"), Some(&json!(true)));

        assert!(matches!(
            DataRecord::from_json(&json!([1, 2])),
            Err(RuleEngineError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_deserialize_transparent() {
        let record: DataRecord = serde_json::from_str(r#"{"income": 50000}"#).unwrap();
        assert_eq!(record.get("income"), Some(&json!(50000)));
    }
}
