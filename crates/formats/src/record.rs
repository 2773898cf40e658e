use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One marker as an open attribute map.
///
/// Markers stay loosely typed until defaults are filled so that alteration
/// documents can patch any attribute the source carried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerRecord(Map<String, Value>);

impl MarkerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// A finite number `>= 0`, the validity rule for numeric style fields.
    pub fn non_negative(&self, key: &str) -> Option<f64> {
        self.number(key).filter(|v| v.is_finite() && *v >= 0.0)
    }

    pub fn name(&self) -> Option<&str> {
        self.str("name")
    }
}

/// Loose truthiness of a document value: `null`, `false`, `0`, and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerRecord, is_truthy};
    use serde_json::json;

    #[test]
    fn truthiness_matches_document_conventions() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("red")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn non_negative_rejects_invalid_numbers() {
        let r: MarkerRecord =
            serde_json::from_value(json!({"weight": -1, "radius": "12", "opacity": 0}))
                .expect("record");
        assert_eq!(r.non_negative("weight"), None);
        assert_eq!(r.non_negative("radius"), None);
        assert_eq!(r.non_negative("opacity"), Some(0.0));
        assert_eq!(r.non_negative("missing"), None);
    }
}
