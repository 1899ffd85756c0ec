use serde_json::Value;

use crate::feature_collection::Feature;

/// Reads a numeric attribute value.
///
/// Numbers are taken as-is and strings go through standard float parsing
/// after trimming. Missing keys, `null`, booleans, empty or non-numeric
/// strings, arrays, objects and non-finite results are all absent.
pub fn numeric_value(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Text shown for a raw property value in popups; `None` for missing or null.
pub fn display_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Feature {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        numeric_value(self.property(name))
    }

    pub fn text(&self, name: &str) -> Option<String> {
        display_value(self.property(name))
    }

    /// Truthiness of a boolean flag property; anything but `true` is false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.property(name), Some(Value::Bool(true)))
    }
}
