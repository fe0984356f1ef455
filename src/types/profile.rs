//! Client physiological profile.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form profile supplied by the browser with every specialist request.
///
/// Fields are kept as raw JSON values: clients send numbers or strings
/// interchangeably and the cache key must reflect exactly what was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub activity: Option<Value>,
    #[serde(default)]
    pub goal: Option<Value>,
    #[serde(default)]
    pub additional_info: Option<Value>,
}

impl ClientProfile {
    /// Current weight in kilograms, if one was supplied and is numeric.
    ///
    /// Numeric strings (`"80.5"`) are accepted; anything else, including
    /// non-finite values, yields `None`. An explicit JSON `null` also counts
    /// as no weight, so such requests are never cached.
    pub fn weight_kg(&self) -> Option<f64> {
        let kg = match self.weight.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        kg.is_finite().then_some(kg)
    }

    /// The subset of fields that identifies a profile for caching.
    ///
    /// Missing fields are `null`; object keys serialize in sorted order so the
    /// textual form is stable.
    pub fn key_fields(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "age": self.age,
            "weight": self.weight,
            "height": self.height,
            "goal": self.goal,
            "activity": self.activity,
        })
    }

    /// Renders the profile as the user prompt shared by all specialists.
    pub fn to_prompt(&self) -> String {
        let additional = match self.additional_info.as_ref() {
            Some(v) if !display_value(Some(v)).is_empty() => display_value(Some(v)),
            _ => "none".to_string(),
        };
        format!(
            "Give recommendations for:\n\
             Name: {}\n\
             Age: {} years\n\
             Weight: {} kg\n\
             Height: {} cm\n\
             Activity: {}\n\
             Goal: {}\n\
             Additional: {}",
            display_value(self.name.as_ref()),
            display_value(self.age.as_ref()),
            display_value(self.weight.as_ref()),
            display_value(self.height.as_ref()),
            display_value(self.activity.as_ref()),
            display_value(self.goal.as_ref()),
            additional,
        )
    }
}

pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(v: Value) -> ClientProfile {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_weight_accepts_numbers_and_numeric_strings() {
        assert_eq!(profile(json!({"weight": 80})).weight_kg(), Some(80.0));
        assert_eq!(profile(json!({"weight": 72.5})).weight_kg(), Some(72.5));
        assert_eq!(profile(json!({"weight": " 81.2 "})).weight_kg(), Some(81.2));
    }

    #[test]
    fn test_weight_missing_or_invalid() {
        assert_eq!(profile(json!({})).weight_kg(), None);
        assert_eq!(profile(json!({"weight": null})).weight_kg(), None);
        assert_eq!(profile(json!({"weight": "heavy"})).weight_kg(), None);
        assert_eq!(profile(json!({"weight": true})).weight_kg(), None);
        assert_eq!(profile(json!({"weight": "NaN"})).weight_kg(), None);
    }

    #[test]
    fn test_key_fields_null_for_missing() {
        let fields = profile(json!({"name": "A", "weight": 80})).key_fields();
        assert_eq!(
            fields,
            json!({
                "name": "A", "age": null, "weight": 80,
                "height": null, "goal": null, "activity": null
            })
        );
    }

    #[test]
    fn test_key_fields_ignore_additional_info() {
        let a = profile(json!({"name": "A", "additionalInfo": "knee injury"}));
        let b = profile(json!({"name": "A"}));
        assert_eq!(a.key_fields(), b.key_fields());
    }

    #[test]
    fn test_prompt_lists_fields() {
        let p = profile(json!({
            "name": "A", "age": 30, "weight": 80, "height": 180,
            "goal": "lose", "activity": "high"
        }));
        let prompt = p.to_prompt();
        assert!(prompt.contains("Name: A"));
        assert!(prompt.contains("Weight: 80 kg"));
        assert!(prompt.contains("Additional: none"));
    }
}
