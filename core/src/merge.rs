//! Recursive overlay of request arguments.

use serde_json::Value;

/// Overlay `overrides` onto `defaults`, descending into nested objects.
///
/// For every key in `overrides`: when both sides hold an object the two are
/// merged recursively, otherwise the override wins. Keys present only in
/// `defaults` survive. A `null` override leaves `defaults` untouched; any
/// other non-object override replaces them wholesale.
pub fn merge_args(overrides: &Value, defaults: &Value) -> Value {
    match (overrides, defaults) {
        (Value::Null, _) => defaults.clone(),
        (Value::Object(over), Value::Object(base)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                let next = match (value, merged.get(key)) {
                    (Value::Object(_), Some(existing @ Value::Object(_))) => {
                        merge_args(value, existing)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overrides.clone(),
    }
}
