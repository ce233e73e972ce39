//! Flat ⇄ nested value transform
//!
//! Callers edit composite values through flat `<field>_<subField>` keys;
//! the wire wants nested objects. `unflatten` runs on the write path and is
//! the only place the currency micros conversion happens; `flatten` runs on
//! the read path and converts nothing.

use log::warn;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::fields::catalog::composite_template;
use crate::schema::types::{FieldKind, FieldSchema};

const MICROS_PER_UNIT: i64 = 1_000_000;

/// Convert a caller-supplied flat map into the nested wire shape for the
/// given field set.
///
/// Which fields are composite is decided by the supplied schemas, so the
/// ambiguous `name` field is expanded only for objects whose metadata types
/// it FULL_NAME. A composite field with zero non-empty sub-values is
/// omitted entirely rather than emitted as an empty object. Keys not
/// claimed by any composite field pass through unchanged.
pub fn unflatten(flat: &Map<String, Value>, fields: &[FieldSchema]) -> Map<String, Value> {
    let mut out = Map::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for field in fields.iter().filter(|f| f.kind.is_composite()) {
        let Some(template) = composite_template(&field.kind) else {
            continue;
        };

        let mut nested = Map::new();
        for sub in &template.sub_fields {
            // Only the first segment of a flat key is the parent name, so
            // sub-field names may themselves contain underscores.
            let key = format!("{}_{}", field.name, sub.name);
            let Some(value) = flat.get(&key) else {
                continue;
            };
            claimed.insert(key);
            if is_absent(value) {
                continue;
            }
            nested.insert(sub.name.to_string(), coerce(&field.kind, sub.name, value));
        }

        if !nested.is_empty() {
            out.insert(field.name.clone(), Value::Object(nested));
        }
    }

    for (key, value) in flat {
        if !claimed.contains(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    out
}

/// Convert a nested wire record into the flat presentation shape. No value
/// coercion happens on this path.
pub fn flatten(nested: &Map<String, Value>, fields: &[FieldSchema]) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in nested {
        let is_composite = fields
            .iter()
            .any(|f| f.name == *key && f.kind.is_composite());
        match (is_composite, value) {
            (true, Value::Object(sub_values)) => {
                for (sub_name, sub_value) in sub_values {
                    out.insert(format!("{}_{}", key, sub_name), sub_value.clone());
                }
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

/// Empty string, null (and a JSON-missing value upstream) all mean "absent".
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Sub-field coercion. The caller supplies a human-scale currency amount;
/// the wire stores micros. Applied exactly once, on the write path only.
fn coerce(kind: &FieldKind, sub_name: &str, value: &Value) -> Value {
    if *kind == FieldKind::Currency && sub_name == "amountMicros" {
        match micros_from_amount(value) {
            Some(micros) => return Value::from(micros),
            None => {
                warn!(
                    "currency amount {:?} has no micros representation, passing through",
                    value
                );
                return value.clone();
            }
        }
    }
    value.clone()
}

/// Integer amounts multiply in i64 so large values stay exact; only
/// fractional amounts go through f64. Overflow reports as non-numeric.
fn micros_from_amount(value: &Value) -> Option<i64> {
    let integral = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    if let Some(amount) = integral {
        return amount.checked_mul(MICROS_PER_UNIT);
    }
    let fractional = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    fractional.map(|amount| (amount * MICROS_PER_UNIT as f64).round() as i64)
}
