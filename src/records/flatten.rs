use serde_json::{Map, Value};

pub const KEY_SEPARATOR: char = '.';

/// Flatten nested objects depth-first into dotted keys.
///
/// Only non-empty objects are descended into; arrays, scalars and `{}` are
/// kept as leaf values. Key order follows the source document.
pub fn flatten_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, record: &Map<String, Value>) {
    for (key, value) in record {
        let full_key = match prefix {
            Some(p) => format!("{p}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(out, Some(&full_key), nested);
            }
            leaf => {
                out.insert(full_key, leaf.clone());
            }
        }
    }
}

/// Render one flattened value as a CSV cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
