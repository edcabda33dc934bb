//! Structured values stored in memory containers.
//!
//! Values are plain `serde_json::Value`s, so copying a container is a
//! structural clone and never loses numeric precision.

pub use serde_json::{Map, Value};

/// The key-value payload of one memory container.
pub type Data = Map<String, Value>;

/// Walk `value` through `parts`: objects by key, arrays by decimal index.
///
/// Returns `None` on a missing key, an out-of-range or non-numeric index,
/// or an attempt to index into a scalar.
pub fn lookup_nested<'a, S: AsRef<str>>(value: &'a Value, parts: &[S]) -> Option<&'a Value> {
    parts.iter().try_fold(value, |current, part| {
        let part = part.as_ref();
        match current {
            Value::Object(map) => map.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Like [`lookup_nested`] but starting from container data.
pub fn lookup_in_data<'a, S: AsRef<str>>(data: &'a Data, parts: &[S]) -> Option<&'a Value> {
    let (first, rest) = parts.split_first()?;
    lookup_nested(data.get(first.as_ref())?, rest)
}

/// Render a value the way it reads in text: strings unquoted, `null` empty,
/// everything else as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Best-effort integer conversion of the textual form of `value`.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    value_to_string(value).trim().parse().ok()
}

/// Best-effort float conversion of the textual form of `value`.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    value_to_string(value).trim().parse().ok()
}
