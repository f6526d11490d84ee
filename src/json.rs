//! JSON → `Data`.
//!
//! Parsing is serde_json's; this module only walks the resulting `Value`.
//!
//! | JSON            | Data                          |
//! |-----------------|-------------------------------|
//! | null, false     | `String("")`                  |
//! | true            | `String("true")`              |
//! | number          | `String` (serde_json Display) |
//! | string          | `String`                      |
//! | object          | `Map`                         |
//! | array           | `Array` (fixed length)        |
use serde_json::{Map, Number, Value};

use crate::backend::Backend;
use crate::data::{Data, Tag};
use crate::error::{Error, Result};

pub fn from_str(text: &str) -> Result<Data> {
    log::debug!("json: ingesting {} bytes", text.len());
    let value: Value = serde_json::from_str(text).map_err(|e| Error::parse(Backend::Json, e))?;
    let data = from_value(&value)?;
    log::debug!("json: root is {}", data.tag());
    Ok(data)
}

/// Convert an already-parsed JSON value.
pub fn from_value(value: &Value) -> Result<Data> {
    let mut data = Data::new();
    build(&mut data, value)?;
    Ok(data)
}

// ------------------------------ Builder ----------------------------------- //

fn build(data: &mut Data, value: &Value) -> Result<()> {
    match value {
        Value::Null | Value::Bool(false) => data.assign(""),
        Value::Bool(true) => data.assign("true"),
        Value::Number(n) => data.assign(number_text(n)),
        Value::String(s) => data.assign(s.as_str()),
        Value::Object(obj) => build_map(data, obj),
        Value::Array(items) => build_array(data, items),
    }
}

fn build_map(data: &mut Data, obj: &Map<String, Value>) -> Result<()> {
    log::trace!("json: object with {} keys", obj.len());
    data.allocate(Tag::Map, obj.len())?;
    for (key, value) in obj {
        let mut child = Data::new();
        build(&mut child, value)?;
        data.insert(key.as_str(), child)?;
    }
    Ok(())
}

fn build_array(data: &mut Data, items: &[Value]) -> Result<()> {
    log::trace!("json: array of {}", items.len());
    data.allocate(Tag::Array, items.len())?;
    let slots = data
        .array_mut()
        .ok_or(Error::TagMismatch { expected: Tag::Array, found: Tag::None })?;
    for (slot, item) in slots.iter_mut().zip(items) {
        build(slot, item)?;
    }
    Ok(())
}

/// Integers print as plain decimal, floats in shortest round-trip form with a
/// signed exponent when one is needed (`1.5`, `2.0`, `1e+100`).
fn number_text(n: &Number) -> String {
    n.to_string()
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(text: &str) -> Data {
        Data::from(text)
    }

    #[test]
    fn falsy_values_collapse_to_empty_string() {
        let null = from_str("null").unwrap();
        let f = from_str("false").unwrap();
        let empty = from_str(r#""""#).unwrap();
        assert_eq!(null, s(""));
        assert_eq!(null, f);
        assert_eq!(f, empty);
        assert!(null.is_empty());
        assert_eq!(from_str("true").unwrap(), s("true"));
    }

    #[test]
    fn empty_containers() {
        let obj = from_str("{}").unwrap();
        assert_eq!(obj.tag(), Tag::Map);
        assert_eq!(obj.len(), 0);
        assert!(obj.is_empty());

        let arr = from_str("[]").unwrap();
        assert_eq!(arr.tag(), Tag::Array);
        assert_eq!(arr.len(), 0);
        assert!(arr.is_empty());
    }

    #[test]
    fn nested_document() {
        let d = from_str(r#"{"a": 1, "b": [true, false, null]}"#).unwrap();
        assert_eq!(d.tag(), Tag::Map);
        assert_eq!(d.get("a"), Some(&s("1")));

        let b = d.get("b").unwrap();
        assert_eq!(b.tag(), Tag::Array);
        assert_eq!(b.as_array().unwrap(), &[s("true"), s(""), s("")]);
        assert!(!d.contains_none());
    }

    #[test]
    fn map_with_empty_child_is_not_empty() {
        let d = from_str(r#"{"x": ""}"#).unwrap();
        assert!(!d.is_empty());
        assert!(d.get("x").unwrap().is_empty());
    }

    #[test]
    fn number_rendering() {
        let d = from_value(&json!([0, -7, 1.5, 2.0, 12345678901234u64, 1e100])).unwrap();
        let texts: Vec<_> = d.children().filter_map(Data::as_str).collect();
        assert_eq!(texts, ["0", "-7", "1.5", "2.0", "12345678901234", "1e+100"]);
    }

    #[test]
    fn strings_kept_verbatim() {
        let d = from_str(r#"["false", "0", " ", "héllo"]"#).unwrap();
        let texts: Vec<_> = d.children().filter_map(Data::as_str).collect();
        assert_eq!(texts, ["false", "0", " ", "héllo"]);
        assert!(!d.index(0).unwrap().is_empty());
    }

    #[test]
    fn object_order_follows_document() {
        let d = from_str(r#"{"z": "1", "a": "2", "m": "3"}"#).unwrap();
        let keys: Vec<_> = d.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let d = from_str(r#"{"k": "first", "k": "second"}"#).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("k"), Some(&s("second")));
    }

    #[test]
    fn deep_nesting_has_no_none() {
        let d = from_value(&json!({"a": [{"b": [[], {}, [null]]}]})).unwrap();
        assert!(!d.contains_none());
        let inner = d.get("a").unwrap().index(0).unwrap().get("b").unwrap();
        assert_eq!(inner.index(2).unwrap().index(0), Some(&s("")));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for bad in [r#"{"a":"#, "", "[1,]", "{'a': 1}", "tru"] {
            match from_str(bad) {
                Err(Error::Parse { backend: Backend::Json, .. }) => {}
                other => panic!("expected parse error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn entry_point_matches_module() {
        assert_eq!(Data::from_json("[1]").unwrap(), from_str("[1]").unwrap());
    }
}
