//! Canonical string forms for [`Value`] instances.
//!
//! Every substituted value passes through here, whether it came from a path
//! lookup or a function call, so the same value always renders the same way.
use crate::value::{write_number, Value, OBJECT_FALLBACK};
use std::fmt::{Result, Write};

/// Text substituted for a miss when warnings are disabled.
pub const UNDEFINED: &str = "undefined";

/// Return the canonical string form of the given [`Value`].
///
/// Rules, in order:
///
/// - null becomes `"null"`
/// - a date becomes its calendar date, like `2024-01-01`
/// - booleans and numbers become their literal form, with integral floats
///   written without a fraction
/// - arrays become their converted items joined by `,`
/// - custom values use their own [`Display`][`std::fmt::Display`]
/// - objects are serialized as JSON, or become `"[object Object]"` when
///   serialization fails
///
/// # Examples
///
/// ```
/// use substrate::{convert::canonicalize, Value};
/// use serde_json::json;
///
/// assert_eq!(canonicalize(&Value::from(json!([1, [2, 3], "x"]))), "1,2,3,x");
/// assert_eq!(canonicalize(&Value::from(json!({ "a": true }))), r#"{"a":true}"#);
/// ```
pub fn canonicalize(value: &Value) -> String {
    let mut buffer = String::new();
    Pipe::new(&mut buffer)
        .write_value(value)
        .expect("writing to a string should not fail");

    buffer
}

/// Return the string form of the given [`Value`], canonicalized when
/// `convert_types` is true and plainly displayed otherwise.
#[inline]
pub fn stringify(value: &Value, convert_types: bool) -> String {
    if convert_types {
        canonicalize(value)
    } else {
        value.to_string()
    }
}

/// Wraps some underlying buffer and writes [`Value`] instances to it in
/// their canonical form.
struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Null => self.buffer.write_str("null"),
            Value::Date(date) => write!(self.buffer, "{}", date.format("%Y-%m-%d")),
            Value::Bool(bool) => write!(self.buffer, "{bool}"),
            Value::Number(number) => write_number(&mut *self.buffer, number),
            Value::String(string) => self.buffer.write_str(string),
            Value::Array(array) => self.write_array(array),
            Value::Custom(custom) => write!(self.buffer, "{custom}"),
            Value::Object(_) => self.write_object(value),
        }
    }

    /// Write the items of an array separated by commas, without brackets.
    fn write_array(&mut self, array: &[Value]) -> Result {
        let mut iter = array.iter();
        if let Some(item) = iter.next() {
            self.write_value(item)?;
            for item in iter {
                self.buffer.write_char(',')?;
                self.write_value(item)?;
            }
        }

        Ok(())
    }

    /// Write an object as JSON.
    fn write_object(&mut self, object: &Value) -> Result {
        match serde_json::to_string(object) {
            Ok(json) => self.buffer.write_str(&json),
            Err(_) => self.buffer.write_str(OBJECT_FALLBACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize, stringify};
    use crate::Value;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert_eq!(canonicalize(&Value::Null), "null");
        assert_eq!(canonicalize(&Value::from(true)), "true");
        assert_eq!(canonicalize(&Value::from(false)), "false");
        assert_eq!(canonicalize(&Value::from(42)), "42");
        assert_eq!(canonicalize(&Value::from(0)), "0");
        assert_eq!(canonicalize(&Value::from(1.5)), "1.5");
        assert_eq!(canonicalize(&Value::from(10.0)), "10");
        assert_eq!(canonicalize(&Value::from(json!(-3.0))), "-3");
        assert_eq!(canonicalize(&Value::from("text")), "text");
    }

    #[test]
    fn test_dates() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 18, 30, 0).unwrap();

        assert_eq!(canonicalize(&Value::from(date)), "2024-01-01");
        assert_eq!(
            canonicalize(&Value::from(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())),
            "1999-12-31"
        );
    }

    #[test]
    fn test_arrays() {
        assert_eq!(canonicalize(&Value::from(vec![1, 2, 3])), "1,2,3");
        assert_eq!(canonicalize(&Value::from(json!([]))), "");
        assert_eq!(
            canonicalize(&Value::from(json!([[1, 2], [3, 4]]))),
            "1,2,3,4"
        );
        assert_eq!(
            canonicalize(&Value::from(json!([{ "a": 1 }, null]))),
            r#"{"a":1},null"#
        );
    }

    #[test]
    fn test_objects() {
        let value = Value::from(json!({ "name": "John", "roles": ["admin"] }));

        assert_eq!(canonicalize(&value), r#"{"name":"John","roles":["admin"]}"#);
    }

    #[test]
    fn test_custom() {
        assert_eq!(canonicalize(&Value::custom("custom")), "custom");
    }

    #[test]
    fn test_stringify_without_conversion() {
        let value = Value::from(json!({ "a": 1 }));

        assert_eq!(stringify(&value, false), "[object Object]");
        assert_eq!(stringify(&Value::from(42), false), "42");
        assert_eq!(stringify(&Value::from(vec![1, 2]), false), "1,2");
        assert_eq!(stringify(&value, true), r#"{"a":1}"#);
    }
}
