use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{ser::SerializeMap, ser::SerializeSeq, Serialize, Serializer};
use serde_json::Number;
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};

/// Text used for objects that have no better string form.
pub(crate) const OBJECT_FALLBACK: &str = "[object Object]";

/// Write a number, with integral floats like `10.0` written as `10`.
pub(crate) fn write_number<W>(buffer: &mut W, number: &Number) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            write!(buffer, "{}", float as i64)
        }
        _ => write!(buffer, "{number}"),
    }
}

/// Data bound in a [`Store`][`crate::Store`] or returned by a
/// [`Function`][`crate::Function`].
///
/// # Examples
///
/// ```
/// use substrate::Value;
/// use serde_json::json;
///
/// let value = Value::from(json!({ "name": "taylor", "tags": ["a", "b"] }));
/// assert!(value.get("name").is_some());
/// ```
#[derive(Clone)]
pub enum Value {
    /// An explicit null. Renders as `"null"`.
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A point in time. Renders as its calendar date.
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// Anything with its own string form.
    Custom(Arc<dyn Display + Send + Sync>),
}

impl Value {
    /// Create a [`Value::Custom`] from anything that implements [`Display`].
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{convert, Value};
    ///
    /// struct Money(u32);
    ///
    /// impl std::fmt::Display for Money {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         write!(f, "${}.00", self.0)
    ///     }
    /// }
    ///
    /// assert_eq!(convert::canonicalize(&Value::custom(Money(5))), "$5.00");
    /// ```
    pub fn custom<T>(value: T) -> Self
    where
        T: Display + Send + Sync + 'static,
    {
        Value::Custom(Arc::new(value))
    }

    /// Return the value of the given key if this is an object.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// Return the value at the given index if this is an array.
    #[inline]
    pub fn index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(array) => array.get(index),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Return the inner string if this is a [`Value::String`].
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(string),
            _ => None,
        }
    }

    /// Return the name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Custom(_) => "custom",
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(bool) => f.debug_tuple("Bool").field(bool).finish(),
            Value::Number(number) => f.debug_tuple("Number").field(number).finish(),
            Value::String(string) => f.debug_tuple("String").field(string).finish(),
            Value::Date(date) => f.debug_tuple("Date").field(date).finish(),
            Value::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Value::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Value::Custom(custom) => f.debug_tuple("Custom").field(&custom.to_string()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// The plain string form, used when type conversion is disabled.
///
/// Unlike [`canonicalize`][`crate::convert::canonicalize`] this keeps the full
/// timestamp of a date and does not serialize objects.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(bool) => write!(f, "{bool}"),
            Value::Number(number) => write_number(f, number),
            Value::String(string) => write!(f, "{string}"),
            Value::Date(date) => write!(f, "{}", date.to_rfc3339()),
            Value::Array(array) => {
                let mut iter = array.iter();
                if let Some(item) = iter.next() {
                    write!(f, "{item}")?;
                    for item in iter {
                        write!(f, ",{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "{OBJECT_FALLBACK}"),
            Value::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(bool) => serializer.serialize_bool(*bool),
            Value::Number(number) => number.serialize(serializer),
            Value::String(string) => serializer.serialize_str(string),
            Value::Date(date) => serializer.serialize_str(&date.to_rfc3339()),
            Value::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for item in array {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Custom(custom) => serializer.collect_str(custom),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(bool) => Value::Bool(bool),
            serde_json::Value::Number(number) => Value::Number(number),
            serde_json::Value::String(string) => Value::String(string),
            serde_json::Value::Array(array) => {
                Value::Array(array.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value.and_time(NaiveTime::default()).and_utc())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
