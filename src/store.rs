use crate::{
    log::{Error, ErrorKind},
    resolve::{path, Scope},
    value::Value,
};
use serde::Serialize;
use serde_json::to_value;
use std::{borrow::Cow, collections::HashMap};

/// Provides storage for the variables that templates are resolved with.
///
/// A `Store` is only ever read while resolving.
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Serialize the value and insert it into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("name", "taylor");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let serialized = to_value(&value).map_err(|e| {
            Error::new(
                ErrorKind::Configuration,
                format!("value for `{key}` is unserializable"),
            )
            .with_help(e.to_string())
        })?;
        self.data.insert(key, serialized.into());

        Ok(())
    }

    /// Serialize the value and insert it into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let mut store = Store::new();
    /// store.insert_must("name", "taylor");
    /// ```
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data
            .insert(key.into(), to_value(value).unwrap().into());
    }

    /// Insert a [`Value`] into the [`Store`] without serializing it.
    ///
    /// Use this for dates and [`Value::Custom`] values, which have no
    /// serialized form.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Store, Value};
    ///
    /// let mut store = Store::new();
    /// store.insert_value("price", Value::custom("$5.00"));
    /// ```
    #[inline]
    pub fn insert_value<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.data.insert(key.into(), value.into());
    }

    /// Serialize the value and insert it into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let store = Store::new().with("name", "taylor");
    ///
    /// assert!(store.is_ok());
    /// ```
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Serialize the value and insert it into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let store = Store::new().with_must("name", "taylor");
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Insert a [`Value`] into the [`Store`] without serializing it.
    ///
    /// Returns the `Store`, so additional methods may be chained.
    #[inline]
    pub fn with_value<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.insert_value(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    ///
    /// The key is used as is, it is not treated as a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Store;
    ///
    /// let store = Store::new().with_must("name", "taylor");
    /// let result = store.get("name");
    ///
    /// assert_eq!(result.and_then(|v| v.as_str()), Some("taylor"))
    /// ```
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

/// Create a [`Store`] from a JSON object, one entry per top level key.
///
/// # Examples
///
/// ```
/// use substrate::Store;
/// use serde_json::json;
///
/// let store = Store::try_from(json!({ "user": { "name": "John" } }));
/// assert!(store.is_ok());
///
/// let store = Store::try_from(json!([1, 2, 3]));
/// assert!(store.is_err());
/// ```
impl TryFrom<serde_json::Value> for Store {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(object) => Ok(Self {
                data: object
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            }),
            other => Err(Error::new(ErrorKind::Configuration, "variables must be an object")
                .with_help(format!("received `{other}`"))),
        }
    }
}

impl Scope for Store {
    fn lookup(&self, token: &str) -> Result<Cow<'_, Value>, Error> {
        path::resolve(self, token).map(Cow::Borrowed)
    }
}
