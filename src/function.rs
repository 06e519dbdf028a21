//! Contains the [`Function`] trait and the [`Functions`] scope that holds them.
//!
//! A function is called from a `#{ name:argument:argument }` token, or from an
//! inline `{{ name(arguments) }}` call in markup. Each function is registered
//! with a [`Convention`] that decides what it receives:
//!
//! - [`Convention::Raw`] functions receive the whole argument text, colons and
//!   all, so they can parse a syntax of their own.
//! - [`Convention::Positional`] functions receive the text split on `:`, with
//!   each piece trimmed and unescaped.
//!
//! # Examples
//!
//! ```
//! use substrate::{Functions, Resolver, Value};
//!
//! let functions = Functions::new()
//!     .with_raw("upper", |text: &str| Ok(Value::from(text.to_uppercase())))
//!     .with_positional("join", |args: &[String]| Ok(Value::from(args.join("-"))));
//!
//! let resolver = Resolver::functions();
//! let result = resolver.resolve("#{upper:a:b} #{join:a:b}", &functions);
//!
//! assert_eq!(result.unwrap(), "A:B a-b");
//! ```
//!
//! An [`Error`] returned by a function is wrapped, so the reason it gives is
//! kept and the name of the function is added to the help text:
//!
//! ```
//! use substrate::{Error, ErrorKind, Functions, Resolver, Value};
//!
//! let functions = Functions::new()
//!     .with_raw("fail", |_: &str| Err::<Value, _>(Error::build("no thanks")));
//!
//! let error = Resolver::functions().resolve("#{fail}", &functions).unwrap_err();
//!
//! assert_eq!(error.kind(), ErrorKind::FunctionExecution);
//! assert_eq!(error.reason(), "function error: no thanks");
//! ```
mod invoke;

pub(crate) use invoke::escape;
pub use invoke::{invoke, invoke_parts};

use crate::{log::Error, resolve::Scope, value::Value};
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
};

/// Describes a type which can be called from a template.
pub trait Function: Sync + Send {
    /// Execute the function with the given arguments and return a new Value.
    ///
    /// What the arguments contain depends on the [`Convention`] the function
    /// was registered with.
    fn call(&self, arguments: &[String]) -> Result<Value, Error>;
}

/// Allows assignment of any closure matching the signature of `call` as a
/// `Function`, instead of requiring a struct be created.
impl<F> Function for F
where
    F: Fn(&[String]) -> Result<Value, Error> + Sync + Send,
{
    fn call(&self, arguments: &[String]) -> Result<Value, Error> {
        self(arguments)
    }
}

/// How a [`Function`] wants its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// One argument holding the whole argument text, or an empty string when
    /// there are no arguments.
    Raw,
    /// One argument per `:` separated piece, or none.
    Positional,
}

struct Entry {
    convention: Convention,
    function: Box<dyn Function>,
}

/// Provides storage for [`Function`] instances, keyed by name.
#[derive(Default)]
pub struct Functions {
    entries: HashMap<String, Entry>,
}

impl Functions {
    /// Create a new empty [`Functions`].
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add a [`Function`] with the given name and [`Convention`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a function with the same name already exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Convention, Error, Functions, Value};
    ///
    /// fn now(_: &[String]) -> Result<Value, Error> {
    ///     Ok(Value::from(1))
    /// }
    ///
    /// let mut functions = Functions::new();
    /// let first = functions.insert("now", Convention::Positional, now);
    /// let again = functions.insert("now", Convention::Positional, now);
    ///
    /// assert!(first.is_ok());
    /// assert!(again.is_err());
    /// ```
    pub fn insert<S, T>(
        &mut self,
        name: S,
        convention: Convention,
        function: T,
    ) -> Result<(), Error>
    where
        S: Into<String>,
        T: Function + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(Error::build(format!(
                "function with name `{name}` already exists, \
                overwrite it with `.insert_must`"
            )));
        }
        self.insert_must(name, convention, function);

        Ok(())
    }

    /// Add a [`Function`] with the given name and [`Convention`].
    ///
    /// Overwrites any function with the same name.
    #[inline]
    pub fn insert_must<S, T>(&mut self, name: S, convention: Convention, function: T)
    where
        S: Into<String>,
        T: Function + 'static,
    {
        self.entries.insert(
            name.into(),
            Entry {
                convention,
                function: Box::new(function),
            },
        );
    }

    /// Add a [`Function`] with the given name and [`Convention`].
    ///
    /// Returns the `Functions`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a function with the same name already exists.
    #[inline]
    pub fn with<S, T>(mut self, name: S, convention: Convention, function: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Function + 'static,
    {
        self.insert(name, convention, function)?;

        Ok(self)
    }

    /// Add a [`Function`] with the given name and [`Convention`], overwriting
    /// any function with the same name.
    ///
    /// Returns the `Functions`, so additional methods may be chained.
    #[inline]
    pub fn with_must<S, T>(mut self, name: S, convention: Convention, function: T) -> Self
    where
        S: Into<String>,
        T: Function + 'static,
    {
        self.insert_must(name, convention, function);

        self
    }

    /// Add a closure that receives the whole argument text.
    ///
    /// Overwrites any function with the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Functions, Resolver, Value};
    ///
    /// let functions = Functions::new().with_raw("csv", |text: &str| {
    ///     Ok(Value::from(text.split(',').count() as i64))
    /// });
    ///
    /// let result = Resolver::functions().resolve("#{csv:a,b,c}", &functions);
    /// assert_eq!(result.unwrap(), "3");
    /// ```
    pub fn with_raw<S, F>(self, name: S, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(&str) -> Result<Value, Error> + Sync + Send + 'static,
    {
        self.with_must(name, Convention::Raw, move |arguments: &[String]| {
            function(arguments.first().map_or("", String::as_str))
        })
    }

    /// Add a closure that receives the split arguments.
    ///
    /// Overwrites any function with the same name.
    #[inline]
    pub fn with_positional<S, F>(self, name: S, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(&[String]) -> Result<Value, Error> + Sync + Send + 'static,
    {
        self.with_must(name, Convention::Positional, function)
    }

    /// Return the [`Convention`] and [`Function`] with the given name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<(Convention, &dyn Function)> {
        self.entries
            .get(name)
            .map(|entry| (entry.convention, entry.function.as_ref()))
    }

    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl Debug for Functions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, entry)| (name, entry.convention)),
            )
            .finish()
    }
}

impl Scope for Functions {
    fn lookup(&self, token: &str) -> Result<Cow<'_, Value>, Error> {
        invoke(self, token).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::{Convention, Functions};
    use crate::{Error, Value};

    #[test]
    fn test_insert_duplicate() {
        let mut functions = Functions::new().with_raw("a", |_: &str| Ok(Value::Null));
        let result = functions.insert("a", Convention::Raw, |_: &[String]| {
            Ok::<_, Error>(Value::Null)
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_insert_must_overwrites() {
        let functions = Functions::new()
            .with_raw("a", |_: &str| Ok(Value::Null))
            .with_positional("a", |_: &[String]| Ok(Value::Null));

        assert!(functions
            .get("a")
            .is_some_and(|(convention, _)| convention == Convention::Positional));
    }

    #[test]
    fn test_raw_receives_empty_text() {
        let functions = Functions::new().with_raw("len", |text: &str| {
            Ok(Value::from(text.len() as u64))
        });
        let (_, function) = functions.get("len").unwrap();

        assert_eq!(function.call(&[]).unwrap(), Value::from(0_u64));
    }

    #[test]
    fn test_struct_function() {
        struct Constant;

        impl super::Function for Constant {
            fn call(&self, _: &[String]) -> Result<Value, Error> {
                Ok(Value::from("constant"))
            }
        }

        let functions = Functions::new().with_must("c", Convention::Positional, Constant);

        assert!(functions.contains_key("c"));
        assert_eq!(format!("{functions:?}"), r#"{"c": Positional}"#);
    }
}
