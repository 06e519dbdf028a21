//! Substrate - Token Interpolation and Component Markup
//!
//! Resolves `${ path }` and `#{ function:arguments }` tokens in text, and
//! converts a small tag based markup into a tree of [`ComponentNode`]
//! instances.
//!
//! ```
//! use substrate::{Components, Store, Substrate};
//! use serde_json::json;
//!
//! let store = Store::try_from(json!({ "user": { "name": "John" } })).unwrap();
//! assert_eq!(substrate::resolve("Hi ${user.name}", &store).unwrap(), "Hi John");
//!
//! let output = Substrate::new()
//!     .with_variables(store)
//!     .with_components(Components::new().with("Button"), false)
//!     .convert("<Button :label=\"user.name\" />")
//!     .unwrap();
//! assert_eq!(output.as_text(), Some("@{Button:label=John}"));
//! ```
mod component;
pub mod convert;
mod function;
mod log;
mod markup;
mod region;
mod resolve;
mod store;
mod substrate;
mod value;

pub use component::{ComponentNode, Components, IdGenerator, Random, Sequential, TextNode};
pub use function::{invoke, Convention, Function, Functions};
pub use log::{Error, ErrorKind, Pointer, Visual};
pub use region::Region;
pub use resolve::{Config, Resolver, Scope};
pub use store::Store;
pub use substrate::{Markers, Output, Substrate};
pub use value::Value;

/// Resolve the `${ path }` tokens in a template with the given [`Store`].
///
/// Uses the default variable configuration, where misses are errors.
///
/// # Errors
///
/// Returns an [`Error`] if a path cannot be resolved.
///
/// # Examples
///
/// ```
/// use substrate::Store;
///
/// let store = Store::new().with_must("name", "taylor");
/// let result = substrate::resolve("hello, ${ name }!", &store);
///
/// assert_eq!(result.unwrap(), "hello, taylor!");
/// ```
#[inline]
pub fn resolve(template: &str, store: &Store) -> Result<String, Error> {
    Resolver::variables().resolve(template, store)
}
