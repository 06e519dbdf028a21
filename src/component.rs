mod id;

pub use id::{IdGenerator, Random, Sequential};

use crate::log::{error_unregistered_component, Error};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Name given to every synthetic text child.
pub const TEXT: &str = "Text";

/// The registry of component names that markup may use.
///
/// Tags are checked against it before anything else about them is
/// evaluated, whatever the warning policy.
///
/// # Examples
///
/// ```
/// use substrate::Components;
///
/// let components = Components::new()
///     .with("Button")
///     .with_flag("Legacy", false);
///
/// assert!(components.is_registered("Button"));
/// assert!(!components.is_registered("Legacy"));
/// assert!(components.validate("Legacy").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Components {
    flags: HashMap<String, bool>,
}

impl Components {
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: HashMap::new(),
        }
    }

    /// Set the flag of a component name. Only names flagged `true` may be used.
    #[inline]
    pub fn insert<S>(&mut self, name: S, registered: bool)
    where
        S: Into<String>,
    {
        self.flags.insert(name.into(), registered);
    }

    /// Register a component name.
    ///
    /// Returns the `Components`, so additional methods may be chained.
    #[inline]
    pub fn with<S>(self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.with_flag(name, true)
    }

    /// Set the flag of a component name.
    ///
    /// Returns the `Components`, so additional methods may be chained.
    #[inline]
    pub fn with_flag<S>(mut self, name: S, registered: bool) -> Self
    where
        S: Into<String>,
    {
        self.insert(name, registered);

        self
    }

    /// Return true if the name is flagged `true`.
    #[inline]
    pub fn is_registered(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Check a raw tag name against the registry.
    ///
    /// Characters that are not alphanumeric are removed before the check, so
    /// `my-card` must be registered as `mycard`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the cleaned name is not registered.
    pub fn validate(&self, name: &str) -> Result<(), Error> {
        let cleaned: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
        if self.is_registered(&cleaned) {
            return Ok(());
        }

        Err(error_unregistered_component(name))
    }
}

/// One markup element in the produced tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentNode {
    pub id: String,
    pub name: String,
    pub props: BTreeMap<String, String>,
    /// The resolved body of the element, if it had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<TextNode>,
}

/// The synthetic child that holds the body of a [`ComponentNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub id: String,
    /// Always [`TEXT`].
    pub name: String,
    /// Always empty.
    pub props: BTreeMap<String, String>,
    pub body: String,
}

impl TextNode {
    /// Create a new [`TextNode`] holding the given body.
    pub fn new(id: String, body: String) -> Self {
        Self {
            id,
            name: TEXT.to_string(),
            props: BTreeMap::new(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentNode, Components, TextNode};
    use crate::ErrorKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_validate_strips_punctuation() {
        let components = Components::new().with("mycard");

        assert!(components.validate("my-card").is_ok());
        assert!(components.validate("my_card").is_ok());
    }

    #[test]
    fn test_validate_unregistered() {
        let error = Components::new().validate("Ghost").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnregisteredComponent);
        assert_eq!(error.reason(), "unregistered component `Ghost`");
    }

    #[test]
    fn test_serialize() {
        let node = ComponentNode {
            id: "node-1".to_string(),
            name: "Card".to_string(),
            props: BTreeMap::from([("title".to_string(), "Hi".to_string())]),
            children: Some(TextNode::new("node-2".to_string(), "body".to_string())),
        };
        let bare = ComponentNode {
            children: None,
            ..node.clone()
        };

        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"id":"node-1","name":"Card","props":{"title":"Hi"},"children":{"id":"node-2","name":"Text","props":{},"body":"body"}}"#
        );
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"{"id":"node-1","name":"Card","props":{"title":"Hi"}}"#
        );
    }
}
