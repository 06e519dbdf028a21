pub(crate) mod path;
mod syntax;

pub use syntax::Config;

use crate::{
    convert::{stringify, UNDEFINED},
    log::{error_invalid_path, error_missing_scope, Error},
    region::Region,
    value::Value,
};
use std::borrow::Cow;
use syntax::Grammar;
use tracing::trace;

/// A read only source of values that tokens are looked up in.
///
/// Implemented by [`Store`][`crate::Store`], which treats tokens as paths,
/// and [`Functions`][`crate::Functions`], which treats tokens as calls.
pub trait Scope {
    /// Return the [`Value`] that the token refers to.
    ///
    /// # Errors
    ///
    /// Misses are reported with a kind where
    /// [`ErrorKind::is_miss`][`crate::ErrorKind::is_miss`] is true, so the
    /// [`Resolver`] can apply its warning policy.
    fn lookup(&self, token: &str) -> Result<Cow<'_, Value>, Error>;
}

/// Replaces delimited tokens in text with values from a [`Scope`].
///
/// A `Resolver` is compiled once from a [`Config`] and never changes after,
/// so it may be shared freely.
///
/// # Examples
///
/// ```
/// use substrate::{Config, Resolver, Store};
///
/// let resolver = Resolver::new(Config::new().with_delimiters("{{", "}}")).unwrap();
/// let store = Store::new().with_must("name", "taylor");
///
/// assert_eq!(resolver.resolve("hi {{ name }}", &store).unwrap(), "hi taylor");
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Config,
    grammar: Grammar,
}

impl Resolver {
    /// Compile a new [`Resolver`] from the given [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a delimiter is empty or the grammar is not a
    /// valid regular expression.
    pub fn new(config: Config) -> Result<Self, Error> {
        let grammar = Grammar::new(&config)?;

        Ok(Self { config, grammar })
    }

    /// Create a new [`Resolver`] for `${ path }` tokens.
    pub fn variables() -> Self {
        Self::new(Config::new()).expect("default variable grammar should compile")
    }

    /// Create a new [`Resolver`] for `#{ name:arguments }` tokens.
    pub fn functions() -> Self {
        Self::new(Config::functions()).expect("default function grammar should compile")
    }

    /// Return the [`Config`] this `Resolver` was compiled from.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change the warning policy.
    ///
    /// The grammar does not depend on the policy, so nothing is recompiled.
    #[inline]
    pub fn with_warn(mut self, warn: bool) -> Self {
        self.config.set_warn(warn);

        self
    }

    /// Return true if the text contains at least one delimited token.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.grammar.is_match(text)
    }

    /// Resolve every token in the template against the [`Scope`].
    ///
    /// Text outside of tokens is copied as is, and tokens that do not match
    /// the grammar are copied with their delimiters. Substituted values are
    /// never scanned again.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] pointing at the first token that fails. Misses
    /// only fail when warnings are enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Config, Resolver, Store};
    /// use serde_json::json;
    ///
    /// let store = Store::try_from(json!({ "user": { "tags": ["a", "b"] } })).unwrap();
    /// let resolver = Resolver::variables();
    /// assert_eq!(resolver.resolve("${user.tags}", &store).unwrap(), "a,b");
    ///
    /// let quiet = Resolver::new(Config::new().with_warn(false)).unwrap();
    /// assert_eq!(quiet.resolve("${user.none}", &store).unwrap(), "undefined");
    /// ```
    pub fn resolve<S>(&self, template: &str, scope: &S) -> Result<String, Error>
    where
        S: Scope + ?Sized,
    {
        self.resolve_region(template, Region::new(0..template.len()), scope)
    }

    /// Resolve every token within one [`Region`] of a larger source.
    ///
    /// Errors point into the whole source rather than the region.
    pub(crate) fn resolve_region<S>(
        &self,
        source: &str,
        region: Region,
        scope: &S,
    ) -> Result<String, Error>
    where
        S: Scope + ?Sized,
    {
        self.scan(
            source,
            region,
            |token, at| {
                self.substitute(&source[token], scope)
                    .map_err(|e| e.or_pointer(source, at))
            },
            copy,
        )
    }

    /// Resolve every token in the template against an optional [`Scope`].
    ///
    /// A missing scope behaves like an empty one when warnings are disabled.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the scope is missing and warnings are
    /// enabled, otherwise as [`Resolver::resolve`].
    pub fn resolve_optional<S>(&self, template: &str, scope: Option<&S>) -> Result<String, Error>
    where
        S: Scope + ?Sized,
    {
        match scope {
            Some(scope) => self.resolve(template, scope),
            None if self.config.warn() => Err(error_missing_scope()),
            None => self.scan(
                template,
                Region::new(0..template.len()),
                |_, _| Ok(UNDEFINED.to_string()),
                copy,
            ),
        }
    }

    /// Resolve a single token, given without delimiters.
    ///
    /// # Errors
    ///
    /// A token that does not match the grammar is an
    /// [`ErrorKind::InvalidPath`][`crate::ErrorKind::InvalidPath`] miss.
    pub fn resolve_token<S>(&self, token: &str, scope: &S) -> Result<String, Error>
    where
        S: Scope + ?Sized,
    {
        let token = token.trim();
        if !self.grammar.validate(token) {
            let error = error_invalid_path(token, token, "token does not match the grammar");
            return self.degrade(token, error);
        }

        self.substitute(token, scope)
    }

    /// Look up a validated token and convert the result to text, applying
    /// the warning policy to misses.
    pub(crate) fn substitute<S>(&self, token: &str, scope: &S) -> Result<String, Error>
    where
        S: Scope + ?Sized,
    {
        self.render(token, scope.lookup(token))
    }

    /// Convert the result of a lookup to text, applying the warning policy
    /// to misses.
    pub(crate) fn render(
        &self,
        token: &str,
        result: Result<Cow<'_, Value>, Error>,
    ) -> Result<String, Error> {
        match result {
            Ok(value) => {
                trace!(token, "resolved token");
                Ok(stringify(&value, self.config.convert_types()))
            }
            Err(error) => self.degrade(token, error),
        }
    }

    /// Walk one [`Region`] of the source once, passing each valid token and
    /// each stretch of text between tokens to the given closures, and join
    /// their output.
    ///
    /// Every `Region` given to the closures is measured from the start of
    /// the source. Tokens are given as the `Region` of the trimmed token and
    /// of the whole match.
    pub(crate) fn scan<T, P>(
        &self,
        source: &str,
        region: Region,
        mut on_token: T,
        mut on_text: P,
    ) -> Result<String, Error>
    where
        T: FnMut(Region, Region) -> Result<String, Error>,
        P: FnMut(&str, Region, &mut String) -> Result<(), Error>,
    {
        let template = &source[region];
        let mut buffer = String::with_capacity(template.len());
        let mut cursor = region.begin;

        for (token, at) in self.grammar.matches(template) {
            let (token, at) = (token.offset(region.begin), at.offset(region.begin));
            let between = Region::new(cursor..at.begin);
            on_text(&source[between], between, &mut buffer)?;

            let text = &source[token];
            if self.grammar.validate(text) {
                buffer.push_str(&on_token(token, at)?);
            } else {
                trace!(token = text, "token does not match grammar, copied as is");
                buffer.push_str(&source[at]);
            }
            cursor = at.end;
        }
        let rest = Region::new(cursor..region.end);
        on_text(&source[rest], rest, &mut buffer)?;

        Ok(buffer)
    }

    fn degrade(&self, token: &str, error: Error) -> Result<String, Error> {
        if error.kind().is_miss() && !self.config.warn() {
            trace!(
                token,
                reason = error.reason(),
                "miss replaced with undefined"
            );
            return Ok(UNDEFINED.to_string());
        }

        Err(error)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::variables()
    }
}

/// Copy text between tokens as is.
#[inline]
fn copy(text: &str, _: Region, buffer: &mut String) -> Result<(), Error> {
    buffer.push_str(text);

    Ok(())
}
