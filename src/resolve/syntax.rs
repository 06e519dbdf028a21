use crate::{
    log::{error_grammar, Error, ErrorKind},
    region::Region,
};
use regex::{Regex, RegexBuilder};

/// Default beginning of a variable token.
pub const VARIABLE_START: &str = "${";
/// Default ending of a variable token.
pub const VARIABLE_END: &str = "}";
/// Default beginning of a function token.
pub const FUNCTION_START: &str = "#{";
/// Default ending of a function token.
pub const FUNCTION_END: &str = "}";

/// Default variable grammar.
///
/// A name made of alphanumerics, `_` or `$`, optionally prefixed by `@` or `#`
/// or wrapped in `{}`, followed by any number of `.name` and `[index]` parts.
pub const VARIABLE_PATH: &str = r"(?:\{[a-z0-9_$@#]*\}|[a-z0-9_$@#])[a-z0-9_$@#.\[\]]*";

/// Default function grammar.
///
/// A name followed by anything up to the first unescaped end marker, which
/// keeps `:` separated argument lists whole. Variable tokens inside the
/// arguments are kept whole too.
pub const FUNCTION_PATH: &str = r"[a-z0-9_$](?:\\.|\$\{[^}]*\}|[^\\])*?";

/// Describes how a [`Resolver`][`crate::Resolver`] finds tokens in text.
///
/// Markers and grammar that are never set fall back to defaults chosen by the
/// mode, so switching modes after setting custom markers keeps those markers.
///
/// # Examples
///
/// ```
/// use substrate::Config;
///
/// let config = Config::new()
///     .with_delimiters("<<", ">>")
///     .with_warn(false);
///
/// assert_eq!(config.start(), "<<");
/// assert_eq!(Config::functions().start(), "#{");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    start: Option<String>,
    end: Option<String>,
    path: Option<String>,
    warn: bool,
    functions: bool,
    convert_types: bool,
}

impl Config {
    /// Create a new [`Config`] for variable tokens.
    ///
    /// ```text
    /// Tokens: ${ user.name }
    /// Warn: true
    /// Convert types: true
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            start: None,
            end: None,
            path: None,
            warn: true,
            functions: false,
            convert_types: true,
        }
    }

    /// Create a new [`Config`] for function tokens.
    ///
    /// ```text
    /// Tokens: #{ name:argument:argument }
    /// Warn: true
    /// Convert types: true
    /// ```
    #[inline]
    pub fn functions() -> Self {
        Self::new().with_functions(true)
    }

    /// Set the token markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Config;
    ///
    /// let mut config = Config::new();
    /// config.set_delimiters("(*", "*)");
    /// ```
    #[inline]
    pub fn set_delimiters<T>(&mut self, start: T, end: T)
    where
        T: Into<String>,
    {
        self.start = Some(start.into());
        self.end = Some(end.into());
    }

    /// Set the token markers.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    #[inline]
    pub fn with_delimiters<T>(mut self, start: T, end: T) -> Self
    where
        T: Into<String>,
    {
        self.set_delimiters(start, end);

        self
    }

    /// Set the grammar that a token must match, as a regular expression.
    ///
    /// The grammar is matched case insensitively and must match the whole
    /// token.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Config;
    ///
    /// let mut config = Config::new();
    /// config.set_path("[A-Z_][A-Z0-9_]*");
    /// ```
    #[inline]
    pub fn set_path<T>(&mut self, path: T)
    where
        T: Into<String>,
    {
        self.path = Some(path.into());
    }

    /// Set the grammar that a token must match, as a regular expression.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    #[inline]
    pub fn with_path<T>(mut self, path: T) -> Self
    where
        T: Into<String>,
    {
        self.set_path(path);

        self
    }

    /// Set the warning policy.
    ///
    /// When true, a miss fails the whole resolve call. When false, a miss
    /// is replaced with `"undefined"`.
    #[inline]
    pub fn set_warn(&mut self, warn: bool) {
        self.warn = warn;
    }

    /// Set the warning policy.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    #[inline]
    pub fn with_warn(mut self, warn: bool) -> Self {
        self.set_warn(warn);

        self
    }

    /// Set function mode, which changes the default markers and grammar.
    #[inline]
    pub fn set_functions(&mut self, functions: bool) {
        self.functions = functions;
    }

    /// Set function mode.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    #[inline]
    pub fn with_functions(mut self, functions: bool) -> Self {
        self.set_functions(functions);

        self
    }

    /// Set whether values are canonicalized before substitution.
    ///
    /// See [`canonicalize`][`crate::convert::canonicalize`].
    #[inline]
    pub fn set_convert_types(&mut self, convert_types: bool) {
        self.convert_types = convert_types;
    }

    /// Set whether values are canonicalized before substitution.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    #[inline]
    pub fn with_convert_types(mut self, convert_types: bool) -> Self {
        self.set_convert_types(convert_types);

        self
    }

    /// Return the beginning marker.
    pub fn start(&self) -> &str {
        match (&self.start, self.functions) {
            (Some(start), _) => start,
            (None, true) => FUNCTION_START,
            (None, false) => VARIABLE_START,
        }
    }

    /// Return the ending marker.
    pub fn end(&self) -> &str {
        match (&self.end, self.functions) {
            (Some(end), _) => end,
            (None, true) => FUNCTION_END,
            (None, false) => VARIABLE_END,
        }
    }

    /// Return the token grammar.
    pub fn path(&self) -> &str {
        match (&self.path, self.functions) {
            (Some(path), _) => path,
            (None, true) => FUNCTION_PATH,
            (None, false) => VARIABLE_PATH,
        }
    }

    #[inline]
    pub fn warn(&self) -> bool {
        self.warn
    }

    #[inline]
    pub fn is_functions(&self) -> bool {
        self.functions
    }

    #[inline]
    pub fn convert_types(&self) -> bool {
        self.convert_types
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled [`Config`].
///
/// Holds one expression that finds delimited tokens and another that checks
/// a captured token against the whole grammar.
#[derive(Debug, Clone)]
pub(crate) struct Grammar {
    matcher: Regex,
    validator: Regex,
}

impl Grammar {
    /// Compile the markers and grammar of the given [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a marker is empty or the grammar is not a
    /// valid regular expression.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let (start, end, path) = (config.start(), config.end(), config.path());
        if start.is_empty() || end.is_empty() {
            return Err(Error::new(ErrorKind::Configuration, "empty delimiter")
                .with_help("both the start and end delimiters must contain text"));
        }

        let pattern = format!(
            r"{}\s*(?P<token>{path})\s*{}",
            regex::escape(start),
            regex::escape(end)
        );
        let anchored = format!(r"^(?:{path})$");

        Ok(Self {
            matcher: compile(&pattern, path)?,
            validator: compile(&anchored, path)?,
        })
    }

    /// Return every match in the text as the [`Region`] of the trimmed
    /// token and the `Region` of the whole match, delimiters included.
    pub fn matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (Region, Region)> + 't {
        self.matcher.captures_iter(text).map(|captures| {
            let whole = captures.get(0).expect("group zero always participates");
            let token = captures.name("token").map_or(whole.end()..whole.end(), |token| {
                let inner = token.as_str();
                let begin = token.start() + (inner.len() - inner.trim_start().len());

                begin..begin + inner.trim().len()
            });

            (token.into(), whole.range().into())
        })
    }

    /// Return true if the whole token matches the grammar.
    #[inline]
    pub fn validate(&self, token: &str) -> bool {
        !token.is_empty() && self.validator.is_match(token)
    }

    /// Return true if the text contains at least one delimited token.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

fn compile(pattern: &str, path: &str) -> Result<Regex, Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| error_grammar(path, e))
}

#[cfg(test)]
mod tests {
    use super::{Config, Grammar, FUNCTION_PATH, VARIABLE_PATH};
    use crate::ErrorKind;

    #[test]
    fn test_defaults_follow_mode() {
        let config = Config::new();
        assert_eq!((config.start(), config.end()), ("${", "}"));
        assert_eq!(config.path(), VARIABLE_PATH);

        let config = Config::functions();
        assert_eq!((config.start(), config.end()), ("#{", "}"));
        assert_eq!(config.path(), FUNCTION_PATH);
        assert!(config.warn() && config.convert_types());
    }

    #[test]
    fn test_custom_markers_survive_mode_change() {
        let config = Config::new()
            .with_delimiters("<<", ">>")
            .with_functions(true);

        assert_eq!((config.start(), config.end()), ("<<", ">>"));
        assert_eq!(config.path(), FUNCTION_PATH);
    }

    #[test]
    fn test_variable_matches() {
        let grammar = Grammar::new(&Config::new()).unwrap();
        let text = "a ${ user.name } b ${x}${y} ${}";
        let found: Vec<_> = grammar
            .matches(text)
            .map(|(token, region)| (&text[token], region.begin, region.end))
            .collect();

        assert_eq!(
            found,
            vec![("user.name", 2, 16), ("x", 19, 23), ("y", 23, 27)]
        );
    }

    #[test]
    fn test_variable_special_prefixes() {
        let grammar = Grammar::new(&Config::new()).unwrap();
        let text = "${@user} ${#tag} ${{key}} ${items[0].name}";
        let tokens: Vec<_> = grammar
            .matches(text)
            .map(|(token, _)| &text[token])
            .collect();

        assert_eq!(tokens, vec!["@user", "#tag", "{key}", "items[0].name"]);
    }

    #[test]
    fn test_variable_rejects_leading_period() {
        let grammar = Grammar::new(&Config::new()).unwrap();

        assert_eq!(grammar.matches("${.a.b}").count(), 0);
        assert!(!grammar.validate(".a.b"));
        assert!(!grammar.validate(""));
    }

    #[test]
    fn test_function_matches() {
        let grammar = Grammar::new(&Config::functions()).unwrap();
        let text = "#{outer:a:b}#{ inner } #{esc:a\\}b} #{greet:${user.name}}";
        let tokens: Vec<_> = grammar
            .matches(text)
            .map(|(token, _)| &text[token])
            .collect();

        assert_eq!(
            tokens,
            vec!["outer:a:b", "inner", "esc:a\\}b", "greet:${user.name}"]
        );
    }

    #[test]
    fn test_escaped_delimiters() {
        let grammar = Grammar::new(&Config::new().with_delimiters("(*", "*)")).unwrap();
        assert_eq!(grammar.matches("(*test*)").count(), 1);

        let grammar = Grammar::new(&Config::new().with_delimiters("🔥", "🔥")).unwrap();
        assert_eq!(grammar.matches("🔥test🔥").count(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let grammar = Grammar::new(&Config::new().with_path("[a-z]+")).unwrap();

        assert!(grammar.validate("UPPER"));
    }

    #[test]
    fn test_invalid_grammar() {
        let error = Grammar::new(&Config::new().with_path("[a-z")).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_delimiter() {
        let error = Grammar::new(&Config::new().with_delimiters("", "}")).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
