use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Classifies an [`Error`] so callers can react to the cause without
/// matching on reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A scope was missing where the warning policy requires one, or a
    /// resolver grammar could not be compiled.
    Configuration,
    /// A path segment or a whole path is absent or null.
    MissingBinding,
    /// A function token names something that is not a registered function.
    MissingFunction,
    /// Function argument text is empty after a separator, doubled, or dangling.
    MalformedArguments,
    /// A registered function returned an error of its own.
    FunctionExecution,
    /// A tag names a component that is not registered.
    UnregisteredComponent,
    /// A path segment is itself malformed, like `items[first]`.
    InvalidPath,
    /// Markup could not be lexed or parsed.
    InvalidSyntax,
    /// Built by user code, usually inside a function.
    Custom,
}

impl ErrorKind {
    /// Return true if this kind describes a lookup that came up empty.
    ///
    /// Only these kinds are degraded to `"undefined"` when warnings are off.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingBinding | ErrorKind::MissingFunction | ErrorKind::InvalidPath
        )
    }

    /// Return true if this kind was raised while calling a function.
    pub fn is_function_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedArguments | ErrorKind::FunctionExecution
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::MissingBinding => write!(f, "missing binding"),
            ErrorKind::MissingFunction => write!(f, "missing function"),
            ErrorKind::MalformedArguments => write!(f, "malformed arguments"),
            ErrorKind::FunctionExecution => write!(f, "function execution"),
            ErrorKind::UnregisteredComponent => write!(f, "unregistered component"),
            ErrorKind::InvalidPath => write!(f, "invalid path"),
            ErrorKind::InvalidSyntax => write!(f, "invalid syntax"),
            ErrorKind::Custom => write!(f, "custom"),
        }
    }
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use substrate::{Error, ErrorKind, Region};
///
/// let error = Error::new(ErrorKind::UnregisteredComponent, "unregistered component")
///     .with_pointer("<Modal />", Region::new(1..6))
///     .with_name("dialog.html")
///     .with_help("register `Modal` with `Components::with`");
///
/// assert_eq!(error.kind(), ErrorKind::UnregisteredComponent);
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: unregistered component
///   --> dialog.html:1:2
///    |
///  1 | <Modal />
///    |  ^^^^^
///    |
///   = help: register `Modal` with `Components::with`
/// ```
pub struct Error {
    /// Classifies the [`Error`].
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual + Send + Sync>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] of the given kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::{Error, ErrorKind};
    ///
    /// let error = Error::new(ErrorKind::InvalidPath, "invalid path");
    /// assert!(error.kind().is_miss());
    /// ```
    pub fn new<T>(kind: ErrorKind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Create a new [`Error`] with the given reason text and [`ErrorKind::Custom`].
    ///
    /// This is the constructor functions use to report their own failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use substrate::Error;
    ///
    /// Error::build("expected a number")
    ///     .with_help("pass digits only, like `#{double:21}`");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::new(ErrorKind::Custom, reason)
    }

    /// Set the [`ErrorKind`].
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;

        self
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + Send + Sync + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the visualization to a new [`Pointer`], unless a visualization
    /// already exists.
    ///
    /// Errors raised deep inside a lookup don't know where they are in the
    /// template, so the caller that does know fills it in here.
    pub fn or_pointer<T>(self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        if self.visual.is_some() {
            return self;
        }
        self.with_pointer(source, region)
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the [`ErrorKind`].
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    #[inline]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if let (Some(visual), true) = (self.visual.as_ref(), f.alternate()) {
            return visual.display(f, self.name.as_deref(), self.help.as_deref());
        }
        if let (Some(help), true) = (self.help.as_ref(), f.alternate()) {
            write!(f, "\n  = help: {help}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}
