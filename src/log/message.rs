use super::{Error, ErrorKind};
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_PATH: &str = "invalid path";
pub const MISSING_BINDING: &str = "missing binding";
pub const MISSING_FUNCTION: &str = "missing function";
pub const MISSING_SCOPE: &str = "missing scope";
pub const MALFORMED_ARGUMENTS: &str = "malformed arguments";
pub const UNREGISTERED_COMPONENT: &str = "unregistered component";

/// Return an [`Error`] explaining that a resolver was called without a scope
/// while warnings are enabled.
pub fn error_missing_scope() -> Error {
    Error::new(ErrorKind::Configuration, MISSING_SCOPE)
        .with_help("pass a scope, or disable warnings to treat a missing scope as empty")
}

/// Return an [`Error`] explaining that a path grammar failed to compile.
pub fn error_grammar<T>(grammar: &str, cause: T) -> Error
where
    T: Display,
{
    Error::new(
        ErrorKind::Configuration,
        format!("invalid grammar `{grammar}`"),
    )
    .with_help(cause.to_string())
}

/// Return an [`Error`] explaining that a segment of a path has no value.
pub fn error_missing_binding(segment: &str, token: &str) -> Error {
    Error::new(
        ErrorKind::MissingBinding,
        format!("{MISSING_BINDING} `{segment}` in `{token}`"),
    )
    .with_help(format!(
        "`{segment}` is undefined or null, check the variables passed in"
    ))
}

/// Return an [`Error`] explaining that a segment of a path is malformed.
pub fn error_invalid_path<T>(segment: &str, token: &str, help: T) -> Error
where
    T: Into<String>,
{
    Error::new(
        ErrorKind::InvalidPath,
        format!("{INVALID_PATH} `{segment}` in `{token}`"),
    )
    .with_help(help)
}

/// Return an [`Error`] explaining that a function is not registered.
pub fn error_missing_function(name: &str) -> Error {
    Error::new(
        ErrorKind::MissingFunction,
        format!("{MISSING_FUNCTION} `{name}`"),
    )
    .with_help(format!(
        "function `{name}` not found, add it with `.with_raw` or `.with_positional`"
    ))
}

/// Return an [`Error`] explaining that function arguments are malformed.
pub fn error_malformed_arguments(name: &str, arguments: &str) -> Error {
    Error::new(
        ErrorKind::MalformedArguments,
        format!("{MALFORMED_ARGUMENTS} `{arguments}` for function `{name}`"),
    )
    .with_help("every `:` must separate two non-empty arguments, escape literal colons as `\\:`")
}

/// Return an [`Error`] that wraps the failure of a function.
pub fn error_function_execution(name: &str, cause: Error) -> Error {
    Error::new(
        ErrorKind::FunctionExecution,
        format!("function error: {}", cause.reason()),
    )
    .with_help(match cause.help() {
        Some(help) => format!("raised by function `{name}`, {help}"),
        None => format!("raised by function `{name}`"),
    })
}

/// Return an [`Error`] explaining that a component is not registered.
pub fn error_unregistered_component(name: &str) -> Error {
    Error::new(
        ErrorKind::UnregisteredComponent,
        format!("{UNREGISTERED_COMPONENT} `{name}`"),
    )
    .with_help(format!(
        "component `{name}` not found, add it with `Components::with`"
    ))
}

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::new(ErrorKind::InvalidSyntax, UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all tags and calls?")
}

/// Return a string describing an unexpected token.
pub fn expected_token<T, Y>(expected: T, received: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("expected {expected}, found {received}")
}
