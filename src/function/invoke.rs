use super::{Convention, Functions};
use crate::{
    log::{error_function_execution, error_malformed_arguments, error_missing_function, Error},
    value::Value,
};
use std::mem::take;
use tracing::trace;

/// Call the function named by a `name:argument:argument` token.
///
/// The name is everything before the first `:`. A token with no `:` calls
/// the function with no arguments.
///
/// # Errors
///
/// Returns an [`Error`] if the arguments are malformed, the function does
/// not exist, or the function itself fails.
pub fn invoke(functions: &Functions, token: &str) -> Result<Value, Error> {
    let token = token.trim();
    match token.split_once(':') {
        Some((name, arguments)) => invoke_parts(functions, name.trim(), Some(arguments)),
        None => invoke_parts(functions, token, None),
    }
}

/// Call the named function with the given argument text.
///
/// `None` means there are no arguments at all. `Some` text is checked for
/// malformed separators even when the function turns out to be missing, so
/// a malformed call always fails the same way.
///
/// # Errors
///
/// Returns an [`Error`] if the arguments are malformed, the function does
/// not exist, or the function itself fails.
pub fn invoke_parts(
    functions: &Functions,
    name: &str,
    arguments: Option<&str>,
) -> Result<Value, Error> {
    let pieces = match arguments {
        Some(raw) => Some((raw.trim(), split(name, raw)?)),
        None => None,
    };
    let (convention, function) = functions
        .get(name)
        .ok_or_else(|| error_missing_function(name))?;

    let arguments = match (convention, pieces) {
        (_, None) => vec![],
        (Convention::Raw, Some((raw, _))) => vec![raw.to_string()],
        (Convention::Positional, Some((_, pieces))) => pieces,
    };
    trace!(
        name,
        ?convention,
        count = arguments.len(),
        "invoking function"
    );

    function
        .call(&arguments)
        .map_err(|cause| error_function_execution(name, cause))
}

/// Split argument text on unescaped `:`, then trim and unescape each piece.
///
/// # Errors
///
/// Returns an [`Error`] if any piece is empty, which covers empty text, a
/// doubled separator and a dangling separator.
fn split(name: &str, raw: &str) -> Result<Vec<String>, Error> {
    let mut pieces = vec![];
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(char) = chars.next() {
        match char {
            '\\' => {
                current.push(char);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => pieces.push(take(&mut current)),
            _ => current.push(char),
        }
    }
    pieces.push(current);

    pieces
        .iter()
        .map(|piece| match piece.trim() {
            "" => Err(error_malformed_arguments(name, raw)),
            piece => Ok(unescape(piece)),
        })
        .collect()
}

/// Escape `\` and `:` so the text reaches a function as a single piece.
///
/// Used on values substituted into argument text, which must never add
/// separators of their own.
pub(crate) fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for char in text.chars() {
        if matches!(char, '\\' | ':') {
            result.push('\\');
        }
        result.push(char);
    }

    result
}

/// Replace each `\x` with `x`. A trailing lone `\` is kept.
fn unescape(piece: &str) -> String {
    let mut result = String::with_capacity(piece.len());
    let mut chars = piece.chars();

    while let Some(char) = chars.next() {
        match char {
            '\\' => result.push(chars.next().unwrap_or('\\')),
            _ => result.push(char),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::{escape, invoke, invoke_parts, split};
    use crate::{Error, ErrorKind, Functions, Value};

    #[test]
    fn test_arity_zero() {
        let functions = get_test_functions();

        assert_eq!(invoke(&functions, "now").unwrap(), Value::from("12:00"));
        assert_eq!(invoke(&functions, "echo").unwrap(), Value::from(""));
        assert_eq!(invoke(&functions, "list").unwrap(), Value::from(""));
    }

    #[test]
    fn test_raw_receives_unsplit_text() {
        let functions = get_test_functions();

        assert_eq!(
            invoke(&functions, "echo:a:b:c").unwrap(),
            Value::from("a:b:c")
        );
        assert_eq!(
            invoke(&functions, "echo: x, y ").unwrap(),
            Value::from("x, y")
        );
    }

    #[test]
    fn test_positional_receives_pieces() {
        let functions = get_test_functions();

        assert_eq!(
            invoke(&functions, "list:a:b:c").unwrap(),
            Value::from("a|b|c")
        );
        assert_eq!(
            invoke(&functions, "list: a : b ").unwrap(),
            Value::from("a|b")
        );
    }

    #[test]
    fn test_escaped_separator() {
        let functions = get_test_functions();

        assert_eq!(
            invoke(&functions, r"list:12\:30:done").unwrap(),
            Value::from("12:30|done")
        );
        assert_eq!(
            split("f", r"a\\:b").unwrap(),
            vec![r"a\".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_escape_keeps_one_piece() {
        let functions = get_test_functions();
        let arguments = format!("{}:{}", escape(r"12:30\x"), escape("done"));

        assert_eq!(
            invoke_parts(&functions, "list", Some(&arguments)).unwrap(),
            Value::from(r"12:30\x|done")
        );
    }

    #[test]
    fn test_malformed() {
        let functions = get_test_functions();

        for token in ["echo:", "list:a::b", "list:a:", "list::a", "missing:"] {
            let error = invoke(&functions, token).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MalformedArguments, "{token}");
        }
    }

    #[test]
    fn test_missing() {
        let error = invoke(&get_test_functions(), "ghost:a").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MissingFunction);
    }

    #[test]
    fn test_execution_error() {
        let error = invoke(&get_test_functions(), "fail:now").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::FunctionExecution);
        assert_eq!(error.reason(), "function error: refused `now`");
    }

    #[test]
    fn test_invoke_parts() {
        let functions = get_test_functions();

        assert_eq!(
            invoke_parts(&functions, "echo", Some("Hello, John")).unwrap(),
            Value::from("Hello, John")
        );
        assert_eq!(
            invoke_parts(&functions, "list", None).unwrap(),
            Value::from("")
        );
    }

    /// Return a new Functions equipped with test functions.
    fn get_test_functions() -> Functions {
        Functions::new()
            .with_positional("now", |_: &[String]| Ok(Value::from("12:00")))
            .with_raw("echo", |text: &str| Ok(Value::from(text)))
            .with_positional("list", |args: &[String]| Ok(Value::from(args.join("|"))))
            .with_raw("fail", |text: &str| {
                Err(Error::build(format!("refused `{text}`")))
            })
    }
}
