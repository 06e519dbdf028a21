use crate::{
    log::{error_invalid_path, error_missing_binding, Error},
    store::Store,
    value::Value,
};

/// Resolve a dotted path against the [`Store`].
///
/// An exact key match on the whole token wins over traversal, so a key
/// like `a.b` shadows the nested `a` → `b` path. Otherwise the first segment
/// is looked up as a key, and each following segment steps into an object
/// field or an array index. `name[0]` and `name[0][1]` index into arrays.
///
/// A null found at the end of the path is returned. A null found before the
/// end is a miss.
///
/// # Errors
///
/// Returns an [`Error`] with [`ErrorKind::MissingBinding`][`crate::ErrorKind::MissingBinding`]
/// when a segment is absent, or [`ErrorKind::InvalidPath`][`crate::ErrorKind::InvalidPath`]
/// when the token itself is malformed.
pub fn resolve<'store>(store: &'store Store, token: &str) -> Result<&'store Value, Error> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(error_invalid_path(
            token,
            token,
            "paths may not begin or end with `.`, or contain `..`",
        ));
    }

    if let Some(value) = store.get(token) {
        return Ok(value);
    }

    let (first, rest) = segments
        .split_first()
        .ok_or_else(|| error_invalid_path(token, token, "path is empty"))?;
    let mut current = root(store, first, token)?;
    let mut previous = *first;

    for segment in rest {
        if current.is_null() {
            return Err(error_missing_binding(previous, token));
        }
        current = step(current, segment, token)?;
        previous = segment;
    }

    Ok(current)
}

/// Resolve the first segment of a path.
fn root<'store>(store: &'store Store, segment: &str, token: &str) -> Result<&'store Value, Error> {
    if let Some(value) = store.get(segment) {
        return Ok(value);
    }
    if is_special(segment) {
        return Err(error_missing_binding(segment, token));
    }

    let (name, indices) = split_indices(segment, token)?;
    let value = store
        .get(name)
        .ok_or_else(|| error_missing_binding(name, token))?;

    index_all(value, &indices, segment, token)
}

/// Step from the current value into the next segment.
fn step<'value>(
    current: &'value Value,
    segment: &str,
    token: &str,
) -> Result<&'value Value, Error> {
    let (name, indices) = split_indices(segment, token)?;
    let value = match current {
        Value::Object(object) => object.get(name),
        Value::Array(array) => name.parse::<usize>().ok().and_then(|i| array.get(i)),
        _ => None,
    }
    .ok_or_else(|| error_missing_binding(segment, token))?;

    index_all(value, &indices, segment, token)
}

/// Apply each index in order, requiring an array at every level.
fn index_all<'value>(
    mut value: &'value Value,
    indices: &[usize],
    segment: &str,
    token: &str,
) -> Result<&'value Value, Error> {
    for index in indices {
        value = match value {
            Value::Array(array) => array
                .get(*index)
                .ok_or_else(|| error_missing_binding(segment, token))?,
            Value::Null => return Err(error_missing_binding(segment, token)),
            other => {
                return Err(error_invalid_path(
                    segment,
                    token,
                    format!("cannot index into {}", other.type_name()),
                ))
            }
        };
    }

    Ok(value)
}

/// Split a segment like `items[0][1]` into its name and indices.
fn split_indices<'s>(segment: &'s str, token: &str) -> Result<(&'s str, Vec<usize>), Error> {
    let Some(open) = segment.find('[') else {
        if segment.contains(']') {
            return Err(error_invalid_path(segment, token, "unmatched `]`"));
        }
        return Ok((segment, vec![]));
    };

    let name = &segment[..open];
    if name.is_empty() {
        return Err(error_invalid_path(segment, token, "an index must follow a name"));
    }

    let mut indices = vec![];
    let mut rest = &segment[open..];
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .and_then(|r| r.find(']').map(|close| (&r[..close], &r[close + 1..])));
        let Some((digits, remaining)) = inner else {
            return Err(error_invalid_path(segment, token, "unmatched `[`"));
        };
        let index = digits.parse::<usize>().map_err(|_| {
            error_invalid_path(
                segment,
                token,
                format!("index `{digits}` is not a non-negative integer"),
            )
        })?;
        indices.push(index);
        rest = remaining;
    }

    Ok((name, indices))
}

/// Return true if the segment uses one of the special key forms that are
/// only ever looked up literally.
#[inline]
fn is_special(segment: &str) -> bool {
    segment.starts_with('@')
        || segment.starts_with('#')
        || (segment.starts_with('{') && segment.ends_with('}'))
}
