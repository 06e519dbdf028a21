use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Describes a type which hands out identifiers for
/// [`ComponentNode`][`crate::ComponentNode`] instances.
///
/// Identifiers must not repeat for the lifetime of the generator, but they
/// do not need to be unpredictable.
pub trait IdGenerator: Sync + Send {
    /// Return a new identifier.
    fn generate(&self) -> String;
}

/// Allows assignment of any closure returning a `String` as an `IdGenerator`.
impl<F> IdGenerator for F
where
    F: Fn() -> String + Sync + Send,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Generates random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Random;

impl IdGenerator for Random {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Generates `node-1`, `node-2`, ... counting up from one.
///
/// Useful in tests, where the produced tree should be the same every time.
///
/// # Examples
///
/// ```
/// use substrate::{IdGenerator, Sequential};
///
/// let ids = Sequential::new();
///
/// assert_eq!(ids.generate(), "node-1");
/// assert_eq!(ids.generate(), "node-2");
/// ```
#[derive(Debug, Default)]
pub struct Sequential {
    count: AtomicUsize,
}

impl Sequential {
    #[inline]
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }
}

impl IdGenerator for Sequential {
    fn generate(&self) -> String {
        let next = self.count.fetch_add(1, Ordering::Relaxed) + 1;

        format!("node-{next}")
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, Random, Sequential};
    use std::collections::HashSet;

    #[test]
    fn test_sequential() {
        let ids = Sequential::new();
        let generated: Vec<_> = (0..3).map(|_| ids.generate()).collect();

        assert_eq!(generated, vec!["node-1", "node-2", "node-3"]);
    }

    #[test]
    fn test_random_unique() {
        let generated: HashSet<_> = (0..100).map(|_| Random.generate()).collect();

        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn test_closure() {
        let fixed = || "fixed".to_string();

        assert_eq!(fixed.generate(), "fixed");
    }
}
