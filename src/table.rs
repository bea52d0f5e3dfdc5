//! Conversion functions and the ordered table that binds them to
//! destination parameters.

use crate::error::BoxError;
use crate::reflect::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type ConversionFn<S> = dyn Fn(&S) -> Result<Value, BoxError> + Send + Sync;

/// Computes one destination value from a source instance.
///
/// Cloning shares the underlying function, so one conversion can back
/// entries in several tables.
pub struct Conversion<S> {
    func: Arc<ConversionFn<S>>,
}

impl<S> Conversion<S> {
    /// Wrap an infallible function.
    pub fn new<T, F>(func: F) -> Self
    where
        T: Any + fmt::Debug,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::from_value_fn(move |src| Ok(Value::new(func(src))))
    }

    /// Wrap a function that may fail.
    pub fn try_new<T, E, F>(func: F) -> Self
    where
        T: Any + fmt::Debug,
        E: Into<BoxError>,
        F: Fn(&S) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::from_value_fn(move |src| func(src).map(Value::new).map_err(Into::into))
    }

    /// Wrap a function that already produces dynamic values.
    pub fn from_value_fn<F>(func: F) -> Self
    where
        F: Fn(&S) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    pub fn apply(&self, src: &S) -> Result<Value, BoxError> {
        (self.func)(src)
    }

    /// Whether both conversions share the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<S> Clone for Conversion<S> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

impl<S> fmt::Debug for Conversion<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion").finish_non_exhaustive()
    }
}

/// Ordered mapping from destination parameter name to [`Conversion`].
pub struct MappingTable<S> {
    entries: Vec<(String, Conversion<S>)>,
}

impl<S> MappingTable<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an entry. Replacing an existing name keeps its position and
    /// returns the previous conversion.
    pub fn insert(&mut self, name: impl Into<String>, conversion: Conversion<S>) -> Option<Conversion<S>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, conversion)),
            None => {
                self.entries.push((name, conversion));
                None
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, conversion: Conversion<S>) -> Self {
        self.insert(name, conversion);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Conversion<S>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, conversion)| conversion)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Conversion<S>)> {
        self.entries
            .iter()
            .map(|(name, conversion)| (name.as_str(), conversion))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for MappingTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for MappingTable<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S> fmt::Debug for MappingTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<S, N: Into<String>> Extend<(N, Conversion<S>)> for MappingTable<S> {
    fn extend<I: IntoIterator<Item = (N, Conversion<S>)>>(&mut self, iter: I) {
        for (name, conversion) in iter {
            self.insert(name, conversion);
        }
    }
}

impl<S, N: Into<String>> FromIterator<(N, Conversion<S>)> for MappingTable<S> {
    fn from_iter<I: IntoIterator<Item = (N, Conversion<S>)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: i32,
        right: i32,
    }

    #[test]
    fn test_conversion_new_and_apply() {
        let sum = Conversion::new(|p: &Pair| p.left + p.right);
        let value = sum.apply(&Pair { left: 2, right: 3 }).unwrap();
        assert_eq!(value.downcast::<i32>().unwrap(), 5);
    }

    #[test]
    fn test_conversion_try_new_propagates_failure() {
        let fails = Conversion::try_new(|_: &Pair| -> Result<i32, String> { Err("nope".into()) });
        let err = fails.apply(&Pair { left: 0, right: 0 }).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_conversion_clone_shares_function() {
        let left = Conversion::new(|p: &Pair| p.left);
        let shared = left.clone();
        assert!(left.ptr_eq(&shared));
        assert!(!left.ptr_eq(&Conversion::new(|p: &Pair| p.left)));
    }

    #[test]
    fn test_table_insert_keeps_order_and_position() {
        let mut table = MappingTable::new()
            .with("b", Conversion::new(|p: &Pair| p.right))
            .with("a", Conversion::new(|p: &Pair| p.left));

        let replaced = table.insert("b", Conversion::new(|p: &Pair| p.right * 10));

        assert!(replaced.is_some());
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        let value = table.get("b").unwrap().apply(&Pair { left: 1, right: 2 }).unwrap();
        assert_eq!(value.downcast::<i32>().unwrap(), 20);
    }

    #[test]
    fn test_table_from_iterator() {
        let table: MappingTable<Pair> = vec![
            ("left", Conversion::new(|p: &Pair| p.left)),
            ("right", Conversion::new(|p: &Pair| p.right)),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert!(table.contains("left"));
        assert!(!table.contains("middle"));
        assert_eq!(format!("{table:?}"), r#"["left", "right"]"#);
    }
}
