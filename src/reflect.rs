//! Reflection capabilities consumed by the mapper and the dynamic values
//! that travel between source, conversion and destination.

use crate::error::{ArgumentError, BoxError, TypeMismatch};
use std::any::Any;
use std::fmt;

/// A type whose constructor takes named parameters.
pub trait Constructible: Sized {
    /// Ordered, unique names of the required construction parameters.
    fn parameters() -> &'static [&'static str];

    /// Name used in diagnostics.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Build an instance from named arguments.
    ///
    /// On failure the arguments left in `args` are rendered into the
    /// diagnostic, so check every argument before taking any.
    fn construct(args: &mut Arguments) -> Result<Self, BoxError>;
}

/// A type whose attributes can be read by name.
pub trait Attributes {
    /// Read attribute `name`, or `None` if the type does not expose it.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Names readable through [`Attributes::attribute`], in declaration order.
    fn attribute_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Name used in diagnostics.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

trait FieldValue: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + fmt::Debug> FieldValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Owned, type-erased field value.
///
/// The `Debug` rendering of the wrapped value is its text form in
/// diagnostics.
pub struct Value {
    inner: Box<dyn FieldValue>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + fmt::Debug>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        FieldValue::as_any(&*self.inner).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        FieldValue::as_any(&*self.inner).downcast_ref::<T>()
    }

    /// Unwrap the value as `T`.
    pub fn downcast<T: Any>(self) -> Result<T, TypeMismatch> {
        let mismatch = TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: self.type_name,
        };
        FieldValue::into_any(self.inner)
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| mismatch)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

/// Keyword-style construction arguments, kept in insertion order.
#[derive(Debug, Default)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert `value` under `name`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Check that `name` is present and holds a `T`, without removing it.
    pub fn check<T: Any>(&self, name: &str) -> Result<(), ArgumentError> {
        let value = self.get(name).ok_or_else(|| ArgumentError::Missing {
            name: name.to_string(),
        })?;
        if value.is::<T>() {
            Ok(())
        } else {
            Err(ArgumentError::TypeMismatch {
                name: name.to_string(),
                source: TypeMismatch {
                    expected: std::any::type_name::<T>(),
                    found: value.type_name(),
                },
            })
        }
    }

    /// Remove the argument `name` and unwrap it as `T`.
    pub fn take<T: Any>(&mut self, name: &str) -> Result<T, ArgumentError> {
        let index = self
            .entries
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ArgumentError::Missing {
                name: name.to_string(),
            })?;
        let (name, value) = self.entries.remove(index);
        value
            .downcast::<T>()
            .map_err(|source| ArgumentError::TypeMismatch { name, source })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, text form)` pairs in argument order.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), format!("{value:?}")))
            .collect()
    }
}
