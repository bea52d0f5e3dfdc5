//! Convenience builders for attribute-reading conversions.

use crate::error::{AttributeNotFound, BoxError};
use crate::reflect::{Attributes, Value};
use crate::table::Conversion;
use std::any::Any;
use std::fmt;

pub struct Mappers;

impl Mappers {
    /// Read `src_attr` (defaults to `dest_attr`) off the source unchanged.
    ///
    /// No copy beyond the attribute read itself is made: shared handles
    /// (`Rc`, `Arc`) stay aliased between source and destination.
    pub fn identity<S>(dest_attr: &str, src_attr: Option<&str>) -> Conversion<S>
    where
        S: Attributes + 'static,
    {
        let src_attr = src_attr.unwrap_or(dest_attr).to_string();
        Conversion::from_value_fn(move |src: &S| read_attribute(src, &src_attr))
    }

    /// Read `src_attr` (defaults to `dest_attr`) and pass it through `by`.
    pub fn transform<S, T, U, F>(dest_attr: &str, by: F, src_attr: Option<&str>) -> Conversion<S>
    where
        S: Attributes + 'static,
        T: Any,
        U: Any + fmt::Debug,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Self::try_transform(dest_attr, move |value: T| Ok::<U, BoxError>(by(value)), src_attr)
    }

    /// Like [`Mappers::transform`], for functions that may fail.
    pub fn try_transform<S, T, U, E, F>(
        dest_attr: &str,
        by: F,
        src_attr: Option<&str>,
    ) -> Conversion<S>
    where
        S: Attributes + 'static,
        T: Any,
        U: Any + fmt::Debug,
        E: Into<BoxError>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let src_attr = src_attr.unwrap_or(dest_attr).to_string();
        Conversion::from_value_fn(move |src: &S| {
            let value = read_attribute(src, &src_attr)?.downcast::<T>()?;
            by(value).map(Value::new).map_err(Into::into)
        })
    }

    /// The built-in default mapper factory: identity on the same name.
    pub fn identity_factory<S>() -> impl Fn(&str) -> Conversion<S>
    where
        S: Attributes + 'static,
    {
        |name: &str| Self::identity(name, None)
    }
}

fn read_attribute<S: Attributes>(src: &S, name: &str) -> Result<Value, BoxError> {
    src.attribute(name).ok_or_else(|| {
        AttributeNotFound {
            type_name: S::type_name(),
            attribute: name.to_string(),
            available: S::attribute_names().iter().map(ToString::to_string).collect(),
        }
        .into()
    })
}
