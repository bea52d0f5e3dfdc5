//! Mapping resolution and invocation.

use crate::error::{
    AttributeMappingError, BoxError, ConfigurationError, InstantiationError, MappingError,
};
use crate::mappers::Mappers;
use crate::reflect::{Arguments, Attributes, Constructible};
use crate::table::{Conversion, MappingTable};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Builds `D` instances from `S` instances through a resolved
/// [`MappingTable`].
///
/// The table is fixed when the mapper is built; invoking it never mutates
/// the mapper, so one mapper can be reused for any number of sources.
pub struct Mapper<S, D> {
    table: MappingTable<S>,
    dest_attrs: &'static [&'static str],
    _types: PhantomData<fn(&S) -> D>,
}

impl<S: 'static, D: Constructible> Mapper<S, D> {
    pub fn builder() -> MapperBuilder<S, D> {
        MapperBuilder::new()
    }

    /// Implicit mapper: parameters missing from `mappers` read the
    /// same-named source attribute.
    pub fn new(mappers: MappingTable<S>) -> Result<Self, ConfigurationError>
    where
        S: Attributes,
    {
        Self::builder().mappers(mappers).build()
    }

    /// Explicit mapper: `mappers` must cover every parameter.
    pub fn explicit(mappers: MappingTable<S>) -> Result<Self, ConfigurationError> {
        Self::builder().mappers(mappers).build_explicit()
    }

    /// Construction parameters of `D`, in declaration order.
    pub fn dest_attrs(&self) -> &'static [&'static str] {
        self.dest_attrs
    }

    pub fn table(&self) -> &MappingTable<S> {
        &self.table
    }

    pub fn type_name(&self) -> &'static str {
        D::type_name()
    }

    /// Apply every conversion to `src`, in table order.
    pub fn mapped_values(&self, src: &S) -> Result<Arguments, AttributeMappingError> {
        let mut values = Arguments::with_capacity(self.table.len());
        for (dest_attr, conversion) in self.table.iter() {
            let value = conversion.apply(src).map_err(|source| {
                debug!(
                    destination = D::type_name(),
                    attribute = dest_attr,
                    error = %source,
                    "conversion failed"
                );
                AttributeMappingError {
                    type_name: D::type_name(),
                    attribute: dest_attr.to_string(),
                    source,
                }
            })?;
            values.insert(dest_attr, value);
        }
        Ok(values)
    }

    /// Build a fresh `D` from `src`.
    pub fn map(&self, src: &S) -> Result<D, MappingError> {
        trace!(destination = D::type_name(), "mapping source instance");
        let mut values = self.mapped_values(src)?;

        D::construct(&mut values).map_err(|source| {
            debug!(
                destination = D::type_name(),
                error = %source,
                "construction failed"
            );
            InstantiationError {
                type_name: D::type_name(),
                arguments: values.describe(),
                source,
            }
            .into()
        })
    }
}

impl<S, D> Clone for Mapper<S, D> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            dest_attrs: self.dest_attrs,
            _types: PhantomData,
        }
    }
}

impl<S, D> fmt::Debug for Mapper<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("source", &std::any::type_name::<S>())
            .field("destination", &std::any::type_name::<D>())
            .field("table", &self.table)
            .finish()
    }
}

/// Collects mapping options and resolves them into a [`Mapper`].
pub struct MapperBuilder<S, D> {
    table: MappingTable<S>,
    explicit: bool,
    _types: PhantomData<fn(&S) -> D>,
}

impl<S: 'static, D: Constructible> MapperBuilder<S, D> {
    pub fn new() -> Self {
        Self {
            table: MappingTable::new(),
            explicit: false,
            _types: PhantomData,
        }
    }

    /// Map `name` with an infallible function of the source.
    pub fn map<T, F>(self, name: impl Into<String>, func: F) -> Self
    where
        T: Any + fmt::Debug,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.entry(name, Conversion::new(func))
    }

    /// Map `name` with a function of the source that may fail.
    pub fn try_map<T, E, F>(self, name: impl Into<String>, func: F) -> Self
    where
        T: Any + fmt::Debug,
        E: Into<BoxError>,
        F: Fn(&S) -> Result<T, E> + Send + Sync + 'static,
    {
        self.entry(name, Conversion::try_new(func))
    }

    pub fn entry(mut self, name: impl Into<String>, conversion: Conversion<S>) -> Self {
        self.table.insert(name, conversion);
        self
    }

    /// Add every entry of `mappers`, keeping its order.
    pub fn mappers(mut self, mappers: MappingTable<S>) -> Self {
        for (name, conversion) in mappers.iter() {
            self.table.insert(name, conversion.clone());
        }
        self
    }

    /// In explicit mode every parameter must be mapped by the caller.
    pub fn explicit(mut self, explicit: bool) -> Self {
        self.explicit = explicit;
        self
    }

    /// Resolve, synthesizing missing entries as same-named identity reads.
    pub fn build(self) -> Result<Mapper<S, D>, ConfigurationError>
    where
        S: Attributes,
    {
        self.build_with(Mappers::identity_factory())
    }

    /// Resolve, synthesizing missing entries with `default_mapper`.
    ///
    /// The factory is ignored in explicit mode.
    pub fn build_with<F>(mut self, default_mapper: F) -> Result<Mapper<S, D>, ConfigurationError>
    where
        F: Fn(&str) -> Conversion<S>,
    {
        let dest_attrs = Self::dest_attrs()?;
        if self.explicit {
            self.check_explicit(dest_attrs)?;
            return self.finish(dest_attrs, 0);
        }

        let mut synthesized = 0;
        for attr in dest_attrs {
            if !self.table.contains(attr) {
                self.table.insert(*attr, default_mapper(*attr));
                synthesized += 1;
            }
        }
        self.finish(dest_attrs, synthesized)
    }

    /// Resolve in explicit mode regardless of [`MapperBuilder::explicit`].
    pub fn build_explicit(mut self) -> Result<Mapper<S, D>, ConfigurationError> {
        self.explicit = true;
        let dest_attrs = Self::dest_attrs()?;
        self.check_explicit(dest_attrs)?;
        self.finish(dest_attrs, 0)
    }

    fn dest_attrs() -> Result<&'static [&'static str], ConfigurationError> {
        let dest_attrs = D::parameters();
        if dest_attrs.is_empty() {
            return Err(ConfigurationError::NoParameters {
                type_name: D::type_name(),
            });
        }
        Ok(dest_attrs)
    }

    fn check_explicit(&self, dest_attrs: &[&str]) -> Result<(), ConfigurationError> {
        let missing = dest_attrs
            .iter()
            .filter(|attr| !self.table.contains(attr))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::MissingMappings {
                type_name: D::type_name(),
                missing,
            })
        }
    }

    fn finish(
        self,
        dest_attrs: &'static [&'static str],
        synthesized: usize,
    ) -> Result<Mapper<S, D>, ConfigurationError> {
        let unknown = self
            .table
            .keys()
            .filter(|key| !dest_attrs.iter().any(|attr| *attr == *key))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(ConfigurationError::UnknownTargets {
                type_name: D::type_name(),
                unknown,
                valid: dest_attrs.iter().map(ToString::to_string).collect(),
            });
        }

        debug!(
            destination = D::type_name(),
            entries = self.table.len(),
            synthesized,
            explicit = self.explicit,
            "resolved mapping table"
        );

        Ok(Mapper {
            table: self.table,
            dest_attrs,
            _types: PhantomData,
        })
    }
}

impl<S: 'static, D: Constructible> Default for MapperBuilder<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributesDerive, ConstructibleDerive};

    #[derive(Clone, AttributesDerive)]
    struct Source {
        first: String,
        second: String,
        third: String,
    }

    #[derive(Debug, ConstructibleDerive)]
    struct Pair {
        first: String,
        second: String,
    }

    fn source() -> Source {
        Source {
            first: "AAA".to_string(),
            second: "BBB".to_string(),
            third: "CCC".to_string(),
        }
    }

    #[test]
    fn test_implicit_synthesizes_in_parameter_order() {
        let mapper = Mapper::<Source, Pair>::builder().build().unwrap();
        assert_eq!(mapper.table().keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(mapper.dest_attrs(), &["first", "second"]);
    }

    #[test]
    fn test_caller_entries_keep_position() {
        let mapper = Mapper::<Source, Pair>::builder()
            .map("second", |s: &Source| s.third.clone())
            .build()
            .unwrap();
        assert_eq!(mapper.table().keys().collect::<Vec<_>>(), vec!["second", "first"]);

        let pair = mapper.map(&source()).unwrap();
        assert_eq!(pair.first, "AAA");
        assert_eq!(pair.second, "CCC");
    }

    #[test]
    fn test_caller_conversion_is_not_replaced() {
        let conversion = Conversion::new(|s: &Source| s.third.clone());
        let mapper = Mapper::<Source, Pair>::builder()
            .entry("first", conversion.clone())
            .build()
            .unwrap();
        assert!(mapper.table().get("first").unwrap().ptr_eq(&conversion));
    }

    #[test]
    fn test_mapped_values_follow_table_order() {
        let mapper = Mapper::<Source, Pair>::builder()
            .map("second", |s: &Source| s.second.to_lowercase())
            .build()
            .unwrap();
        let values = mapper.mapped_values(&source()).unwrap();
        assert_eq!(
            values.describe(),
            vec![
                ("second".to_string(), "\"bbb\"".to_string()),
                ("first".to_string(), "\"AAA\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_ignores_default_mapper() {
        let err = Mapper::<Source, Pair>::builder()
            .map("first", |s: &Source| s.first.clone())
            .explicit(true)
            .build_with(|name: &str| Mappers::identity(name, None))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingMappings {
                type_name: "Pair",
                missing: vec!["second".to_string()],
            }
        );
    }

    #[test]
    fn test_clone_shares_table() {
        let mapper = Mapper::<Source, Pair>::new(MappingTable::new()).unwrap();
        let cloned = mapper.clone();
        let a = mapper.table().get("first").unwrap();
        let b = cloned.table().get("first").unwrap();
        assert!(a.ptr_eq(b));
    }

    #[test]
    fn test_mapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mapper<std::rc::Rc<String>, Pair>>();
    }

    #[test]
    fn test_debug_lists_table_keys() {
        let mapper = Mapper::<Source, Pair>::new(MappingTable::new()).unwrap();
        let rendered = format!("{mapper:?}");
        assert!(rendered.contains(r#"table: ["first", "second"]"#), "{rendered}");
    }
}
