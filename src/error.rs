//! Error types for mapper resolution and invocation.

/// Faults raised by caller code (conversion functions, constructors).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raised while a mapper is being built. Lists every offending name at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("destination type '{type_name}' has no construction parameters")]
    NoParameters { type_name: &'static str },
    #[error(
        "explicit mapper is missing mappings for target fields {}",
        qualified(.type_name, .missing)
    )]
    MissingMappings {
        type_name: &'static str,
        missing: Vec<String>,
    },
    #[error(
        "mapping table for '{}' contains unknown target fields {}; valid fields are {}",
        .type_name,
        qualified(.type_name, .unknown),
        quoted(.valid)
    )]
    UnknownTargets {
        type_name: &'static str,
        unknown: Vec<String>,
        valid: Vec<String>,
    },
}

/// A conversion function failed while computing one destination attribute.
#[derive(Debug, thiserror::Error)]
#[error("failed to map attribute '{}.{}': {}", .type_name, .attribute, .source)]
pub struct AttributeMappingError {
    pub type_name: &'static str,
    pub attribute: String,
    #[source]
    pub source: BoxError,
}

/// The destination constructor failed after every value was computed.
#[derive(Debug, thiserror::Error)]
#[error(
    "failed to instantiate '{}' with {}: {}",
    .type_name,
    render_arguments(.arguments),
    .source
)]
pub struct InstantiationError {
    pub type_name: &'static str,
    /// `(name, text form)` of every resolved argument, in table order.
    pub arguments: Vec<(String, String)>,
    #[source]
    pub source: BoxError,
}

/// Failure of a single mapper invocation.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error(transparent)]
    Attribute(#[from] AttributeMappingError),
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a value of type '{expected}', found '{found}'")]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Reading a named construction argument failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("missing argument '{name}'")]
    Missing { name: String },
    #[error("argument '{name}' has the wrong type: {source}")]
    TypeMismatch {
        name: String,
        #[source]
        source: TypeMismatch,
    },
}

/// The source does not expose the attribute a conversion reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "'{}' has no attribute '{}' (available: {})",
    .type_name,
    .attribute,
    quoted(.available)
)]
pub struct AttributeNotFound {
    pub type_name: &'static str,
    pub attribute: String,
    pub available: Vec<String>,
}

fn qualified(type_name: &str, names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{type_name}.{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_arguments(arguments: &[(String, String)]) -> String {
    let rendered = arguments
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({rendered})")
}
