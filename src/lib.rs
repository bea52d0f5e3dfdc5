//! Object-to-object field mapping.
//!
//! A [`Mapper`] builds one destination instance from one source instance.
//! The destination's construction parameters come from [`Constructible`],
//! each parameter is filled by a [`Conversion`] from the resolved
//! [`MappingTable`], and every failure is reported with enough context to
//! diagnose it without a debugger.
//!
//! ```rust
//! use omapper::{AttributesDerive, ConstructibleDerive, Mapper};
//!
//! #[derive(Clone, AttributesDerive)]
//! struct Account {
//!     name: String,
//!     balance: i64,
//!     internal_id: u64,
//! }
//!
//! #[derive(Debug, ConstructibleDerive)]
//! struct AccountView {
//!     name: String,
//!     balance: String,
//! }
//!
//! let mapper = Mapper::<Account, AccountView>::builder()
//!     .map("balance", |a: &Account| format!("{} EUR", a.balance))
//!     .build()
//!     .unwrap();
//!
//! let view = mapper
//!     .map(&Account { name: "main".into(), balance: 12, internal_id: 7 })
//!     .unwrap();
//! assert_eq!(view.name, "main");
//! assert_eq!(view.balance, "12 EUR");
//! ```

// Derive output names `::omapper`, which must also resolve inside this crate.
extern crate self as omapper;

pub mod error;
pub mod mapper;
pub mod mappers;
pub mod reflect;
pub mod table;

pub use error::{
    ArgumentError, AttributeMappingError, AttributeNotFound, BoxError, ConfigurationError,
    InstantiationError, MappingError, TypeMismatch,
};
pub use mapper::{Mapper, MapperBuilder};
pub use mappers::Mappers;
pub use reflect::{Arguments, Attributes, Constructible, Value};
pub use table::{Conversion, MappingTable};

// Re-export the derive macros
pub use omapper_macros::Attributes as AttributesDerive;
pub use omapper_macros::Constructible as ConstructibleDerive;
