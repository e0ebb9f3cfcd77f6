//! Kinetica catalog reflection
//!
//! This crate reads table metadata through the ODBC catalog functions and
//! maps the driver's type names onto [`gpudb_core::SqlType`].
//!
//! ## Features
//!
//! - `odbc` - live connections through `odbc-api`
//!
//! ## Example
//!
//! ```rust,ignore
//! use gpudb_catalog::{OdbcConnection, Reflector};
//! use gpudb_core::DialectConfig;
//!
//! let connection = OdbcConnection::connect("DSN=kinetica")?;
//! let mut reflector = Reflector::new(connection, DialectConfig::default());
//! let mapped = reflector.columns("orders", Some("ki_home"))?;
//! ```

pub mod connection;
pub mod typemap;
pub mod reflector;
pub mod mock;
pub mod odbc;

pub use connection::{FetchError, MetadataConnection, TableIdentifier, TableRow};
pub use typemap::{
    map_columns, map_type, resolve_varchar_length, MappedColumns, TypeRule, TypeRuleTable, TypeTarget,
    DEFAULT_RULES,
};
pub use reflector::{owner_plus_db, ForeignKeyInfo, IndexInfo, PrimaryKeyConstraint, Reflector};
pub use mock::MockConnection;
pub use odbc::OdbcConnection;
