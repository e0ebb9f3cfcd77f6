//! GPUdb Core
//!
//! Domain model shared by the Kinetica dialect crates: column types,
//! reflected column descriptors, diagnostics and dialect configuration.

pub mod diagnostic;
pub mod schema;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use schema::{SqlType, ColumnDescriptor, DriverTypeReport, DEFAULT_COLLATION};
pub use config::{DialectConfig, UnsupportedColumnPolicy, ConfigError};
