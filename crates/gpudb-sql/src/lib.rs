//! Kinetica SQL dialect
//!
//! This crate handles:
//! - The sqlparser dialect and identifier quoting for Kinetica
//! - Compiling statements into SQL the server accepts
//! - Emulating LIMIT/OFFSET with `ROW_NUMBER()`
//! - Rendering DDL for tables and indexes

pub mod compiler;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod pagination;
pub mod parser;
pub mod preparer;

pub use compiler::{CompiledStatement, StatementCompiler};
pub use ddl::{column_specification, create_index, create_table, drop_index, ColumnSpec, Identity, IndexSpec};
pub use dialect::{lookup_dialect, GpudbDialect, DIALECT_NAME, MAX_IDENTIFIER_LENGTH, REGISTRY_NAME};
pub use error::CompileError;
pub use pagination::{PageBounds, PaginationRewriter, Rewrite, DERIVED_ALIAS, ROW_NUMBER_COLUMN};
pub use parser::SqlParser;
pub use preparer::IdentifierPreparer;
