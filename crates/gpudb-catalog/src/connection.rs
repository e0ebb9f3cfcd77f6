//! Connection trait for reading catalog metadata

use gpudb_core::DriverTypeReport;
use std::fmt;

/// Identifies a table on the server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    /// Schema (owner) name; `None` lets the server pick
    pub schema: Option<String>,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    pub fn new(schema: Option<&str>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            table: table.into(),
        }
    }

    /// Get qualified name
    pub fn fqn(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One row of the ODBC `SQLTables` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// `TABLE_CAT`
    pub catalog: Option<String>,

    /// `TABLE_SCHEM`
    pub schema: String,

    /// `TABLE_NAME`
    pub name: String,

    /// `TABLE_TYPE`, e.g. `"TABLE"` or `"VIEW"`
    pub table_type: String,
}

impl TableRow {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: schema.into(),
            name: name.into(),
            table_type: "TABLE".to_string(),
        }
    }

    pub fn with_table_type(mut self, table_type: impl Into<String>) -> Self {
        self.table_type = table_type.into();
        self
    }
}

/// Errors that can occur when reading metadata
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// The catalog calls reflection needs from a live connection
///
/// Implementations are blocking; a connection is used by one caller at a
/// time.
pub trait MetadataConnection {
    /// `SQLTables`, optionally restricted to one table name
    fn tables(&mut self, table: Option<&str>) -> Result<Vec<TableRow>, FetchError>;

    /// `SQLColumns` for a table, in ordinal order
    fn columns(
        &mut self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<DriverTypeReport>, FetchError>;

    /// Name of the database the connection is using
    fn current_database(&mut self) -> Result<String, FetchError>;

    /// Switch the connection to another database
    fn use_database(&mut self, database: &str) -> Result<(), FetchError>;
}

impl<C: MetadataConnection + ?Sized> MetadataConnection for &mut C {
    fn tables(&mut self, table: Option<&str>) -> Result<Vec<TableRow>, FetchError> {
        (**self).tables(table)
    }

    fn columns(
        &mut self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<DriverTypeReport>, FetchError> {
        (**self).columns(table, schema)
    }

    fn current_database(&mut self) -> Result<String, FetchError> {
        (**self).current_database()
    }

    fn use_database(&mut self, database: &str) -> Result<(), FetchError> {
        (**self).use_database(database)
    }
}
