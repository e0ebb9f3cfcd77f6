//! ODBC connection through the Kinetica driver
//!
//! Reflection only needs the catalog functions (`SQLTables`, `SQLColumns`)
//! plus `DB_NAME()` and `USE`. Results are read as text through a bound
//! row set buffer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let connection = OdbcConnection::connect(
//!     "Driver={KineticaODBC};URL=http://localhost:9191;UID=admin;PWD=secret"
//! )?;
//! ```

use crate::connection::{FetchError, MetadataConnection, TableRow};
use gpudb_core::{DialectConfig, DriverTypeReport};

#[cfg(feature = "odbc")]
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment};

#[cfg(feature = "odbc")]
use std::sync::OnceLock;

/// Rows fetched per round trip
#[cfg(feature = "odbc")]
const BATCH_SIZE: usize = 256;

/// Upper bound for a single text cell
#[cfg(feature = "odbc")]
const MAX_TEXT_LENGTH: usize = 4096;

// SQLColumns result columns (0-based)
#[cfg(feature = "odbc")]
const COLUMN_NAME: usize = 3;
#[cfg(feature = "odbc")]
const TYPE_NAME: usize = 5;
#[cfg(feature = "odbc")]
const COLUMN_SIZE: usize = 6;
#[cfg(feature = "odbc")]
const NULLABLE: usize = 10;

/// ODBC nullability when the driver reports none (`SQL_NULLABLE_UNKNOWN`)
#[cfg(feature = "odbc")]
const NULLABLE_UNKNOWN: i16 = 2;

/// Metadata connection backed by an ODBC driver
pub struct OdbcConnection {
    #[cfg(feature = "odbc")]
    connection: odbc_api::Connection<'static>,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "odbc"))]
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(feature = "odbc")]
fn environment() -> Result<&'static Environment, FetchError> {
    static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

    if let Some(environment) = ENVIRONMENT.get() {
        return Ok(environment);
    }

    let environment = Environment::new().map_err(|e| {
        FetchError::ConfigError(format!(
            "Failed to create ODBC environment: {}. Make sure the Kinetica ODBC driver is installed.",
            e
        ))
    })?;

    Ok(ENVIRONMENT.get_or_init(|| environment))
}

#[cfg(feature = "odbc")]
fn query_error(e: odbc_api::Error) -> FetchError {
    FetchError::QueryError(e.to_string())
}

/// Read every row of a cursor as text cells
#[cfg(feature = "odbc")]
fn read_text_rows(mut cursor: impl Cursor) -> Result<Vec<Vec<Option<String>>>, FetchError> {
    let columns = cursor.num_result_cols().map_err(query_error)? as usize;

    let mut buffers =
        TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LENGTH)).map_err(query_error)?;
    let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(query_error)?;

    let mut rows = Vec::new();
    while let Some(batch) = row_cursor.fetch().map_err(query_error)? {
        for row in 0..batch.num_rows() {
            rows.push(
                (0..columns)
                    .map(|column| {
                        batch
                            .at(column, row)
                            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                    })
                    .collect(),
            );
        }
    }

    Ok(rows)
}

#[cfg(feature = "odbc")]
fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index).and_then(|value| value.as_deref())
}

#[cfg(feature = "odbc")]
fn required_cell(row: &[Option<String>], index: usize, name: &str) -> Result<String, FetchError> {
    cell(row, index)
        .map(str::to_string)
        .ok_or_else(|| FetchError::InvalidResponse(format!("Catalog row without {}", name)))
}

impl OdbcConnection {
    /// Connect with an ODBC connection string
    #[cfg(feature = "odbc")]
    pub fn connect(connection_string: &str) -> Result<Self, FetchError> {
        Self::connect_with_config(connection_string, &DialectConfig::default())
    }

    /// Connect, applying the login timeout from `config`
    #[cfg(feature = "odbc")]
    pub fn connect_with_config(connection_string: &str, config: &DialectConfig) -> Result<Self, FetchError> {
        let options = ConnectionOptions {
            login_timeout_sec: (config.login_timeout > 0).then_some(config.login_timeout),
            ..ConnectionOptions::default()
        };

        let connection = environment()?
            .connect_with_connection_string(connection_string, options)
            .map_err(|e| FetchError::ConnectionError(format!("Failed to connect via ODBC: {}", e)))?;

        tracing::debug!("Connected to Kinetica via ODBC");

        Ok(Self { connection })
    }

    /// Create connection without odbc feature (returns error)
    #[cfg(not(feature = "odbc"))]
    pub fn connect(_connection_string: &str) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(
            "ODBC support not compiled. Rebuild with: cargo build --features odbc".to_string(),
        ))
    }

    /// Create connection without odbc feature (returns error)
    #[cfg(not(feature = "odbc"))]
    pub fn connect_with_config(_connection_string: &str, _config: &DialectConfig) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(
            "ODBC support not compiled. Rebuild with: cargo build --features odbc".to_string(),
        ))
    }

    #[cfg(feature = "odbc")]
    fn query_rows(&self, sql: &str) -> Result<Vec<Vec<Option<String>>>, FetchError> {
        match self.connection.execute(sql, ()).map_err(query_error)? {
            Some(cursor) => read_text_rows(cursor),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(feature = "odbc")]
impl MetadataConnection for OdbcConnection {
    fn tables(&mut self, table: Option<&str>) -> Result<Vec<TableRow>, FetchError> {
        let cursor = self
            .connection
            .tables("", "%", table.unwrap_or("%"), "")
            .map_err(query_error)?;

        read_text_rows(cursor)?
            .iter()
            .map(|row| {
                Ok(TableRow {
                    catalog: cell(row, 0).map(str::to_string),
                    schema: cell(row, 1).unwrap_or_default().to_string(),
                    name: required_cell(row, 2, "TABLE_NAME")?,
                    table_type: cell(row, 3).unwrap_or("TABLE").to_string(),
                })
            })
            .collect()
    }

    fn columns(
        &mut self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<DriverTypeReport>, FetchError> {
        let cursor = self
            .connection
            .columns("", schema.unwrap_or("%"), table, "%")
            .map_err(query_error)?;

        read_text_rows(cursor)?
            .iter()
            .map(|row| {
                Ok(DriverTypeReport::new(
                    required_cell(row, COLUMN_NAME, "COLUMN_NAME")?,
                    required_cell(row, TYPE_NAME, "TYPE_NAME")?,
                    cell(row, COLUMN_SIZE).and_then(|size| size.trim().parse().ok()),
                    cell(row, NULLABLE)
                        .and_then(|flag| flag.trim().parse().ok())
                        .unwrap_or(NULLABLE_UNKNOWN),
                ))
            })
            .collect()
    }

    fn current_database(&mut self) -> Result<String, FetchError> {
        self.query_rows("SELECT DB_NAME()")?
            .first()
            .and_then(|row| cell(row, 0))
            .map(str::to_string)
            .ok_or_else(|| FetchError::InvalidResponse("DB_NAME() returned no value".to_string()))
    }

    fn use_database(&mut self, database: &str) -> Result<(), FetchError> {
        self.query_rows(&format!("USE {}", database))?;
        Ok(())
    }
}

#[cfg(not(feature = "odbc"))]
impl MetadataConnection for OdbcConnection {
    fn tables(&mut self, _table: Option<&str>) -> Result<Vec<TableRow>, FetchError> {
        Err(FetchError::ConfigError("ODBC support not compiled".to_string()))
    }

    fn columns(
        &mut self,
        _table: &str,
        _schema: Option<&str>,
    ) -> Result<Vec<DriverTypeReport>, FetchError> {
        Err(FetchError::ConfigError("ODBC support not compiled".to_string()))
    }

    fn current_database(&mut self) -> Result<String, FetchError> {
        Err(FetchError::ConfigError("ODBC support not compiled".to_string()))
    }

    fn use_database(&mut self, _database: &str) -> Result<(), FetchError> {
        Err(FetchError::ConfigError("ODBC support not compiled".to_string()))
    }
}
