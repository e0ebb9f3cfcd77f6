//! Mock metadata connection for testing
//!
//! Holds tables and their driver column reports in memory and answers the
//! catalog calls the way the Kinetica ODBC driver does: reports come back
//! exactly as stored, unknown tables yield no rows.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gpudb_catalog::{MockConnection, Reflector};
//! use gpudb_core::{DialectConfig, DriverTypeReport};
//!
//! let connection = MockConnection::new().with_table(
//!     "ki_home",
//!     "users",
//!     vec![DriverTypeReport::new("id", "INTEGER", Some(10), 0)],
//! );
//! let mut reflector = Reflector::new(connection, DialectConfig::default());
//! let mapped = reflector.columns("users", Some("ki_home"))?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Every call fails
//! let connection = MockConnection::new().with_connection_failure();
//!
//! // Switching back to "main" fails
//! let connection = MockConnection::new().with_database("main").with_use_failure("main");
//! ```

use crate::connection::{FetchError, MetadataConnection, TableIdentifier, TableRow};
use gpudb_core::DriverTypeReport;
use std::collections::HashMap;

/// In-memory metadata connection
#[derive(Debug, Clone)]
pub struct MockConnection {
    /// Tables in insertion order
    tables: Vec<TableRow>,

    /// Column reports by table FQN
    columns: HashMap<String, Vec<DriverTypeReport>>,

    /// Errors to return for specific tables
    errors: HashMap<String, FetchError>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Current database
    database: String,

    /// Databases that cannot be switched to
    use_failures: Vec<String>,

    /// Every successful `USE`, in order
    use_statements: Vec<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            columns: HashMap::new(),
            errors: HashMap::new(),
            fail_connection: false,
            database: "ki_home".to_string(),
            use_failures: Vec::new(),
            use_statements: Vec::new(),
        }
    }

    /// Add a table with its column reports
    pub fn with_table(mut self, schema: &str, table: &str, columns: Vec<DriverTypeReport>) -> Self {
        self.add_table(schema, table, columns);
        self
    }

    /// Add a table row without columns, e.g. a view
    pub fn with_table_row(mut self, row: TableRow) -> Self {
        self.tables.push(row);
        self
    }

    /// Configure an error to be returned for a specific table
    pub fn with_error_for_table(mut self, table: TableIdentifier, error: FetchError) -> Self {
        self.errors.insert(table.fqn(), error);
        self
    }

    /// Configure every call to fail
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set the current database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Make `USE <database>` fail
    pub fn with_use_failure(mut self, database: impl Into<String>) -> Self {
        self.use_failures.push(database.into());
        self
    }

    pub fn add_table(&mut self, schema: &str, table: &str, columns: Vec<DriverTypeReport>) {
        self.tables.push(TableRow::new(schema, table));
        self.columns
            .insert(TableIdentifier::new(Some(schema), table).fqn(), columns);
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn use_statements(&self) -> &[String] {
        &self.use_statements
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn check_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::ConnectionError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataConnection for MockConnection {
    fn tables(&mut self, table: Option<&str>) -> Result<Vec<TableRow>, FetchError> {
        self.check_connection()?;

        Ok(self
            .tables
            .iter()
            .filter(|row| table.map_or(true, |name| row.name == name))
            .cloned()
            .collect())
    }

    fn columns(
        &mut self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<DriverTypeReport>, FetchError> {
        self.check_connection()?;

        let id = TableIdentifier::new(schema, table);

        // Check for configured errors first
        if let Some(error) = self.errors.get(&id.fqn()) {
            return Err(error.clone());
        }

        let found = match schema {
            Some(_) => self.columns.get(&id.fqn()),
            None => self
                .tables
                .iter()
                .find(|row| row.name == table)
                .and_then(|row| {
                    self.columns
                        .get(&TableIdentifier::new(Some(&row.schema), table).fqn())
                }),
        };

        Ok(found.cloned().unwrap_or_default())
    }

    fn current_database(&mut self) -> Result<String, FetchError> {
        self.check_connection()?;
        Ok(self.database.clone())
    }

    fn use_database(&mut self, database: &str) -> Result<(), FetchError> {
        self.check_connection()?;

        if self.use_failures.iter().any(|name| name == database) {
            return Err(FetchError::QueryError(format!(
                "Cannot switch to database {}",
                database
            )));
        }

        self.use_statements.push(database.to_string());
        self.database = database.to_string();
        Ok(())
    }
}
