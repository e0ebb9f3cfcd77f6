//! Table reflection over a metadata connection
//!
//! Schema arguments may name a database as well as an owner
//! (`"db.owner"`). The connection is then switched to that database for the
//! duration of the call and switched back afterwards.

use crate::connection::{FetchError, MetadataConnection};
use crate::typemap::{map_columns, MappedColumns, TypeRuleTable, DEFAULT_RULES};
use gpudb_core::DialectConfig;
use std::collections::BTreeSet;

/// Split a schema argument into `(database, owner)`
///
/// No schema gives the configured default owner; `"db.owner"` splits at the
/// first dot; anything else is an owner in the current database.
pub fn owner_plus_db<'a>(schema: Option<&'a str>, default_schema: &'a str) -> (Option<&'a str>, &'a str) {
    match schema {
        None | Some("") => (None, default_schema),
        Some(schema) => match schema.split_once('.') {
            Some((database, owner)) => (Some(database).filter(|db| !db.is_empty()), owner),
            None => (None, schema),
        },
    }
}

/// Run `operation` with `connection` switched to `database`
///
/// The previous database is restored whether the operation succeeds or not.
/// When both fail the operation's error is returned.
fn switch_db<C, T, F>(connection: &mut C, database: Option<&str>, operation: F) -> Result<T, FetchError>
where
    C: MetadataConnection,
    F: FnOnce(&mut C) -> Result<T, FetchError>,
{
    let Some(database) = database else {
        return operation(connection);
    };

    let previous = connection.current_database()?;
    tracing::debug!(from = %previous, to = %database, "Switching database");
    connection.use_database(database)?;

    let result = operation(connection);
    let restored = connection.use_database(&previous);

    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(restore_err)) => {
            tracing::warn!(database = %previous, error = %restore_err, "Failed to restore database");
            Err(err)
        }
    }
}

/// Primary key of a reflected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyConstraint {
    pub constrained_columns: Vec<String>,
    pub name: String,
}

/// Index of a reflected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Foreign key of a reflected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub constrained_columns: Vec<String>,
    pub referred_schema: Option<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

/// Reflection entry points for one connection
pub struct Reflector<C> {
    connection: C,
    config: DialectConfig,
    rules: &'static TypeRuleTable,
}

impl<C: MetadataConnection> Reflector<C> {
    pub fn new(connection: C, config: DialectConfig) -> Self {
        Self {
            connection,
            config,
            rules: DEFAULT_RULES,
        }
    }

    /// Use another type rule table
    pub fn with_rules(mut self, rules: &'static TypeRuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Run `operation` against the database named by `schema`, if any
    pub fn with_selected_schema<T, F>(&mut self, schema: Option<&str>, operation: F) -> Result<T, FetchError>
    where
        F: FnOnce(&mut C, &str) -> Result<T, FetchError>,
    {
        let (database, owner) = owner_plus_db(schema, &self.config.default_schema);
        switch_db(&mut self.connection, database, |connection| operation(connection, owner))
    }

    /// Columns of `table`, mapped to Kinetica types
    pub fn columns(&mut self, table: &str, schema: Option<&str>) -> Result<MappedColumns, FetchError> {
        tracing::debug!(table, schema, "Reflecting columns");

        let policy = self.config.unsupported_columns;
        let rules = self.rules;

        self.with_selected_schema(schema, |connection, owner| {
            let owner = Some(owner).filter(|owner| !owner.is_empty());
            let reports = connection.columns(table, owner)?;
            Ok(map_columns(&reports, rules, policy))
        })
    }

    pub fn has_table(&mut self, table: &str, schema: Option<&str>) -> Result<bool, FetchError> {
        tracing::debug!(table, schema, "Checking table");

        self.with_selected_schema(schema, |connection, _| {
            Ok(!connection.tables(Some(table))?.is_empty())
        })
    }

    /// Distinct schema names, sorted
    pub fn schema_names(&mut self) -> Result<Vec<String>, FetchError> {
        tracing::debug!("Listing schemas");

        let names: BTreeSet<String> = self
            .connection
            .tables(None)?
            .into_iter()
            .map(|row| row.schema)
            .collect();

        Ok(names.into_iter().collect())
    }

    /// Every table as `"<schema>.<table>"`, sorted
    pub fn table_names(&mut self, schema: Option<&str>) -> Result<Vec<String>, FetchError> {
        tracing::debug!(schema, "Listing tables");

        self.with_selected_schema(schema, |connection, _| {
            let mut names: Vec<String> = connection
                .tables(None)?
                .into_iter()
                .map(|row| format!("{}.{}", row.schema, row.name))
                .collect();
            names.sort();
            Ok(names)
        })
    }

    // The driver exposes no views, indexes or constraints

    pub fn view_names(&mut self, _schema: Option<&str>) -> Result<Vec<String>, FetchError> {
        Ok(Vec::new())
    }

    pub fn indexes(&mut self, _table: &str, _schema: Option<&str>) -> Result<Vec<IndexInfo>, FetchError> {
        Ok(Vec::new())
    }

    pub fn foreign_keys(&mut self, _table: &str, _schema: Option<&str>) -> Result<Vec<ForeignKeyInfo>, FetchError> {
        Ok(Vec::new())
    }

    pub fn pk_constraint(&mut self, _table: &str, _schema: Option<&str>) -> Result<PrimaryKeyConstraint, FetchError> {
        Ok(PrimaryKeyConstraint {
            constrained_columns: Vec::new(),
            name: "pk".to_string(),
        })
    }
}
