//! DDL rendering for Kinetica tables and indexes

use crate::error::CompileError;
use crate::preparer::IdentifierPreparer;
use gpudb_core::SqlType;

/// Auto-increment settings of an identity column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity {
    /// First value; defaults to 1
    pub start: Option<i64>,

    /// Step; defaults to 1
    pub increment: Option<i64>,
}

impl Identity {
    pub fn new(start: i64, increment: i64) -> Self {
        Self {
            start: Some(start),
            increment: Some(increment),
        }
    }
}

/// A column to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    pub identity: Option<Identity>,

    /// Default value, already rendered as SQL
    pub default: Option<String>,
}

impl ColumnSpec {
    /// Create a nullable column
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
            primary_key: false,
            identity: None,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// An index to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

fn checked_name(preparer: &IdentifierPreparer, name: &str) -> Result<String, CompileError> {
    preparer.validate_length(name)?;
    Ok(preparer.quote(name))
}

/// Render one column of a CREATE TABLE
///
/// `<name> <type> NOT NULL|NULL [IDENTITY(start,increment) | DEFAULT <expr>]`
pub fn column_specification(
    preparer: &IdentifierPreparer,
    column: &ColumnSpec,
) -> Result<String, CompileError> {
    if !column.sql_type.is_supported() {
        return Err(CompileError::UnsupportedType(format!(
            "{} (column {})",
            column.sql_type, column.name
        )));
    }

    let mut spec = format!("{} {}", checked_name(preparer, &column.name)?, column.sql_type);

    if !column.nullable || column.primary_key || column.identity.is_some() {
        spec.push_str(" NOT NULL");
    } else {
        spec.push_str(" NULL");
    }

    match (&column.identity, &column.default) {
        (Some(identity), _) => {
            let start = identity.start.unwrap_or(1);
            let increment = identity.increment.unwrap_or(1);
            spec.push_str(&format!(" IDENTITY({},{})", start, increment));
        }
        (None, Some(default)) => {
            spec.push_str(" DEFAULT ");
            spec.push_str(default);
        }
        (None, None) => {}
    }

    Ok(spec)
}

/// Render a CREATE TABLE statement
///
/// Primary key columns are collected into a trailing
/// `CONSTRAINT <table>_pk PRIMARY KEY (...)`.
pub fn create_table(
    preparer: &IdentifierPreparer,
    schema: Option<&str>,
    table: &str,
    columns: &[ColumnSpec],
) -> Result<String, CompileError> {
    preparer.validate_length(table)?;

    let mut parts = columns
        .iter()
        .map(|column| column_specification(preparer, column))
        .collect::<Result<Vec<_>, _>>()?;

    let keys: Vec<String> = columns
        .iter()
        .filter(|column| column.primary_key)
        .map(|column| preparer.quote(&column.name))
        .collect();

    if !keys.is_empty() {
        let constraint = checked_name(preparer, &format!("{}_pk", table))?;
        parts.push(format!("CONSTRAINT {} PRIMARY KEY ({})", constraint, keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} (\n\t{}\n)",
        preparer.format_table(schema, table),
        parts.join(",\n\t")
    ))
}

pub fn create_index(
    preparer: &IdentifierPreparer,
    schema: Option<&str>,
    table: &str,
    index: &IndexSpec,
) -> Result<String, CompileError> {
    let columns = index
        .columns
        .iter()
        .map(|column| preparer.quote(column))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "CREATE {}INDEX {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        checked_name(preparer, &index.name)?,
        preparer.format_table(schema, table),
        columns
    ))
}

pub fn drop_index(
    preparer: &IdentifierPreparer,
    schema: Option<&str>,
    table: &str,
    index: &str,
) -> String {
    format!(
        "DROP INDEX {} ON {}",
        preparer.quote(index),
        preparer.format_table(schema, table)
    )
}
