//! Driver type name to SqlType mapping
//!
//! The Kinetica ODBC driver reports `TYPE_NAME` strings such as `VARCHAR`,
//! `TYPE_TIMESTAMP` or `IPV4`. They are matched by prefix against an ordered
//! rule table, first match wins, so a longer prefix has to come before any
//! shorter prefix it starts with.

use gpudb_core::{
    ColumnDescriptor, Diagnostic, DiagnosticCode, DriverTypeReport, Severity, SqlType,
    UnsupportedColumnPolicy,
};

/// What a matched rule resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTarget {
    SmallInt,
    Int,
    BigInt,
    Float32,
    Float64,
    Decimal,
    Date,
    Time,
    DateTime,
    VarBinary,

    /// Unbounded VARCHAR with the server collation
    Text,

    /// VARCHAR sized from `COLUMN_SIZE`
    SizedVarchar,
}

impl TypeTarget {
    fn resolve(self, column_size: Option<i32>) -> SqlType {
        match self {
            Self::SmallInt => SqlType::SmallInt,
            Self::Int => SqlType::Int,
            Self::BigInt => SqlType::BigInt,
            Self::Float32 => SqlType::Float32,
            Self::Float64 => SqlType::Float64,
            Self::Decimal => SqlType::Decimal {
                precision: None,
                scale: None,
            },
            Self::Date => SqlType::Date,
            Self::Time => SqlType::Time,
            Self::DateTime => SqlType::DateTime,
            Self::VarBinary => SqlType::VarBinary { length: None },
            Self::Text => SqlType::text(),
            Self::SizedVarchar => match resolve_varchar_length(column_size) {
                Some(length) => SqlType::varchar(length),
                None => SqlType::text(),
            },
        }
    }
}

/// A `TYPE_NAME` prefix and its mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRule {
    pub prefix: &'static str,
    pub target: TypeTarget,
}

const fn rule(prefix: &'static str, target: TypeTarget) -> TypeRule {
    TypeRule { prefix, target }
}

/// Ordered rule table
pub type TypeRuleTable = [TypeRule];

/// Rules for the Kinetica ODBC driver
pub const DEFAULT_RULES: &TypeRuleTable = &[
    rule("BYTES", TypeTarget::VarBinary),
    rule("DOUBLE", TypeTarget::Float64),
    rule("DECIMAL", TypeTarget::Decimal),
    rule("FLOAT", TypeTarget::Float32),
    rule("INTEGER", TypeTarget::Int),
    rule("BIGINT", TypeTarget::BigInt),
    rule("SMALLINT", TypeTarget::SmallInt),
    // No 8-bit type on the server side
    rule("TINYINT", TypeTarget::SmallInt),
    rule("LONG", TypeTarget::BigInt),
    rule("REAL", TypeTarget::Float32),
    rule("TYPE_TIMESTAMP", TypeTarget::DateTime),
    rule("TIMESTAMP", TypeTarget::DateTime),
    rule("DATETIME", TypeTarget::DateTime),
    rule("TYPE_DATE", TypeTarget::Date),
    rule("TYPE_TIME", TypeTarget::Time),
    rule("DATE", TypeTarget::Date),
    rule("IPV4", TypeTarget::Text),
    rule("GEOMETRY", TypeTarget::Text),
    rule("VARCHAR", TypeTarget::SizedVarchar),
];

/// Width of a VARCHAR column from its `COLUMN_SIZE`
///
/// Kinetica's charN widths map to themselves, 255 and 256 map to 256, and
/// anything else is unbounded (`None`).
pub fn resolve_varchar_length(column_size: Option<i32>) -> Option<u32> {
    match column_size? {
        size @ (1 | 2 | 4 | 8 | 16 | 32 | 64 | 128) => Some(size as u32),
        255 | 256 => Some(256),
        _ => None,
    }
}

/// Map one driver type report, `SqlType::Unsupported` when no rule matches
pub fn map_type(rules: &TypeRuleTable, report: &DriverTypeReport) -> SqlType {
    rules
        .iter()
        .find(|rule| report.type_name.starts_with(rule.prefix))
        .map(|rule| rule.target.resolve(report.column_size))
        .unwrap_or(SqlType::Unsupported)
}

/// Columns produced by [`map_columns`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedColumns {
    /// Mapped columns in input order
    pub columns: Vec<ColumnDescriptor>,

    /// Findings for columns that could not be mapped
    pub diagnostics: Vec<Diagnostic>,
}

impl MappedColumns {
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Map a table's driver reports into column descriptors
pub fn map_columns(
    reports: &[DriverTypeReport],
    rules: &TypeRuleTable,
    policy: UnsupportedColumnPolicy,
) -> MappedColumns {
    let mut mapped = MappedColumns::default();

    for report in reports {
        let sql_type = map_type(rules, report);

        if !sql_type.is_supported() {
            let size = report
                .column_size
                .map_or_else(|| "unknown".to_string(), |size| size.to_string());

            tracing::warn!(
                column = %report.column_name,
                type_name = %report.type_name,
                size = %size,
                "Unrecognized column type"
            );

            mapped.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::UnrecognizedColumnType,
                    Severity::Warn,
                    format!(
                        "Did not recognize type '{}' [{}] of column '{}'",
                        report.type_name, size, report.column_name
                    ),
                )
                .with_column(&report.column_name),
            );

            if policy == UnsupportedColumnPolicy::Drop {
                mapped.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::ColumnDropped,
                        Severity::Info,
                        format!("Column '{}' left out of the reflected table", report.column_name),
                    )
                    .with_column(&report.column_name),
                );
                continue;
            }
        }

        mapped.columns.push(
            ColumnDescriptor::new(&report.column_name, sql_type).with_nullable(report.nullable == 1),
        );
    }

    mapped
}
