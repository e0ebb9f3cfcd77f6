//! Column types and descriptors produced by table reflection

use serde::{Deserialize, Serialize};

/// Collation the server applies to every character column
pub const DEFAULT_COLLATION: &str = "SQL_Latin1_General_CP1_CI_AS";

/// Semantic column type
///
/// The closed set of types a reflected Kinetica column can resolve to.
/// `None` lengths mean "unbounded" (`max` in DDL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SqlType {
    /// 16-bit signed integer (also used for TINYINT)
    SmallInt,

    /// 32-bit signed integer
    Int,

    /// 64-bit signed integer
    BigInt,

    /// Single precision float
    Float32,

    /// Double precision float
    Float64,

    /// Arbitrary precision decimal
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },

    /// Variable-length character data
    Varchar {
        length: Option<u32>,
        collation: Option<String>,
    },

    /// Date without time component
    Date,

    /// Time of day
    Time,

    /// Combined date and time
    DateTime,

    /// Variable-length binary data
    VarBinary {
        length: Option<u32>,
    },

    /// Driver type with no known mapping
    Unsupported,
}

impl SqlType {
    /// Unbounded VARCHAR with the server collation
    pub fn text() -> Self {
        Self::Varchar {
            length: None,
            collation: Some(DEFAULT_COLLATION.to_string()),
        }
    }

    /// Bounded VARCHAR with the server collation
    pub fn varchar(length: u32) -> Self {
        Self::Varchar {
            length: Some(length),
            collation: Some(DEFAULT_COLLATION.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Renders the Kinetica DDL spelling of the type
impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Int => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Float32 => write!(f, "FLOAT(24)"),
            Self::Float64 => write!(f, "FLOAT(53)"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            Self::Varchar { length, collation } => {
                match length {
                    Some(n) => write!(f, "VARCHAR({})", n)?,
                    None => write!(f, "VARCHAR(max)")?,
                }
                if let Some(collation) = collation {
                    write!(f, " COLLATE {}", collation)?;
                }
                Ok(())
            }
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::DateTime => write!(f, "DATETIME"),
            Self::VarBinary { length } => match length {
                Some(n) => write!(f, "VARBINARY({})", n),
                None => write!(f, "VARBINARY(max)"),
            },
            Self::Unsupported => write!(f, "NULL"),
        }
    }
}

/// A reflected column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as reported by the driver
    pub name: String,

    /// Resolved semantic type
    pub sql_type: SqlType,

    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Create a non-nullable column
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// One row of the ODBC `SQLColumns` result, reduced to what the mapper reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverTypeReport {
    /// `COLUMN_NAME`
    pub column_name: String,

    /// `TYPE_NAME`, e.g. `"VARCHAR"` or `"TYPE_TIMESTAMP"`
    pub type_name: String,

    /// `COLUMN_SIZE`; NULL when the driver does not report one
    pub column_size: Option<i32>,

    /// `NULLABLE`: 0 = no nulls, 1 = nullable, 2 = unknown
    pub nullable: i16,
}

impl DriverTypeReport {
    pub fn new(
        column_name: impl Into<String>,
        type_name: impl Into<String>,
        column_size: Option<i32>,
        nullable: i16,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            type_name: type_name.into(),
            column_size,
            nullable,
        }
    }
}
