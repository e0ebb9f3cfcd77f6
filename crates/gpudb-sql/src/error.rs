//! Compilation errors

use sqlparser::parser::ParserError;

/// Errors raised while turning a statement into Kinetica SQL
///
/// All of these are fatal for the statement being compiled.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Kinetica requires an ORDER BY when using an OFFSET or a non-simple LIMIT clause")]
    MissingOrderBy,

    #[error("Cannot paginate query: {0}")]
    UnsupportedPagination(String),

    #[error("Type {0} cannot be used in DDL")]
    UnsupportedType(String),

    #[error("Identifier exceeds {max} characters: {name}")]
    IdentifierTooLong { name: String, max: usize },

    #[error("SQL parse error: {0}")]
    Parse(#[from] ParserError),
}
