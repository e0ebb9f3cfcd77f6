//! Identifier quoting
//!
//! Names are quoted with `"` when the server would otherwise misread them.
//! Embedded quotes are passed through untouched; the driver does not accept
//! an escaped form.

use crate::dialect::MAX_IDENTIFIER_LENGTH;
use crate::error::CompileError;
use gpudb_core::DialectConfig;
use regex::Regex;
use std::sync::OnceLock;

/// Words that must be quoted when used as identifiers (sorted, lowercase)
pub const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "authorization", "backup", "begin",
    "between", "break", "browse", "bulk", "by", "cascade", "case", "check", "checkpoint",
    "close", "clustered", "coalesce", "collate", "column", "commit", "compute",
    "constraint", "contains", "containstable", "continue", "convert", "create", "cross",
    "current", "current_date", "current_time", "current_timestamp", "current_user",
    "cursor", "database", "dbcc", "deallocate", "declare", "default", "delete", "deny",
    "desc", "disk", "distinct", "distributed", "double", "drop", "dump", "else", "end",
    "errlvl", "escape", "except", "exec", "execute", "exists", "exit", "external", "fetch",
    "file", "fillfactor", "for", "foreign", "freetext", "freetexttable", "from", "full",
    "function", "goto", "grant", "group", "having", "holdlock", "identity",
    "identity_insert", "identitycol", "if", "in", "index", "inner", "insert", "intersect",
    "into", "is", "join", "key", "kill", "left", "like", "lineno", "load", "merge",
    "national", "nocheck", "nonclustered", "not", "null", "nullif", "of", "off", "offsets",
    "on", "open", "opendatasource", "openquery", "openrowset", "openxml", "option", "or",
    "order", "outer", "over", "percent", "pivot", "plan", "precision", "primary", "print",
    "proc", "procedure", "public", "raiserror", "read", "readtext", "reconfigure",
    "references", "replication", "restore", "restrict", "return", "revert", "revoke",
    "right", "rollback", "rowcount", "rowguidcol", "rule", "save", "schema",
    "securityaudit", "select", "session_user", "set", "setuser", "shutdown", "some",
    "statistics", "system_user", "table", "tablesample", "textsize", "then", "to", "top",
    "tran", "transaction", "trigger", "truncate", "tsequal", "union", "unique", "unpivot",
    "update", "updatetext", "use", "user", "values", "varying", "view", "waitfor", "when",
    "where", "while", "with", "writetext",
];

fn legal_characters() -> &'static Regex {
    static LEGAL: OnceLock<Regex> = OnceLock::new();
    LEGAL.get_or_init(|| Regex::new(r"^[A-Za-z0-9_$]+$").expect("static pattern"))
}

/// Check whether a word is reserved (case-insensitive)
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS
        .binary_search(&word.to_lowercase().as_str())
        .is_ok()
}

/// Quotes identifiers for the Kinetica dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierPreparer {
    max_identifier_length: usize,
}

impl IdentifierPreparer {
    pub fn new() -> Self {
        Self {
            max_identifier_length: MAX_IDENTIFIER_LENGTH,
        }
    }

    /// Preparer honoring the configured identifier length
    pub fn from_config(config: &DialectConfig) -> Self {
        Self::new().with_max_identifier_length(config.max_identifier_length)
    }

    pub fn with_max_identifier_length(mut self, max: usize) -> Self {
        self.max_identifier_length = max;
        self
    }

    pub fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    /// Whether `value` has to be quoted to survive as written
    ///
    /// True for reserved words, names with characters outside
    /// `[A-Za-z0-9_$]`, names starting with a digit or `$`, and names that
    /// are not all lower case.
    pub fn requires_quotes(&self, value: &str) -> bool {
        let lower = value.to_lowercase();

        is_reserved(&lower)
            || value.starts_with(|c: char| c.is_ascii_digit() || c == '$')
            || !legal_characters().is_match(value)
            || lower != value
    }

    pub fn quote(&self, value: &str) -> String {
        if self.requires_quotes(value) {
            format!("\"{}\"", value)
        } else {
            value.to_string()
        }
    }

    /// Quote each dot-separated part of a schema name
    pub fn quote_schema(&self, schema: &str) -> String {
        schema
            .split('.')
            .map(|part| self.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render a possibly schema-qualified table name
    pub fn format_table(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) if !schema.is_empty() => {
                format!("{}.{}", self.quote_schema(schema), self.quote(table))
            }
            _ => self.quote(table),
        }
    }

    /// Reject names longer than the server accepts
    pub fn validate_length(&self, value: &str) -> Result<(), CompileError> {
        if value.chars().count() > self.max_identifier_length {
            return Err(CompileError::IdentifierTooLong {
                name: value.to_string(),
                max: self.max_identifier_length,
            });
        }
        Ok(())
    }
}

impl Default for IdentifierPreparer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_sorted() {
        let mut sorted = RESERVED_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_WORDS);
    }

    #[test]
    fn reserved_lookup_ignores_case() {
        assert!(is_reserved("select"));
        assert!(is_reserved("TOP"));
        assert!(is_reserved("identity_insert"));
        assert!(!is_reserved("users"));
    }

    #[test]
    fn plain_names_stay_bare() {
        let preparer = IdentifierPreparer::new();
        assert_eq!(preparer.quote("users"), "users");
        assert_eq!(preparer.quote("order_total$"), "order_total$");
    }

    #[test]
    fn names_needing_quotes() {
        let preparer = IdentifierPreparer::new();
        assert_eq!(preparer.quote("order"), "\"order\"");
        assert_eq!(preparer.quote("UserName"), "\"UserName\"");
        assert_eq!(preparer.quote("1st"), "\"1st\"");
        assert_eq!(preparer.quote("$tmp"), "\"$tmp\"");
        assert_eq!(preparer.quote("first name"), "\"first name\"");
        assert_eq!(preparer.quote("a\"b"), "\"a\"b\"");
    }

    #[test]
    fn schema_parts_are_quoted_separately() {
        let preparer = IdentifierPreparer::new();
        assert_eq!(preparer.quote_schema("ki_home.Sales"), "ki_home.\"Sales\"");
        assert_eq!(preparer.format_table(Some("ki_home"), "table"), "ki_home.\"table\"");
        assert_eq!(preparer.format_table(None, "events"), "events");
        assert_eq!(preparer.format_table(Some(""), "events"), "events");
    }

    #[test]
    fn length_limit_from_config() {
        let config = DialectConfig::from_toml("max_identifier_length = 8").unwrap();
        let preparer = IdentifierPreparer::from_config(&config);

        assert_eq!(preparer.max_identifier_length(), 8);
        assert!(preparer.validate_length("customer").is_ok());
        assert!(matches!(
            preparer.validate_length("customers"),
            Err(CompileError::IdentifierTooLong { max: 8, .. })
        ));
        assert_eq!(
            IdentifierPreparer::from_config(&DialectConfig::default()).max_identifier_length(),
            MAX_IDENTIFIER_LENGTH
        );
    }

    #[test]
    fn identifier_length_limit() {
        let preparer = IdentifierPreparer::new().with_max_identifier_length(4);
        assert!(preparer.validate_length("abcd").is_ok());
        assert!(matches!(
            preparer.validate_length("abcde"),
            Err(CompileError::IdentifierTooLong { max: 4, .. })
        ));
    }
}
