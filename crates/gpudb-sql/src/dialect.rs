//! The Kinetica dialect as seen by sqlparser

use sqlparser::dialect::Dialect;

/// Name the dialect reports about itself
pub const DIALECT_NAME: &str = "kinetica";

/// Name under which the dialect is registered for lookup, as in `gpudb+odbc://`
pub const REGISTRY_NAME: &str = "gpudb";

/// Longest identifier the server accepts
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Kinetica SQL dialect
///
/// Identifiers are delimited with double quotes only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GpudbDialect;

impl Dialect for GpudbDialect {
    fn is_delimited_identifier_start(&self, ch: char) -> bool {
        ch == '"'
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '#' || ch == '@'
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_alphabetic()
            || ch.is_ascii_digit()
            || ch == '@'
            || ch == '$'
            || ch == '#'
            || ch == '_'
    }
}

impl GpudbDialect {
    pub fn name(&self) -> &'static str {
        DIALECT_NAME
    }

    /// The server has no BOOLEAN type; booleans are rendered as 1/0
    pub fn supports_native_boolean(&self) -> bool {
        false
    }
}

/// Resolve a registration name (optionally with a `+driver` suffix)
pub fn lookup_dialect(name: &str) -> Option<GpudbDialect> {
    let base = name.split_once('+').map(|(base, _)| base).unwrap_or(name);

    match base.trim().to_ascii_lowercase().as_str() {
        REGISTRY_NAME | DIALECT_NAME => Some(GpudbDialect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_registry_name() {
        assert_eq!(lookup_dialect("gpudb"), Some(GpudbDialect));
        assert_eq!(lookup_dialect("GPUDB+odbc"), Some(GpudbDialect));
        assert_eq!(lookup_dialect("kinetica"), Some(GpudbDialect));
        assert_eq!(lookup_dialect("postgres"), None);
    }

    #[test]
    fn only_double_quotes_delimit() {
        let dialect = GpudbDialect;
        assert!(dialect.is_delimited_identifier_start('"'));
        assert!(!dialect.is_delimited_identifier_start('`'));
        assert!(!dialect.is_delimited_identifier_start('['));
    }

    #[test]
    fn dialect_identity() {
        assert_eq!(GpudbDialect.name(), "kinetica");
        assert!(!GpudbDialect.supports_native_boolean());
    }
}
