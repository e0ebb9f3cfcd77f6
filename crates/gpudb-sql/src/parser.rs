//! SQL parsing with the Kinetica dialect
//!
//! Besides whole statements this parses the small fragments (window
//! expressions, wrapper queries) the rewriters splice into a plan.

use crate::dialect::GpudbDialect;
use crate::error::CompileError;
use sqlparser::ast::{Expr, Query, SetExpr, Statement, Top};
use sqlparser::parser::{Parser, ParserError};

/// SQL parser bound to [`GpudbDialect`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlParser {
    dialect: GpudbDialect,
}

impl SqlParser {
    pub fn new() -> Self {
        Self {
            dialect: GpudbDialect,
        }
    }

    /// Parse SQL text into statements
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, CompileError> {
        Ok(Parser::parse_sql(&self.dialect, sql)?)
    }

    /// Parse SQL text that must hold exactly one query
    pub fn parse_query(&self, sql: &str) -> Result<Query, CompileError> {
        let mut statements = self.parse(sql)?;

        if statements.len() != 1 {
            return Err(ParserError::ParserError(format!(
                "Expected a single query, found {} statements",
                statements.len()
            ))
            .into());
        }

        match statements.remove(0) {
            Statement::Query(query) => Ok(*query),
            other => Err(ParserError::ParserError(format!("Expected a query, found: {}", other)).into()),
        }
    }

    /// Parse a standalone expression
    pub fn parse_expr(&self, sql: &str) -> Result<Expr, CompileError> {
        let mut parser = Parser::new(&self.dialect).try_with_sql(sql)?;
        Ok(parser.parse_expr()?)
    }

    /// Build the `TOP n` clause of a SELECT
    pub fn top(&self, quantity: u64) -> Result<Top, CompileError> {
        let query = self.parse_query(&format!("SELECT TOP {} NULL", quantity))?;

        match *query.body {
            SetExpr::Select(select) => select.top.ok_or_else(|| {
                CompileError::Parse(ParserError::ParserError("TOP clause was not parsed".to_string()))
            }),
            _ => Err(CompileError::Parse(ParserError::ParserError(
                "TOP template is not a SELECT".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_select() {
        let parser = SqlParser::new();
        let statements = parser.parse("SELECT id, name FROM users WHERE active = 1").unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::Query(_)));
    }

    #[test]
    fn parse_quoted_identifiers() {
        let parser = SqlParser::new();
        let query = parser.parse_query(r#"SELECT "Name" FROM "ki_home"."Users""#).unwrap();
        assert_eq!(query.to_string(), r#"SELECT "Name" FROM "ki_home"."Users""#);
    }

    #[test]
    fn parse_query_rejects_non_queries() {
        let parser = SqlParser::new();
        assert!(matches!(
            parser.parse_query("DROP TABLE users"),
            Err(CompileError::Parse(_))
        ));
        assert!(matches!(
            parser.parse_query("SELECT 1; SELECT 2"),
            Err(CompileError::Parse(_))
        ));
    }

    #[test]
    fn parse_invalid_sql() {
        let parser = SqlParser::new();
        let result = parser.parse("SELECT FROM WHERE");
        assert!(matches!(result, Err(CompileError::Parse(_))));
    }

    #[test]
    fn parse_window_expression() {
        let parser = SqlParser::new();
        let expr = parser.parse_expr("ROW_NUMBER() OVER (ORDER BY id DESC)").unwrap();
        assert_eq!(expr.to_string(), "ROW_NUMBER() OVER (ORDER BY id DESC)");
    }

    #[test]
    fn build_top_clause() {
        let parser = SqlParser::new();
        let top = parser.top(25).unwrap();
        assert_eq!(top.to_string(), "TOP 25");
    }
}
