//! Statement compilation for Kinetica
//!
//! Walks a parsed statement bottom-up and rewrites the constructs the server
//! does not accept: LIMIT/OFFSET, ORDER BY in nested queries, locking
//! clauses, boolean literals, `||` and a few function names.

use crate::error::CompileError;
use crate::pagination::{self, PaginationRewriter};
use crate::parser::SqlParser;
use gpudb_core::{Diagnostic, DiagnosticCode, Severity};
use sqlparser::ast::{
    BinaryOperator, Expr, Ident, ObjectName, Query, SetExpr, Statement, Value, VisitMut,
    VisitorMut,
};
use std::ops::ControlFlow;

/// A statement ready to be sent to Kinetica
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub statement: Statement,

    /// Rendered SQL text
    pub sql: String,

    /// True when some query in the statement went through the row-number rewrite
    pub paginated: bool,

    /// One entry per rewritten query
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles statements into the Kinetica dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementCompiler {
    parser: SqlParser,
    rewriter: PaginationRewriter,
}

impl StatementCompiler {
    pub fn new() -> Self {
        Self {
            parser: SqlParser::new(),
            rewriter: PaginationRewriter::new(),
        }
    }

    pub fn compile(&self, mut statement: Statement) -> Result<CompiledStatement, CompileError> {
        let mut visitor = DialectVisitor {
            parser: &self.parser,
            rewriter: &self.rewriter,
            depth: 0,
            paginated: false,
            diagnostics: Vec::new(),
        };

        if let ControlFlow::Break(err) = statement.visit(&mut visitor) {
            return Err(err);
        }

        let sql = statement.to_string();
        tracing::debug!(paginated = visitor.paginated, sql = %sql, "Compiled statement");

        Ok(CompiledStatement {
            statement,
            sql,
            paginated: visitor.paginated,
            diagnostics: visitor.diagnostics,
        })
    }

    /// Parse `sql` and compile every statement in it
    pub fn compile_sql(&self, sql: &str) -> Result<Vec<CompiledStatement>, CompileError> {
        self.parser
            .parse(sql)?
            .into_iter()
            .map(|statement| self.compile(statement))
            .collect()
    }
}

struct DialectVisitor<'a> {
    parser: &'a SqlParser,
    rewriter: &'a PaginationRewriter,

    /// Number of enclosing queries of the query being visited
    depth: usize,

    paginated: bool,
    diagnostics: Vec<Diagnostic>,
}

fn has_top(query: &Query) -> bool {
    matches!(query.body.as_ref(), SetExpr::Select(select) if select.top.is_some())
}

fn is_placeholder(expr: &Expr) -> bool {
    matches!(expr, Expr::Value(Value::Placeholder(_)))
}

impl DialectVisitor<'_> {
    fn compile_query(&mut self, query: &mut Query) -> Result<(), CompileError> {
        if !query.locks.is_empty() {
            tracing::trace!("Dropping locking clause");
            query.locks.clear();
        }

        if pagination::needs_rewrite(query) && !pagination::is_rewritten(query) {
            let rewrite = self.rewriter.rewrite(query.clone())?;
            if rewrite.is_rewritten() {
                tracing::trace!(depth = self.depth, "Emulating LIMIT/OFFSET with ROW_NUMBER()");
                self.paginated = true;
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::PaginationRewritten,
                    Severity::Info,
                    "LIMIT/OFFSET emulated with ROW_NUMBER()",
                ));
            }
            *query = rewrite.into_query();
            return Ok(());
        }

        // Only a literal OFFSET 0 can be left at this point
        query.offset = None;

        if let Some(limit) = query.limit.as_ref().and_then(pagination::simple_int) {
            match query.body.as_mut() {
                SetExpr::Select(select) if select.top.is_none() => {
                    tracing::trace!(limit, "Rendering LIMIT as TOP");
                    select.top = Some(self.parser.top(limit)?);
                    query.limit = None;
                }
                SetExpr::Select(_) => {
                    return Err(CompileError::UnsupportedPagination(
                        "a SELECT cannot carry both TOP and LIMIT".to_string(),
                    ))
                }
                _ => {
                    return Err(CompileError::UnsupportedPagination(
                        "a LIMIT on a set operation cannot be expressed".to_string(),
                    ))
                }
            }
        }

        if self.depth > 0
            && query.order_by.is_some()
            && query.limit.is_none()
            && query.fetch.is_none()
            && !has_top(query)
        {
            tracing::trace!(depth = self.depth, "Dropping ORDER BY of nested query");
            query.order_by = None;
        }

        Ok(())
    }

    fn compile_expr(&mut self, expr: &mut Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Value(Value::Boolean(value)) => {
                let digit = if *value { "1" } else { "0" };
                *expr = Expr::Value(Value::Number(digit.to_string(), false));
            }
            Expr::BinaryOp { op, .. } if *op == BinaryOperator::StringConcat => {
                *op = BinaryOperator::Plus;
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } if is_placeholder(&**left) && !is_placeholder(&**right) => {
                std::mem::swap(left, right);
            }
            Expr::Function(function) => {
                let name = function.name.to_string().to_uppercase();

                match name.as_str() {
                    "NOW" => *expr = self.parser.parse_expr("CURRENT_TIMESTAMP")?,
                    "CURRENT_DATE" => *expr = self.parser.parse_expr("GETDATE()")?,
                    "LENGTH" | "CHAR_LENGTH" => {
                        function.name = ObjectName(vec![Ident::new("LEN")]);
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl VisitorMut for DialectVisitor<'_> {
    type Break = CompileError;

    fn pre_visit_query(&mut self, _query: &mut Query) -> ControlFlow<Self::Break> {
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;

        match self.compile_query(query) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => ControlFlow::Break(err),
        }
    }

    fn post_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match self.compile_expr(expr) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => ControlFlow::Break(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(sql: &str) -> CompiledStatement {
        let mut statements = StatementCompiler::new().compile_sql(sql).unwrap();
        assert_eq!(statements.len(), 1);
        statements.remove(0)
    }

    #[test]
    fn plain_query_is_untouched() {
        let compiled = compile("SELECT a, b FROM t WHERE a > 1 ORDER BY b");
        assert_eq!(compiled.sql, "SELECT a, b FROM t WHERE a > 1 ORDER BY b");
        assert!(!compiled.paginated);
    }

    #[test]
    fn simple_limit_becomes_top() {
        let compiled = compile("SELECT a FROM t ORDER BY a LIMIT 5");
        assert_eq!(compiled.sql, "SELECT TOP 5 a FROM t ORDER BY a");
        assert!(!compiled.paginated);
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn distinct_precedes_top() {
        let compiled = compile("SELECT DISTINCT a FROM t LIMIT 3");
        assert_eq!(compiled.sql, "SELECT DISTINCT TOP 3 a FROM t");
    }

    #[test]
    fn zero_offset_is_dropped() {
        let compiled = compile("SELECT a FROM t LIMIT 5 OFFSET 0");
        assert_eq!(compiled.sql, "SELECT TOP 5 a FROM t");
    }

    #[test]
    fn offset_is_paginated() {
        let compiled = compile("SELECT a FROM t ORDER BY a LIMIT 10 OFFSET 5");
        assert!(compiled.paginated);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].code, DiagnosticCode::PaginationRewritten);
        assert_eq!(
            compiled.sql,
            "SELECT gpudb_paged.a FROM \
             (SELECT a, ROW_NUMBER() OVER (ORDER BY a) AS gpudb_rn FROM t) AS gpudb_paged \
             WHERE gpudb_rn > 5 AND gpudb_rn <= 15"
        );
    }

    #[test]
    fn offset_without_order_by_fails() {
        let result = StatementCompiler::new().compile_sql("SELECT a FROM t OFFSET 5");
        assert!(matches!(result, Err(CompileError::MissingOrderBy)));
    }

    #[test]
    fn limit_on_union_fails() {
        let result = StatementCompiler::new().compile_sql("SELECT a FROM t UNION SELECT a FROM u LIMIT 5");
        assert!(matches!(result, Err(CompileError::UnsupportedPagination(_))));
    }

    #[test]
    fn nested_order_by_is_removed() {
        let compiled = compile("SELECT s.a FROM (SELECT a FROM t ORDER BY a) AS s");
        assert_eq!(compiled.sql, "SELECT s.a FROM (SELECT a FROM t) AS s");
    }

    #[test]
    fn nested_order_by_with_limit_is_kept() {
        let compiled = compile("SELECT s.a FROM (SELECT a FROM t ORDER BY a LIMIT 2) AS s");
        assert_eq!(compiled.sql, "SELECT s.a FROM (SELECT TOP 2 a FROM t ORDER BY a) AS s");
    }

    #[test]
    fn cte_order_by_is_removed() {
        let compiled = compile("WITH c AS (SELECT a FROM t ORDER BY a) SELECT a FROM c ORDER BY a");
        assert_eq!(compiled.sql, "WITH c AS (SELECT a FROM t) SELECT a FROM c ORDER BY a");
    }

    #[test]
    fn nested_pagination_is_rewritten_in_place() {
        let compiled = compile("SELECT s.a FROM (SELECT a FROM t ORDER BY a OFFSET 4) AS s");
        assert!(compiled.paginated);
        assert!(compiled.sql.starts_with("SELECT s.a FROM (SELECT gpudb_paged.a FROM (SELECT a, ROW_NUMBER()"));
        assert!(compiled.sql.ends_with("WHERE gpudb_rn > 4) AS s"));
        assert!(compiled.diagnostics.iter().all(|d| d.severity == Severity::Info));
    }

    #[test]
    fn locking_clause_is_dropped() {
        let compiled = compile("SELECT a FROM t WHERE a = 1 FOR UPDATE");
        assert_eq!(compiled.sql, "SELECT a FROM t WHERE a = 1");
    }

    #[test]
    fn booleans_become_integers() {
        let compiled = compile("SELECT a FROM t WHERE active = TRUE AND deleted = false");
        assert_eq!(compiled.sql, "SELECT a FROM t WHERE active = 1 AND deleted = 0");
    }

    #[test]
    fn concatenation_uses_plus() {
        let compiled = compile("SELECT first_name || ' ' || last_name FROM people");
        assert_eq!(compiled.sql, "SELECT first_name + ' ' + last_name FROM people");
    }

    #[test]
    fn placeholder_moves_right_of_equals() {
        let compiled = compile("SELECT a FROM t WHERE ? = a");
        assert_eq!(compiled.sql, "SELECT a FROM t WHERE a = ?");

        let untouched = compile("SELECT a FROM t WHERE ? = ?");
        assert_eq!(untouched.sql, "SELECT a FROM t WHERE ? = ?");
    }

    #[test]
    fn function_renames() {
        let compiled = compile("SELECT NOW(), LENGTH(title), char_length(title) FROM t");
        assert_eq!(compiled.sql, "SELECT CURRENT_TIMESTAMP, LEN(title), LEN(title) FROM t");

        let compiled = compile("SELECT a FROM t WHERE d < CURRENT_DATE");
        assert_eq!(compiled.sql, "SELECT a FROM t WHERE d < GETDATE()");
    }

    #[test]
    fn compile_is_stable_on_its_own_output() {
        let compiler = StatementCompiler::new();
        let first = compile("SELECT a FROM t WHERE flag = TRUE ORDER BY a LIMIT 10 OFFSET 5");

        let second = compiler.compile(first.statement.clone()).unwrap();
        assert_eq!(second.sql, first.sql);
        assert!(!second.paginated);
    }

    #[test]
    fn every_statement_is_compiled() {
        let statements = StatementCompiler::new()
            .compile_sql("SELECT a FROM t LIMIT 1; SELECT b FROM u WHERE b = TRUE")
            .unwrap();
        let sql: Vec<_> = statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(sql, vec!["SELECT TOP 1 a FROM t", "SELECT b FROM u WHERE b = 1"]);
    }

    #[test]
    fn statements_from_other_dialects_are_paginated() {
        let statement = sqlparser::parser::Parser::parse_sql(
            &sqlparser::dialect::MySqlDialect {},
            "SELECT `a`, `b` FROM `t` ORDER BY `a` LIMIT 10 OFFSET 5",
        )
        .unwrap()
        .remove(0);

        let compiled = StatementCompiler::new().compile(statement).unwrap();
        assert!(compiled.paginated);
        assert!(compiled.sql.contains("ROW_NUMBER() OVER (ORDER BY `a`) AS gpudb_rn"));
        assert!(compiled.sql.ends_with("WHERE gpudb_rn > 5 AND gpudb_rn <= 15"));
    }
}
