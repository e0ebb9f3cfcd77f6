//! Integration tests for statement compilation

use gpudb_sql::pagination::{is_rewritten, row_numbers};
use gpudb_sql::{CompileError, PageBounds, PaginationRewriter, Rewrite, SqlParser, StatementCompiler};
use pretty_assertions::assert_eq;

fn compile_one(sql: &str) -> Result<String, CompileError> {
    let mut statements = StatementCompiler::new().compile_sql(sql)?;
    assert_eq!(statements.len(), 1, "expected a single statement");
    Ok(statements.remove(0).sql)
}

#[test]
fn page_of_ordered_rows() {
    let sql = compile_one(
        "SELECT id, full_name AS customer FROM ki_home.customers WHERE active = TRUE \
         ORDER BY full_name LIMIT 10 OFFSET 5",
    )
    .unwrap();

    assert_eq!(
        sql,
        "SELECT gpudb_paged.id, gpudb_paged.customer FROM \
         (SELECT id, full_name AS customer, ROW_NUMBER() OVER (ORDER BY full_name) AS gpudb_rn \
         FROM ki_home.customers WHERE active = 1) AS gpudb_paged \
         WHERE gpudb_rn > 5 AND gpudb_rn <= 15"
    );
}

#[test]
fn plans_without_pagination_are_identity() {
    let parser = SqlParser::new();
    let rewriter = PaginationRewriter::new();

    for sql in [
        "SELECT a FROM t",
        "SELECT a FROM t ORDER BY a",
        "SELECT a FROM t ORDER BY a LIMIT 10",
        "SELECT a FROM t LIMIT 3 OFFSET 0",
    ] {
        let plan = parser.parse_query(sql).unwrap();
        assert_eq!(rewriter.rewrite(plan.clone()).unwrap(), Rewrite::Unchanged(plan), "{}", sql);
    }
}

#[test]
fn pagination_requires_ordering() {
    for sql in [
        "SELECT a FROM t OFFSET 5",
        "SELECT a FROM t LIMIT 10 OFFSET 5",
        "SELECT a FROM t LIMIT ?",
    ] {
        assert!(
            matches!(compile_one(sql), Err(CompileError::MissingOrderBy)),
            "{} should need an ORDER BY",
            sql
        );
    }
}

#[test]
fn rewritten_plans_carry_no_limit_or_offset() {
    let parser = SqlParser::new();
    let rewriter = PaginationRewriter::new();

    for sql in [
        "SELECT a FROM t ORDER BY a OFFSET 5",
        "SELECT a FROM t ORDER BY a LIMIT 10 OFFSET 5",
        "SELECT a FROM t ORDER BY a LIMIT ? OFFSET ?",
    ] {
        let rewritten = rewriter.rewrite(parser.parse_query(sql).unwrap()).unwrap();
        assert!(rewritten.is_rewritten(), "{}", sql);

        let query = rewritten.into_query();
        assert!(query.limit.is_none());
        assert!(query.offset.is_none());
        assert!(query.order_by.is_none());
        assert!(is_rewritten(&query));

        // A second pass leaves the plan alone
        assert_eq!(rewriter.rewrite(query.clone()).unwrap(), Rewrite::Unchanged(query));
    }
}

#[test]
fn rewritten_sql_parses_back() {
    let sql = compile_one("SELECT a, b * 2 FROM t ORDER BY b DESC LIMIT ? OFFSET ?").unwrap();
    let reparsed = SqlParser::new().parse_query(&sql).unwrap();
    assert_eq!(reparsed.to_string(), sql);
}

#[test]
fn window_selects_the_requested_page() {
    // Scores arrive unordered; the page is the 6th to 15th lowest
    let scores: Vec<i64> = (0..40).map(|n| (n * 17) % 40).collect();
    let numbers = row_numbers(&scores, |score| *score);
    let bounds = PageBounds::new(Some(10), Some(5));

    let mut page: Vec<i64> = scores
        .iter()
        .zip(&numbers)
        .filter(|(_, rn)| bounds.contains(**rn))
        .map(|(score, _)| *score)
        .collect();
    page.sort_unstable();

    assert_eq!(page, (5..15).collect::<Vec<i64>>());
}

#[test]
fn compiles_insert_from_paged_select() {
    let sql = compile_one("INSERT INTO archive (a) SELECT a FROM t ORDER BY a LIMIT 100").unwrap();
    assert_eq!(sql, "INSERT INTO archive (a) SELECT TOP 100 a FROM t ORDER BY a");
}

#[test]
fn subquery_expression_loses_ordering() {
    let sql = compile_one("SELECT a FROM t WHERE a IN (SELECT b FROM u ORDER BY b)").unwrap();
    assert_eq!(sql, "SELECT a FROM t WHERE a IN (SELECT b FROM u)");
}
