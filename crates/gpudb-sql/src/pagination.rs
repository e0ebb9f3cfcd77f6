//! LIMIT/OFFSET emulation
//!
//! Kinetica renders a plain integer limit as `TOP n`. Anything else (an
//! offset, a bound parameter, an expression) is emulated by numbering the
//! rows with `ROW_NUMBER()` inside a derived table and filtering on the
//! number outside it:
//!
//! ```text
//! SELECT a, b FROM t ORDER BY a LIMIT 10 OFFSET 5
//!
//! SELECT gpudb_paged.a, gpudb_paged.b
//! FROM (SELECT a, b, ROW_NUMBER() OVER (ORDER BY a) AS gpudb_rn FROM t) AS gpudb_paged
//! WHERE gpudb_rn > 5 AND gpudb_rn <= 15
//! ```

use crate::error::CompileError;
use sqlparser::ast::helpers::attached_token::AttachedToken;
use sqlparser::ast::{
    BinaryOperator, Expr, Function, FunctionArgumentList, FunctionArguments, GroupByExpr, Ident,
    ObjectName, OrderByExpr, Query, Select, SelectItem, SetExpr, TableAlias, TableFactor,
    TableWithJoins, Value, WindowSpec, WindowType,
};

/// Base name of the synthetic row number column
pub const ROW_NUMBER_COLUMN: &str = "gpudb_rn";

/// Alias of the derived table wrapping a rewritten query
pub const DERIVED_ALIAS: &str = "gpudb_paged";

/// Label base for unnamed projection expressions in the derived table
const ANONYMOUS_LABEL: &str = "anon";

/// Outcome of [`PaginationRewriter::rewrite`]
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// The plan needs no emulation and is returned as given
    Unchanged(Query),

    /// The plan was wrapped in a row-numbering derived table
    Rewritten(Query),
}

impl Rewrite {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }

    pub fn query(&self) -> &Query {
        match self {
            Self::Unchanged(query) | Self::Rewritten(query) => query,
        }
    }

    pub fn into_query(self) -> Query {
        match self {
            Self::Unchanged(query) | Self::Rewritten(query) => query,
        }
    }
}

/// Value of a non-negative integer literal
pub fn simple_int(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Value(Value::Number(n, _)) => n.parse().ok(),
        _ => None,
    }
}

/// The OFFSET expression, ignoring a literal `OFFSET 0`
fn effective_offset(query: &Query) -> Option<&Expr> {
    query
        .offset
        .as_ref()
        .map(|offset| &offset.value)
        .filter(|value| simple_int(value) != Some(0))
}

/// Whether the query needs the row-numbering rewrite
///
/// False when there is no offset and the limit is absent or a plain
/// integer literal; the compiler renders that case as `TOP n`.
pub fn needs_rewrite(query: &Query) -> bool {
    effective_offset(query).is_some()
        || query
            .limit
            .as_ref()
            .is_some_and(|limit| simple_int(limit).is_none())
}

/// Whether the query is the output of a previous rewrite
pub fn is_rewritten(query: &Query) -> bool {
    if query.limit.is_some() || query.offset.is_some() {
        return false;
    }

    let SetExpr::Select(select) = query.body.as_ref() else {
        return false;
    };

    match select.from.as_slice() {
        [from] if from.joins.is_empty() => matches!(
            &from.relation,
            TableFactor::Derived { alias: Some(alias), .. } if alias.name.value == DERIVED_ALIAS
        ),
        _ => false,
    }
}

/// Row number window `lower_exclusive < rn <= upper_inclusive` for literal bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub lower_exclusive: Option<u64>,
    pub upper_inclusive: Option<u64>,
}

impl PageBounds {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        let offset = offset.filter(|&offset| offset > 0);

        Self {
            lower_exclusive: offset,
            upper_inclusive: limit.map(|limit| limit.saturating_add(offset.unwrap_or(0))),
        }
    }

    pub fn contains(&self, row_number: u64) -> bool {
        self.lower_exclusive.map_or(true, |lower| row_number > lower)
            && self.upper_inclusive.map_or(true, |upper| row_number <= upper)
    }

    /// Filter over the row number column
    fn predicate(&self, row_number: &Ident) -> Option<Expr> {
        let mut clauses = Vec::new();

        if let Some(lower) = self.lower_exclusive {
            clauses.push(compare(row_number, BinaryOperator::Gt, number(lower)));
        }
        if let Some(upper) = self.upper_inclusive {
            clauses.push(compare(row_number, BinaryOperator::LtEq, number(upper)));
        }

        conjunction(clauses)
    }
}

/// Number rows the way `ROW_NUMBER() OVER (ORDER BY key)` does
///
/// Returns the 1-based row number of each input row, in input order. Rows
/// with equal keys keep their input order.
pub fn row_numbers<T, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<u64> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by_key(|&index| key(&rows[index]));

    let mut numbers = vec![0; rows.len()];
    for (position, index) in order.into_iter().enumerate() {
        numbers[index] = position as u64 + 1;
    }
    numbers
}

/// Pick `base`, or `base_1`, `base_2`, ... if taken (case-insensitive)
fn unique_name(base: &str, taken: &mut Vec<String>) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 0;

    while taken.iter().any(|name| name.eq_ignore_ascii_case(&candidate)) {
        suffix += 1;
        candidate = format!("{}_{}", base, suffix);
    }

    taken.push(candidate.to_lowercase());
    candidate
}

/// Output name of a projection item, when it has one
fn item_name(item: &SelectItem) -> Option<&Ident> {
    match item {
        SelectItem::UnnamedExpr(Expr::Identifier(ident)) => Some(ident),
        SelectItem::UnnamedExpr(Expr::CompoundIdentifier(parts)) => parts.last(),
        SelectItem::ExprWithAlias { alias, .. } => Some(alias),
        _ => None,
    }
}

/// `base` renamed to `value`, keeping its quoting
fn relabel(base: &Ident, value: String) -> Ident {
    let mut label = base.clone();
    label.value = value;
    label
}

fn number(value: u64) -> Expr {
    Expr::Value(Value::Number(value.to_string(), false))
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn compare(row_number: &Ident, op: BinaryOperator, bound: Expr) -> Expr {
    binary(Expr::Identifier(row_number.clone()), op, bound)
}

fn conjunction(clauses: Vec<Expr>) -> Option<Expr> {
    clauses
        .into_iter()
        .reduce(|left, right| binary(left, BinaryOperator::And, right))
}

fn filter_predicate(row_number: &Ident, limit: Option<Expr>, offset: Option<Expr>) -> Option<Expr> {
    let literal = |expr: Option<&Expr>| match expr {
        None => Some(None),
        Some(expr) => simple_int(expr).map(Some),
    };

    if let (Some(limit), Some(offset)) = (literal(limit.as_ref()), literal(offset.as_ref())) {
        return PageBounds::new(limit, offset).predicate(row_number);
    }

    let upper = match (limit, &offset) {
        (Some(limit), Some(offset)) => Some(binary(
            Expr::Nested(Box::new(limit)),
            BinaryOperator::Plus,
            Expr::Nested(Box::new(offset.clone())),
        )),
        (Some(limit), None) => Some(limit),
        (None, _) => None,
    };

    let mut clauses = Vec::new();
    if let Some(offset) = offset {
        clauses.push(compare(row_number, BinaryOperator::Gt, offset));
    }
    if let Some(upper) = upper {
        clauses.push(compare(row_number, BinaryOperator::LtEq, upper));
    }
    conjunction(clauses)
}

/// Expression an ORDER BY key stands for inside the window
///
/// The window cannot see the aliases or positions of its own SELECT, so an
/// alias or a 1-based position is replaced by the projected expression.
fn window_key(key: &Expr, projection: &[SelectItem]) -> Result<Option<Expr>, CompileError> {
    match key {
        Expr::Identifier(ident) => Ok(projection.iter().find_map(|item| match item {
            SelectItem::ExprWithAlias { expr, alias } if alias.value.eq_ignore_ascii_case(&ident.value) => {
                Some(expr.clone())
            }
            _ => None,
        })),
        Expr::Value(Value::Number(position, _)) => {
            let item = position
                .parse::<usize>()
                .ok()
                .and_then(|position| position.checked_sub(1))
                .and_then(|index| projection.get(index));

            match item {
                Some(SelectItem::UnnamedExpr(expr)) | Some(SelectItem::ExprWithAlias { expr, .. }) => {
                    Ok(Some(expr.clone()))
                }
                Some(_) => Err(CompileError::UnsupportedPagination(format!(
                    "ORDER BY {} refers to a wildcard",
                    position
                ))),
                None => Err(CompileError::UnsupportedPagination(format!(
                    "ORDER BY {} is not a position in the select list",
                    position
                ))),
            }
        }
        _ => Ok(None),
    }
}

/// `ROW_NUMBER() OVER (ORDER BY <keys>)`
fn row_number_window(order_by: Vec<OrderByExpr>) -> Expr {
    Expr::Function(Function {
        name: ObjectName(vec![Ident::new("ROW_NUMBER")]),
        uses_odbc_syntax: false,
        parameters: FunctionArguments::None,
        args: FunctionArguments::List(FunctionArgumentList {
            duplicate_treatment: None,
            args: Vec::new(),
            clauses: Vec::new(),
        }),
        filter: None,
        null_treatment: None,
        over: Some(WindowType::WindowSpec(WindowSpec {
            window_name: None,
            partition_by: Vec::new(),
            order_by,
            window_frame: None,
        })),
        within_group: Vec::new(),
    })
}

/// `SELECT <projection> FROM (<inner>) AS gpudb_paged WHERE <selection>`
fn paged_select(projection: Vec<SelectItem>, inner: Query, selection: Option<Expr>) -> Select {
    Select {
        select_token: AttachedToken::empty(),
        distinct: None,
        top: None,
        top_before_distinct: false,
        projection,
        into: None,
        from: vec![TableWithJoins {
            relation: TableFactor::Derived {
                lateral: false,
                subquery: Box::new(inner),
                alias: Some(TableAlias {
                    name: Ident::new(DERIVED_ALIAS),
                    columns: Vec::new(),
                }),
            },
            joins: Vec::new(),
        }],
        lateral_views: Vec::new(),
        prewhere: None,
        selection,
        group_by: GroupByExpr::Expressions(Vec::new(), Vec::new()),
        cluster_by: Vec::new(),
        distribute_by: Vec::new(),
        sort_by: Vec::new(),
        having: None,
        named_window: Vec::new(),
        qualify: None,
        window_before_qualify: false,
        value_table_mode: None,
        connect_by: None,
    }
}

/// Rewrites LIMIT/OFFSET the server cannot express natively
#[derive(Debug, Default, Clone, Copy)]
pub struct PaginationRewriter;

impl PaginationRewriter {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite `plan` into a row-numbered derived table when required
    ///
    /// Fails with [`CompileError::MissingOrderBy`] when emulation is needed
    /// but the query has no ORDER BY.
    pub fn rewrite(&self, mut plan: Query) -> Result<Rewrite, CompileError> {
        if is_rewritten(&plan) || !needs_rewrite(&plan) {
            return Ok(Rewrite::Unchanged(plan));
        }

        let order_by: Vec<OrderByExpr> = plan
            .order_by
            .take()
            .map(|order_by| order_by.exprs)
            .unwrap_or_default();

        if order_by.is_empty() {
            return Err(CompileError::MissingOrderBy);
        }

        let limit = plan.limit.take();
        let offset = plan
            .offset
            .take()
            .map(|offset| offset.value)
            .filter(|value| simple_int(value) != Some(0));
        let with = plan.with.take();

        let mut select = match *plan.body {
            SetExpr::Select(select) => select,
            _ => {
                return Err(CompileError::UnsupportedPagination(
                    "only a plain SELECT can be paginated".to_string(),
                ))
            }
        };

        let projection = std::mem::take(&mut select.projection);

        let mut keys = Vec::with_capacity(order_by.len());
        for mut key in order_by {
            if let Some(expr) = window_key(&key.expr, &projection)? {
                key.expr = expr;
            }
            keys.push(key);
        }

        let mut taken: Vec<String> = projection
            .iter()
            .filter_map(item_name)
            .map(|ident| ident.value.to_lowercase())
            .collect();
        let mut emitted: Vec<String> = Vec::with_capacity(projection.len());
        let mut output_names: Vec<Ident> = Vec::with_capacity(projection.len());
        let mut items = Vec::with_capacity(projection.len() + 1);

        for item in projection {
            let name = item_name(&item).cloned();

            match (item, name) {
                (item, Some(name)) if !emitted.contains(&name.value.to_lowercase()) => {
                    emitted.push(name.value.to_lowercase());
                    output_names.push(name);
                    items.push(item);
                }
                (SelectItem::UnnamedExpr(expr), name) => {
                    let base = name.unwrap_or_else(|| Ident::new(ANONYMOUS_LABEL));
                    let label = relabel(&base, unique_name(&base.value, &mut taken));
                    emitted.push(label.value.to_lowercase());
                    output_names.push(label.clone());
                    items.push(SelectItem::ExprWithAlias { expr, alias: label });
                }
                (SelectItem::ExprWithAlias { expr, alias }, _) => {
                    let label = relabel(&alias, unique_name(&alias.value, &mut taken));
                    emitted.push(label.value.to_lowercase());
                    output_names.push(label.clone());
                    items.push(SelectItem::ExprWithAlias { expr, alias: label });
                }
                _ => {
                    return Err(CompileError::UnsupportedPagination(
                        "a wildcard projection cannot be paginated; list the columns explicitly"
                            .to_string(),
                    ))
                }
            }
        }

        let row_number = Ident::new(unique_name(ROW_NUMBER_COLUMN, &mut taken));
        items.push(SelectItem::ExprWithAlias {
            expr: row_number_window(keys),
            alias: row_number.clone(),
        });
        select.projection = items;
        plan.body = Box::new(SetExpr::Select(select));

        let columns = output_names
            .into_iter()
            .map(|name| {
                SelectItem::UnnamedExpr(Expr::CompoundIdentifier(vec![Ident::new(DERIVED_ALIAS), name]))
            })
            .collect();
        let predicate = filter_predicate(&row_number, limit, offset);

        tracing::debug!(row_number = %row_number, "Wrapped query in row-numbered derived table");

        Ok(Rewrite::Rewritten(Query {
            with,
            body: Box::new(SetExpr::Select(Box::new(paged_select(columns, plan, predicate)))),
            order_by: None,
            limit: None,
            limit_by: Vec::new(),
            offset: None,
            fetch: None,
            locks: Vec::new(),
            for_clause: None,
            settings: None,
            format_clause: None,
        }))
    }
}
