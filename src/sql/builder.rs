//! Builds parameterized SELECT, INSERT, UPSERT, UPDATE, DELETE from static table descriptors.
//! Identifiers come from the descriptors only; values are always parameters.

use crate::tenant::{quote_ident, TenantSchema};
use serde_json::Value;

#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    /// PostgreSQL type used to cast the text parameter (e.g. "uuid", "timestamptz").
    pub pg_type: &'static str,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    fn pg_type(&self, column: &str) -> Option<&'static str> {
        self.columns.iter().find(|c| c.name == column).map(|c| c.pg_type)
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// `$n::type` so text-encoded parameters bind to any column type.
    fn placeholder(&mut self, table: &TableDef, column: &str, v: Value) -> String {
        let n = self.push_param(v);
        match table.pg_type(column) {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

/// WHERE predicates.
#[derive(Clone, Debug)]
pub enum Filter {
    Eq(&'static str, Value),
    /// Case-insensitive substring match against any of the columns.
    Contains(&'static [&'static str], String),
}

#[derive(Clone, Copy, Debug)]
pub enum Order {
    Asc(&'static str),
    Desc(&'static str),
}

fn select_column_list(table: &TableDef) -> String {
    table
        .columns
        .iter()
        .map(|c| quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('%');
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn where_clause(q: &mut QueryBuf, table: &TableDef, filters: &[Filter]) -> String {
    let mut parts = Vec::new();
    for f in filters {
        match f {
            Filter::Eq(col, val) => {
                if !table.has_column(col) || val.is_null() {
                    continue;
                }
                let ph = q.placeholder(table, col, val.clone());
                parts.push(format!("{} = {}", quote_ident(col), ph));
            }
            Filter::Contains(cols, needle) => {
                let n = q.push_param(Value::String(escape_like(needle)));
                let any: Vec<String> = cols
                    .iter()
                    .filter(|c| table.has_column(c))
                    .map(|c| format!("{} ILIKE ${}::text", quote_ident(c), n))
                    .collect();
                if !any.is_empty() {
                    parts.push(format!("({})", any.join(" OR ")));
                }
            }
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT with filters, ORDER BY and optional LIMIT/OFFSET.
pub fn select(
    schema: &TenantSchema,
    table: &TableDef,
    filters: &[Filter],
    order: &[Order],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, filters);
    let order_sql = if order.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = order
            .iter()
            .map(|o| match o {
                Order::Asc(c) => format!("{} ASC", quote_ident(c)),
                Order::Desc(c) => format!("{} DESC", quote_ident(c)),
            })
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    };
    let limit_sql = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_sql = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        select_column_list(table),
        schema.qualified(table.name),
        where_sql,
        order_sql,
        limit_sql,
        offset_sql
    );
    q
}

/// INSERT of the given columns; the rest fall back to their DB defaults.
pub fn insert(schema: &TenantSchema, table: &TableDef, values: &[(&'static str, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (col, val) in values {
        if !table.has_column(col) {
            continue;
        }
        placeholders.push(q.placeholder(table, col, val.clone()));
        cols.push(quote_ident(col));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        schema.qualified(table.name),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    );
    q
}

/// INSERT ... ON CONFLICT (conflict) DO UPDATE SET each of `update_cols` from the
/// proposed row, plus `touch = NOW()` when given.
pub fn upsert(
    schema: &TenantSchema,
    table: &TableDef,
    values: &[(&'static str, Value)],
    conflict: &[&'static str],
    update_cols: &[&'static str],
    touch: Option<&'static str>,
) -> QueryBuf {
    let mut q = insert(schema, table, values);
    let returning = format!(" RETURNING {}", select_column_list(table));
    let base = q.sql.trim_end_matches(returning.as_str()).to_string();
    let mut sets: Vec<String> = update_cols
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| format!("{} = EXCLUDED.{}", quote_ident(c), quote_ident(c)))
        .collect();
    if let Some(t) = touch {
        sets.push(format!("{} = NOW()", quote_ident(t)));
    }
    let conflict_cols: Vec<String> = conflict.iter().map(|c| quote_ident(c)).collect();
    q.sql = format!(
        "{} ON CONFLICT ({}) DO UPDATE SET {}{}",
        base,
        conflict_cols.join(", "),
        sets.join(", "),
        returning
    );
    q
}

/// UPDATE rows matching all `keys`; SET only the given columns. `touch` is set to NOW().
pub fn update(
    schema: &TenantSchema,
    table: &TableDef,
    keys: &[(&'static str, Value)],
    sets: &[(&'static str, Value)],
    touch: Option<&'static str>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut set_parts = Vec::new();
    for (col, val) in sets {
        if !table.has_column(col) {
            continue;
        }
        let ph = q.placeholder(table, col, val.clone());
        set_parts.push(format!("{} = {}", quote_ident(col), ph));
    }
    if let Some(t) = touch {
        set_parts.push(format!("{} = NOW()", quote_ident(t)));
    }
    let filters: Vec<Filter> = keys.iter().map(|(c, v)| Filter::Eq(*c, v.clone())).collect();
    if set_parts.is_empty() {
        return select(schema, table, &filters, &[], None, None);
    }
    let where_sql = where_clause(&mut q, table, &filters);
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        schema.qualified(table.name),
        set_parts.join(", "),
        where_sql,
        select_column_list(table)
    );
    q
}

/// DELETE rows matching all `keys`.
pub fn delete(schema: &TenantSchema, table: &TableDef, keys: &[(&'static str, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let filters: Vec<Filter> = keys.iter().map(|(c, v)| Filter::Eq(*c, v.clone())).collect();
    let where_sql = where_clause(&mut q, table, &filters);
    q.sql = format!(
        "DELETE FROM {}{} RETURNING {}",
        schema.qualified(table.name),
        where_sql,
        select_column_list(table)
    );
    q
}
