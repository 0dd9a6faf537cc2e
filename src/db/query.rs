//! Paginated query execution
//!
//! Builds the WHERE clause from translated filter conditions, counts the
//! matching rows, and reads one fixed-size page. Rows are ordered by the
//! surrogate key ascending so pagination is stable across requests.

use crate::error::Result;
use crate::filter::Condition;
use crate::db::models::Page;
use rusqlite::{Connection, Row, ToSql};

/// Fixed page size for all search endpoints.
pub const PAGE_SIZE: i64 = 20;

/// Run a filtered, paginated SELECT against `table`.
///
/// `page` is 1-indexed; values below 1 are clamped. A page past the end
/// yields an empty row list with correct totals rather than an error.
pub fn run_paginated<T, F>(
    conn: &Connection,
    table: &str,
    columns: &str,
    conditions: &[Condition],
    page: i64,
    map_row: F,
) -> Result<Page<T>>
where
    F: Fn(&Row<'_>) -> rusqlite::Result<T>,
{
    let page = page.max(1);

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        let fragments: Vec<&str> = conditions.iter().map(|c| c.sql.as_str()).collect();
        format!("WHERE {}", fragments.join(" AND "))
    };

    let mut params: Vec<&dyn ToSql> = conditions.iter().map(|c| &c.param as &dyn ToSql).collect();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} {}", table, where_clause),
        params.as_slice(),
        |row| row.get(0),
    )?;

    let pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
    let offset = (page - 1) * PAGE_SIZE;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} {} ORDER BY id ASC LIMIT ? OFFSET ?",
        columns, table, where_clause
    ))?;

    params.push(&PAGE_SIZE);
    params.push(&offset);

    let datas = stmt
        .query_map(params.as_slice(), map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Page {
        datas,
        total_results: total,
        current_page: page,
        pages,
    })
}
