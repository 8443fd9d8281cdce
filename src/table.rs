//! Row-level view of the filtered set: column sort and pagination.

use crate::models::Observation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    Code,
    Name,
    Population,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

fn cmp_population(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by one column. Missing populations go last in both directions.
pub fn sort_rows(rows: &mut [Observation], column: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = match column {
            SortColumn::Code => a.code.cmp(&b.code),
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Year => a.year.cmp(&b.year),
            SortColumn::Population => {
                return match (a.population, b.population, order) {
                    (Some(_), Some(_), SortOrder::Desc) => {
                        cmp_population(b.population, a.population)
                    }
                    _ => cmp_population(a.population, b.population),
                };
            }
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// One page of rows plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// 1-based, clamped to `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: &'a [Observation],
}

/// Slice out page `page` (1-based). An empty set still has one (empty) page.
pub fn paginate(rows: &[Observation], page: usize, page_size: usize) -> Page<'_> {
    let size = page_size.max(1);
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(size).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * size).min(total_rows);
    let end = (start + size).min(total_rows);
    Page {
        page,
        total_pages,
        total_rows,
        rows: &rows[start..end],
    }
}
