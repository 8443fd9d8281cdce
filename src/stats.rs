use crate::models::Observation;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population total for one year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YearPoint {
    pub year: i32,
    pub total: f64,
}

/// Population total for one country in a single year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryTotal {
    pub name: String,
    pub total: f64,
}

/// Dashboard KPIs derived from a filtered row set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiSnapshot {
    pub latest_year: Option<i32>,
    pub total_pop_latest: Option<f64>,
    /// Total for `latest_year - 1`; `None` when that year has no values.
    pub total_pop_prev: Option<f64>,
    pub countries_count: usize,
    pub growth_abs: Option<f64>,
    /// Fraction, not percent (`1.0` = +100%).
    pub growth_pct: Option<f64>,
    /// Ascending by year.
    pub series: Vec<YearPoint>,
    /// Descending by total; ties keep encounter order.
    pub country_totals_latest: Vec<CountryTotal>,
}

/// The snapshot for an empty row set. Every empty result is this value.
pub const EMPTY_SNAPSHOT: KpiSnapshot = KpiSnapshot {
    latest_year: None,
    total_pop_latest: None,
    total_pop_prev: None,
    countries_count: 0,
    growth_abs: None,
    growth_pct: None,
    series: Vec::new(),
    country_totals_latest: Vec::new(),
};

impl Default for KpiSnapshot {
    fn default() -> Self {
        EMPTY_SNAPSHOT
    }
}

impl KpiSnapshot {
    pub fn is_empty(&self) -> bool {
        *self == EMPTY_SNAPSHOT
    }
}

/// Sum of non-null population for `year`; `None` when no row contributes.
fn year_total(rows: &[Observation], year: i32) -> Option<f64> {
    rows.iter()
        .filter(|r| r.year == year)
        .filter_map(|r| r.population)
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Latest positive year in the set. Year `0` marks an unparseable date.
fn latest_year(rows: &[Observation]) -> Option<i32> {
    rows.iter().map(|r| r.year).filter(|y| *y > 0).max()
}

/// Group rows of `year` by name in encounter order, then sort descending by total.
fn rank_by_name<'a>(rows: impl IntoIterator<Item = &'a Observation>, year: i32) -> Vec<CountryTotal> {
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut out: Vec<CountryTotal> = Vec::new();
    for r in rows {
        if r.year != year {
            continue;
        }
        let Some(v) = r.population else { continue };
        match index.get(r.name.as_str()) {
            Some(&i) => out[i].total += v,
            None => {
                index.insert(r.name.as_str(), out.len());
                out.push(CountryTotal {
                    name: r.name.clone(),
                    total: v,
                });
            }
        }
    }
    // `sort_by` is stable, so equal totals keep encounter order.
    out.sort_by(|a, b| b.total.total_cmp(&a.total));
    out
}

/// Compute the KPI snapshot for an already-filtered row set.
pub fn aggregate(rows: &[Observation]) -> KpiSnapshot {
    if rows.is_empty() {
        return EMPTY_SNAPSHOT;
    }

    let countries_count = rows
        .iter()
        .map(|r| r.name.as_str())
        .collect::<AHashSet<_>>()
        .len();

    let latest = latest_year(rows);

    let (total_pop_latest, total_pop_prev) = match latest {
        // With a latest year, an all-null year still counts as a zero total.
        Some(y) => (Some(year_total(rows, y).unwrap_or(0.0)), year_total(rows, y - 1)),
        None => (None, None),
    };

    let (growth_abs, growth_pct) = match (total_pop_latest, total_pop_prev) {
        (Some(cur), Some(prev)) if prev != 0.0 => {
            let abs = cur - prev;
            (Some(abs), Some(abs / prev))
        }
        _ => (None, None),
    };

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for r in rows {
        if r.year <= 0 {
            continue;
        }
        if let Some(v) = r.population {
            *by_year.entry(r.year).or_insert(0.0) += v;
        }
    }
    let series = by_year
        .into_iter()
        .map(|(year, total)| YearPoint { year, total })
        .collect();

    let country_totals_latest = match latest {
        Some(y) => rank_by_name(rows, y),
        None => Vec::new(),
    };

    KpiSnapshot {
        latest_year: latest,
        total_pop_latest,
        total_pop_prev,
        countries_count,
        growth_abs,
        growth_pct,
        series,
        country_totals_latest,
    }
}

/// Ranking for the "top countries" panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCountries {
    /// Latest year with at least one value; `None` when the window is empty.
    pub year: Option<i32>,
    pub entries: Vec<CountryTotal>,
}

/// Rank real countries for the most recent year that has data, keeping the first `n`.
///
/// Rows whose `code` or `iso3` is listed in `aggregates` (regions, income
/// groups, "World") are excluded before picking the year.
pub fn top_countries(rows: &[Observation], aggregates: &AHashSet<String>, n: usize) -> TopCountries {
    let countries: Vec<&Observation> = rows
        .iter()
        .filter(|r| !aggregates.contains(&r.code) && !aggregates.contains(&r.iso3))
        .collect();

    let year = countries
        .iter()
        .filter(|r| r.population.is_some() && r.year > 0)
        .map(|r| r.year)
        .max();

    let Some(year) = year else {
        return TopCountries {
            year: None,
            entries: Vec::new(),
        };
    };

    let mut entries = rank_by_name(countries.iter().copied(), year);
    entries.truncate(n);
    TopCountries {
        year: Some(year),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, year: i32, population: Option<f64>) -> Observation {
        Observation {
            code: name.into(),
            iso3: name.into(),
            name: name.into(),
            population,
            year,
        }
    }

    #[test]
    fn null_only_previous_year_is_absent_not_zero() {
        let rows = vec![obs("A", 2020, None), obs("A", 2021, Some(10.0))];
        let s = aggregate(&rows);
        assert_eq!(s.total_pop_prev, None);
        assert_eq!(s.growth_abs, None);
    }

    #[test]
    fn zero_year_rows_are_ignored_for_latest_and_series() {
        let rows = vec![obs("A", 0, Some(5.0)), obs("A", 2000, Some(1.0))];
        let s = aggregate(&rows);
        assert_eq!(s.latest_year, Some(2000));
        assert_eq!(s.series, vec![YearPoint { year: 2000, total: 1.0 }]);
    }
}
