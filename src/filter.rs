//! Filter stage: narrow observations by country identity and year range.

use crate::error::FilterError;
use crate::models::{Observation, YearRange};
use serde::{Deserialize, Serialize};

/// Active filter. `None` means "not constrained" for every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Matched against both `code` and `iso3`.
    pub country_id: Option<String>,
    /// Matched against `name`.
    pub country_name: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn parse_year(s: &str) -> Result<Option<i32>, FilterError> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<i32>()
        .map(Some)
        .map_err(|_| FilterError::InvalidYear(t.to_string()))
}

impl FilterCriteria {
    /// Build criteria from raw form inputs where `""` means "unset".
    pub fn from_inputs(
        country_id: &str,
        country_name: &str,
        year_from: &str,
        year_to: &str,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            country_id: non_empty(country_id),
            country_name: non_empty(country_name),
            year_from: parse_year(year_from)?,
            year_to: parse_year(year_to)?,
        })
    }

    /// Effective inclusive range: `None` when no year is set, a single year
    /// when only one bound is set, `[min, max]` otherwise.
    pub fn year_range(&self) -> Option<YearRange> {
        match (self.year_from, self.year_to) {
            (None, None) => None,
            (Some(y), None) | (None, Some(y)) => Some(YearRange::single(y)),
            (Some(a), Some(b)) => Some(YearRange::new(a, b)),
        }
    }

    pub fn has_country(&self) -> bool {
        self.country_id.is_some() || self.country_name.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_country() && self.year_from.is_none() && self.year_to.is_none()
    }

    /// Copy with the year pair stored in `[min, max]` order and a lone bound
    /// mirrored to both sides.
    pub fn normalized(&self) -> Self {
        let range = self.year_range();
        Self {
            country_id: self.country_id.clone(),
            country_name: self.country_name.clone(),
            year_from: range.map(|r| r.start),
            year_to: range.map(|r| r.end),
        }
    }

    /// Every country field that is set must match.
    fn matches_country(&self, o: &Observation) -> bool {
        let by_id = self
            .country_id
            .as_deref()
            .is_none_or(|id| o.code == id || o.iso3 == id);
        let by_name = self
            .country_name
            .as_deref()
            .is_none_or(|name| o.name == name);
        by_id && by_name
    }

    pub fn matches(&self, o: &Observation) -> bool {
        self.matches_country(o) && self.year_range().is_none_or(|r| r.contains(o.year))
    }
}

/// Retain rows matching `criteria`, preserving input order.
pub fn apply_filter(rows: &[Observation], criteria: &FilterCriteria) -> Vec<Observation> {
    if criteria.is_empty() {
        return rows.to_vec();
    }
    rows.iter().filter(|o| criteria.matches(o)).cloned().collect()
}
