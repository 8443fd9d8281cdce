//! Raw API records → flat [`Observation`] rows.
//!
//! Normalization is total: every input record yields exactly one row. Records
//! that fail to decode still produce a row with empty names, no population and
//! year `0`; dropping rows is the filter stage's job.

use crate::models::{Observation, RawObservation};
use serde_json::Value;

/// Map already-decoded records to observations.
pub fn normalize(raw: Vec<RawObservation>) -> Vec<Observation> {
    raw.into_iter().map(Observation::from).collect()
}

/// Decode and normalize JSON records one by one.
pub fn normalize_values(records: &[Value]) -> Vec<Observation> {
    records.iter().map(normalize_value).collect()
}

fn normalize_value(v: &Value) -> Observation {
    let raw = match RawObservation::deserialize_lenient(v) {
        Some(r) => r,
        None => {
            log::debug!("record did not decode, using empty defaults: {}", v);
            RawObservation::default()
        }
    };
    Observation::from(raw)
}

impl RawObservation {
    fn deserialize_lenient(v: &Value) -> Option<Self> {
        if !v.is_object() {
            return None;
        }
        serde_json::from_value(v.clone()).ok()
    }
}
