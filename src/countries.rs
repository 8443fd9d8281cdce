//! Country metadata: parsing, localized ordering and aggregate detection.

use crate::models::{Country, CountryRecord};
use ahash::AHashSet;
use serde_json::Value;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

/// Base letter for stroked letters, which have no canonical decomposition.
fn unstroke(c: char) -> char {
    match c {
        'ł' | 'Ł' => 'l',
        'ø' | 'Ø' => 'o',
        'đ' | 'Đ' => 'd',
        'ħ' | 'Ħ' => 'h',
        'ı' => 'i',
        _ => c,
    }
}

/// Primary key for Spanish-style ordering: letters compare case- and
/// accent-insensitively, `ñ` sorts after `n`, punctuation is skipped.
fn collation_key(s: &str) -> Vec<u32> {
    let mut key = Vec::with_capacity(s.len());
    let mut chars = s.nfd().peekable();
    while let Some(c) = chars.next() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_whitespace() {
            key.push(0);
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        for lc in unstroke(c).to_lowercase() {
            // n + combining tilde
            let enye = lc == 'n' && chars.peek() == Some(&'\u{303}');
            key.push((lc as u32) * 2 + u32::from(enye));
        }
    }
    key
}

/// Compare two names the way a Spanish locale collator would.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Parse the records array of the country endpoint and sort by name.
pub fn parse_countries(records: &[Value]) -> Vec<Country> {
    let mut out: Vec<Country> = records
        .iter()
        .map(|v| {
            serde_json::from_value::<CountryRecord>(v.clone())
                .unwrap_or_default()
                .into()
        })
        .collect();
    out.sort_by(|a, b| collate(&a.name, &b.name));
    out
}

/// Keep only real countries (drop regions and income groups).
pub fn only_countries(list: &[Country]) -> Vec<Country> {
    list.iter().filter(|c| !c.is_aggregate()).cloned().collect()
}

/// Ids of aggregate entities, used to exclude them from rankings.
pub fn aggregate_ids(list: &[Country]) -> AHashSet<String> {
    list.iter()
        .filter(|c| c.is_aggregate())
        .map(|c| c.id.clone())
        .collect()
}
