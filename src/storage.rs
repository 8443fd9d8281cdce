use crate::models::Observation;
use crate::stats::KpiSnapshot;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn csv_safe(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{}", s),
        _ => s.to_string(),
    }
}

/// Save observations as CSV with header (`code,iso3,name,population,year`).
///
/// Text cells starting with `=`, `+`, `-` or `@` are prefixed with `'`.
pub fn save_csv<P: AsRef<Path>>(rows: &[Observation], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("code", "iso3", "name", "population", "year"))?;
    for r in rows {
        wtr.serialize((
            csv_safe(&r.code),
            csv_safe(&r.iso3),
            csv_safe(&r.name),
            r.population,
            r.year,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any serializable value (rows, a snapshot) as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save the filtered rows, choosing CSV or JSON by extension (default CSV).
pub fn save_rows<P: AsRef<Path>>(rows: &[Observation], path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => save_json(rows, path),
        "csv" => save_csv(rows, path),
        other => anyhow::bail!("unsupported format: {}", other),
    }
}

pub fn save_snapshot<P: AsRef<Path>>(snapshot: &KpiSnapshot, path: P) -> Result<()> {
    save_json(snapshot, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let rows = vec![Observation {
            code: "DE".into(),
            iso3: "DEU".into(),
            name: "Germany".into(),
            population: Some(83_100_000.0),
            year: 2020,
        }];
        save_csv(&rows, &csvp).unwrap();
        save_json(&rows, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }
}
