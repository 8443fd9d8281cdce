use popdash::filter::apply_filter;
use popdash::models::{Observation, YearRange};
use popdash::FilterCriteria;

fn row(code: &str, iso3: &str, name: &str, year: i32) -> Observation {
    Observation {
        code: code.into(),
        iso3: iso3.into(),
        name: name.into(),
        population: Some(year as f64),
        year,
    }
}

fn sample() -> Vec<Observation> {
    let mut out = Vec::new();
    for y in [2008, 2010, 2012, 2015, 2018] {
        out.push(row("CG", "COG", "Congo, Rep.", y));
        out.push(row("CD", "COD", "Congo, Dem. Rep.", y));
        out.push(row("DE", "DEU", "Germany", y));
    }
    out
}

#[test]
fn reversed_year_pair_gives_identical_rows() {
    let rows = sample();
    for (a, b) in [(2010, 2015), (2008, 2018), (2012, 2012), (1990, 2009)] {
        let fwd = FilterCriteria::from_inputs("", "", &a.to_string(), &b.to_string()).unwrap();
        let rev = FilterCriteria::from_inputs("", "", &b.to_string(), &a.to_string()).unwrap();
        assert_eq!(apply_filter(&rows, &fwd), apply_filter(&rows, &rev), "({a},{b})");
    }
}

#[test]
fn reversed_range_is_normalized() {
    let c = FilterCriteria::from_inputs("", "", "2015", "2010").unwrap();
    assert_eq!(c.year_range(), Some(YearRange { start: 2010, end: 2015 }));
    let got = apply_filter(&sample(), &c);
    assert!(got.iter().all(|r| (2010..=2015).contains(&r.year)));
    assert_eq!(got.len(), 9);
}

#[test]
fn single_bound_selects_one_year() {
    let rows = sample();
    let only_to = FilterCriteria::from_inputs("", "", "", "2012").unwrap();
    let only_from = FilterCriteria::from_inputs("", "", "2012", "").unwrap();
    let a = apply_filter(&rows, &only_to);
    assert_eq!(a.len(), 3);
    assert!(a.iter().all(|r| r.year == 2012));
    assert_eq!(a, apply_filter(&rows, &only_from));
}

#[test]
fn country_name_is_exact_not_substring() {
    let c = FilterCriteria::from_inputs("", "Congo, Rep.", "", "").unwrap();
    let got = apply_filter(&sample(), &c);
    assert_eq!(got.len(), 5);
    assert!(got.iter().all(|r| r.name == "Congo, Rep."));

    let partial = FilterCriteria::from_inputs("", "Congo", "", "").unwrap();
    assert!(apply_filter(&sample(), &partial).is_empty());

    let wrong_case = FilterCriteria::from_inputs("", "germany", "", "").unwrap();
    assert!(apply_filter(&sample(), &wrong_case).is_empty());
}

#[test]
fn country_id_matches_code_or_iso3() {
    let rows = sample();
    let by_iso3 = FilterCriteria::from_inputs("DEU", "", "", "").unwrap();
    let by_iso2 = FilterCriteria::from_inputs("DE", "", "", "").unwrap();
    assert_eq!(apply_filter(&rows, &by_iso3).len(), 5);
    assert_eq!(apply_filter(&rows, &by_iso3), apply_filter(&rows, &by_iso2));
}

#[test]
fn id_and_name_must_both_match() {
    let rows = sample();
    let agree = FilterCriteria::from_inputs("DEU", "Germany", "", "").unwrap();
    assert_eq!(apply_filter(&rows, &agree).len(), 5);

    let conflict = FilterCriteria::from_inputs("DEU", "Congo, Rep.", "", "").unwrap();
    assert!(apply_filter(&rows, &conflict).is_empty());
}

#[test]
fn country_and_years_combine() {
    let c = FilterCriteria::from_inputs("", "Germany", "2018", "2010").unwrap();
    let got = apply_filter(&sample(), &c);
    let years: Vec<i32> = got.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2010, 2012, 2015, 2018]);
}

#[test]
fn empty_criteria_keeps_everything_in_order() {
    let rows = sample();
    let got = apply_filter(&rows, &FilterCriteria::default());
    assert_eq!(got, rows);
}

#[test]
fn output_preserves_input_order() {
    let mut rows = sample();
    rows.reverse();
    let c = FilterCriteria::from_inputs("", "", "2010", "2015").unwrap();
    let got = apply_filter(&rows, &c);
    let expected: Vec<Observation> = rows
        .iter()
        .filter(|r| (2010..=2015).contains(&r.year))
        .cloned()
        .collect();
    assert_eq!(got, expected);
}
