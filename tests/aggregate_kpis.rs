use popdash::filter::apply_filter;
use popdash::models::Observation;
use popdash::stats::{CountryTotal, EMPTY_SNAPSHOT, YearPoint, aggregate};
use popdash::FilterCriteria;

fn obs(name: &str, year: i32, population: Option<f64>) -> Observation {
    Observation {
        code: name.to_uppercase(),
        iso3: format!("{}X", name.to_uppercase()),
        name: name.into(),
        population,
        year,
    }
}

#[test]
fn three_row_scenario() {
    let rows = vec![
        obs("A", 2020, Some(100.0)),
        obs("A", 2021, Some(150.0)),
        obs("B", 2021, Some(50.0)),
    ];
    let s = aggregate(&rows);
    assert_eq!(s.latest_year, Some(2021));
    assert_eq!(s.total_pop_latest, Some(200.0));
    assert_eq!(s.total_pop_prev, Some(100.0));
    assert_eq!(s.countries_count, 2);
    assert_eq!(s.growth_abs, Some(100.0));
    assert_eq!(s.growth_pct, Some(1.0));
    assert_eq!(
        s.series,
        vec![
            YearPoint { year: 2020, total: 100.0 },
            YearPoint { year: 2021, total: 200.0 },
        ]
    );
    assert_eq!(
        s.country_totals_latest,
        vec![
            CountryTotal { name: "A".into(), total: 150.0 },
            CountryTotal { name: "B".into(), total: 50.0 },
        ]
    );
}

#[test]
fn empty_input_is_the_canonical_snapshot() {
    let s = aggregate(&[]);
    assert_eq!(s, EMPTY_SNAPSHOT);
    assert!(s.is_empty());
    assert_eq!(s.latest_year, None);
    assert_eq!(s.total_pop_latest, None);
    assert_eq!(s.countries_count, 0);
    assert_eq!(s.growth_abs, None);
    assert_eq!(s.growth_pct, None);
    assert!(s.series.is_empty());
    assert!(s.country_totals_latest.is_empty());
}

#[test]
fn filter_matching_nothing_equals_empty_input() {
    let rows = vec![obs("A", 2020, Some(1.0)), obs("B", 2021, Some(2.0))];
    let c = FilterCriteria::from_inputs("", "Nowhere", "", "").unwrap();
    assert_eq!(aggregate(&apply_filter(&rows, &c)), aggregate(&[]));

    let c = FilterCriteria::from_inputs("", "", "1800", "1801").unwrap();
    assert_eq!(aggregate(&apply_filter(&rows, &c)), EMPTY_SNAPSHOT);
}

#[test]
fn growth_is_none_when_previous_total_is_zero_or_missing() {
    // previous year present but zero
    let rows = vec![obs("A", 2020, Some(0.0)), obs("A", 2021, Some(10.0))];
    let s = aggregate(&rows);
    assert_eq!(s.total_pop_prev, Some(0.0));
    assert_eq!(s.growth_abs, None);
    assert_eq!(s.growth_pct, None);

    // previous year absent
    let rows = vec![obs("A", 2019, Some(5.0)), obs("A", 2021, Some(10.0))];
    let s = aggregate(&rows);
    assert_eq!(s.total_pop_prev, None);
    assert_eq!(s.growth_abs, None);
    assert_eq!(s.growth_pct, None);

    // latest year with only nulls still yields a finite result
    let rows = vec![obs("A", 2020, Some(4.0)), obs("A", 2021, None)];
    let s = aggregate(&rows);
    assert_eq!(s.total_pop_latest, Some(0.0));
    assert_eq!(s.growth_abs, Some(-4.0));
    assert!(s.growth_pct.unwrap().is_finite());
}

#[test]
fn series_sums_match_population_sum() {
    let rows = vec![
        obs("A", 1990, Some(3.5)),
        obs("B", 1990, None),
        obs("C", 1991, Some(7.25)),
        obs("A", 1992, Some(1.0)),
        obs("B", 1992, Some(2.0)),
        obs("C", 1960, Some(11.0)),
    ];
    let s = aggregate(&rows);
    let series_sum: f64 = s.series.iter().map(|p| p.total).sum();
    let pop_sum: f64 = rows.iter().filter_map(|r| r.population).sum();
    assert!((series_sum - pop_sum).abs() < 1e-9);
    let years: Vec<i32> = s.series.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![1960, 1990, 1991, 1992]);
}

#[test]
fn ranking_is_descending_and_stable_on_ties() {
    let rows = vec![
        obs("Low", 2022, Some(1.0)),
        obs("TieFirst", 2022, Some(5.0)),
        obs("High", 2022, Some(9.0)),
        obs("TieSecond", 2022, Some(5.0)),
        obs("High", 2021, Some(100.0)),
    ];
    let first = aggregate(&rows).country_totals_latest;
    let names: Vec<&str> = first.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["High", "TieFirst", "TieSecond", "Low"]);
    for _ in 0..5 {
        assert_eq!(aggregate(&rows).country_totals_latest, first);
    }
}

#[test]
fn countries_count_uses_names_not_codes() {
    let mut a = obs("Same", 2020, Some(1.0));
    let mut b = obs("Same", 2020, Some(2.0));
    a.code = "X1".into();
    b.code = "X2".into();
    let s = aggregate(&[a, b]);
    assert_eq!(s.countries_count, 1);
    assert_eq!(s.country_totals_latest.len(), 1);
    assert_eq!(s.country_totals_latest[0].total, 3.0);
}
