use popdash::models::Observation;
use popdash::table::{SortColumn, SortOrder, paginate, sort_rows};

fn row(code: &str, name: &str, population: Option<f64>, year: i32) -> Observation {
    Observation {
        code: code.into(),
        iso3: String::new(),
        name: name.into(),
        population,
        year,
    }
}

fn sample() -> Vec<Observation> {
    vec![
        row("FR", "France", Some(68.0), 2022),
        row("DE", "Germany", None, 2021),
        row("AR", "Argentina", Some(46.0), 2022),
        row("DE", "Germany", Some(84.0), 2022),
    ]
}

#[test]
fn population_sort_puts_missing_last_both_ways() {
    let mut rows = sample();
    sort_rows(&mut rows, SortColumn::Population, SortOrder::Asc);
    let pops: Vec<Option<f64>> = rows.iter().map(|r| r.population).collect();
    assert_eq!(pops, vec![Some(46.0), Some(68.0), Some(84.0), None]);

    sort_rows(&mut rows, SortColumn::Population, SortOrder::Desc);
    let pops: Vec<Option<f64>> = rows.iter().map(|r| r.population).collect();
    assert_eq!(pops, vec![Some(84.0), Some(68.0), Some(46.0), None]);
}

#[test]
fn name_sort_is_stable() {
    let mut rows = sample();
    sort_rows(&mut rows, SortColumn::Name, SortOrder::Asc);
    let got: Vec<(&str, i32)> = rows.iter().map(|r| (r.name.as_str(), r.year)).collect();
    assert_eq!(
        got,
        vec![("Argentina", 2022), ("France", 2022), ("Germany", 2021), ("Germany", 2022)]
    );
}

#[test]
fn year_desc() {
    let mut rows = sample();
    sort_rows(&mut rows, SortColumn::Year, SortOrder::Desc);
    assert_eq!(rows.last().unwrap().year, 2021);
    assert_eq!(rows[0].code, "FR");
}

#[test]
fn pages_are_clamped() {
    let rows: Vec<Observation> = (0..7).map(|i| row("X", "X", Some(i as f64), 2000 + i)).collect();

    let p = paginate(&rows, 1, 3);
    assert_eq!((p.page, p.total_pages, p.total_rows, p.rows.len()), (1, 3, 7, 3));

    let p = paginate(&rows, 3, 3);
    assert_eq!(p.rows.len(), 1);
    assert_eq!(p.rows[0].year, 2006);

    let p = paginate(&rows, 99, 3);
    assert_eq!(p.page, 3);

    let p = paginate(&rows, 0, 3);
    assert_eq!(p.page, 1);
}

#[test]
fn empty_set_has_one_empty_page() {
    let p = paginate(&[], 5, 50);
    assert_eq!((p.page, p.total_pages, p.total_rows), (1, 1, 0));
    assert!(p.rows.is_empty());
}
