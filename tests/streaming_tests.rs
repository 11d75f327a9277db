//! Streaming operators over real CSV sources.

mod test_data_gen;

use std::collections::HashMap;

use podium::core::{ColumnNames, Row, Value};
use podium::io::{CsvRowReader, ReadOptions};
use podium::operators::{
    collect_rows, filter_project_sorted, filter_project_stream, group_by_count_stream, group_by_stream,
    Aggregation, Condition, FilterProject, GroupBy, Page, Predicate, RowSource, RowsSource, SortKey,
};
use test_data_gen::{write_large_events, Fixture};

fn large(fx: &Fixture, rows: usize) -> std::path::PathBuf {
    let path = fx.path().join("events.csv");
    write_large_events(&path, rows);
    path
}

fn open(path: &std::path::Path) -> CsvRowReader<std::fs::File> {
    CsvRowReader::open(path, ReadOptions::default()).unwrap()
}

fn usa_medals() -> Predicate {
    Predicate::all()
        .and(Condition::not_null("Medal"))
        .and(Condition::eq("NOC", "USA"))
}

#[test]
fn total_is_independent_of_page() {
    let fx = Fixture::new();
    let path = large(&fx, 5_000);
    let predicate = usa_medals();

    let expected = collect_rows(open(&path))
        .unwrap()
        .iter()
        .filter(|r| predicate.eval(r).unwrap())
        .count() as u64;
    assert!(expected > 0);

    for page in [Page::new(0, 10), Page::from_number(3, 7), Page::from_number(10_000, 50), Page::all()] {
        let paged = filter_project_stream(open(&path), &predicate, None, page).unwrap();
        assert_eq!(paged.total, expected);
        assert_eq!(paged.scanned, 5_000);
    }

    let far = filter_project_stream(open(&path), &predicate, None, Page::from_number(10_000, 50)).unwrap();
    assert!(far.rows.is_empty());
}

#[test]
fn pages_tile_the_match_sequence() {
    let fx = Fixture::new();
    let path = large(&fx, 2_000);
    let predicate = usa_medals();
    let projection = vec!["ID".to_string(), "Year".to_string()];

    let all = filter_project_stream(open(&path), &predicate, Some(projection.as_slice()), Page::all()).unwrap();
    let mut stitched = Vec::new();
    for n in 1..=4 {
        let page =
            filter_project_stream(open(&path), &predicate, Some(projection.as_slice()), Page::from_number(n, 25))
                .unwrap();
        stitched.extend(page.rows);
    }
    let want: Vec<&Row> = all.rows.iter().take(100).collect();
    assert_eq!(stitched.len(), want.len());
    for (a, b) in stitched.iter().zip(want) {
        assert_eq!(a.values(), b.values());
    }
    assert_eq!(&all.columns[..], &projection[..]);
}

#[test]
fn year_order_pages_match_full_sort() {
    let fx = Fixture::new();
    let path = large(&fx, 1_200);
    let predicate = Predicate::all().and(Condition::eq("NOC", "FRA"));
    let key = SortKey::asc("Year");

    let everything = filter_project_sorted(open(&path), &predicate, None, &key, Page::all()).unwrap();
    let years: Vec<i64> = everything
        .rows
        .iter()
        .map(|r| r.get("Year").unwrap().as_i64().unwrap())
        .collect();
    assert!(years.windows(2).all(|w| w[0] <= w[1]));

    let page = filter_project_sorted(open(&path), &predicate, None, &key, Page::from_number(2, 15)).unwrap();
    assert_eq!(page.total, everything.total);
    let ids = |rows: &[Row]| -> Vec<String> { rows.iter().map(|r| r.get("ID").unwrap().to_string()).collect() };
    assert_eq!(ids(page.rows.as_slice()), ids(&everything.rows[15..30]));
}

#[test]
fn count_by_key_from_rows() {
    let cols: ColumnNames = vec!["NOC".to_string()].into();
    let rows: Vec<Row> = ["USA", "USA", "FRA"]
        .iter()
        .map(|n| Row::new(cols.clone(), vec![Value::from(*n)]).unwrap())
        .collect();

    let counts = group_by_count_stream(RowsSource::new(cols, rows), &["NOC"], "count").unwrap();
    let got: HashMap<String, i64> = counts
        .iter()
        .map(|r| {
            (
                r.get("NOC").unwrap().to_string(),
                r.get("count").unwrap().as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(got, HashMap::from([("USA".to_string(), 2), ("FRA".to_string(), 1)]));
    assert_eq!(counts.len(), 2);
}

#[test]
fn adapters_compose() {
    let fx = Fixture::new();
    let path = large(&fx, 600);
    let projection = vec!["NOC".to_string(), "Medal".to_string()];

    let medals = FilterProject::new(
        open(&path),
        &Predicate::all().and(Condition::not_null("Medal")),
        Some(projection.as_slice()),
    )
    .unwrap();
    let mut gold = FilterProject::new(medals, &Predicate::all().and(Condition::eq("Medal", "Gold")), None).unwrap();

    assert_eq!(&gold.columns()[..], &projection[..]);
    let rows = collect_rows(&mut gold).unwrap();
    // one Gold every six rows
    assert_eq!(rows.len(), 100);
    assert_eq!(gold.matched(), 100);
    assert_eq!(gold.scanned(), 300);
    assert_eq!(gold.source().scanned(), 600);
}

#[test]
fn streaming_group_by_matches_frame_group_by() {
    let fx = Fixture::new();
    let path = large(&fx, 3_000);
    let spec = GroupBy::new(&["NOC"])
        .count_as("rows")
        .agg(Aggregation::min("Year").alias("first"))
        .agg(Aggregation::sum("Age").alias("ages"));

    let streamed = group_by_stream(open(&path), &spec).unwrap();
    let frame = podium::operators::Frame::from_source(open(&path)).unwrap();
    let grouped = frame.group_by(&spec).unwrap();

    assert_eq!(streamed.columns(), grouped.columns());
    assert_eq!(streamed.len(), 5);
    for (a, b) in streamed.iter().zip(grouped.iter()) {
        assert_eq!(a.values(), b.values());
    }
    assert_eq!(streamed.rows()[0].get("rows").unwrap(), &Value::Int(600));
    assert_eq!(streamed.rows()[0].get("first").unwrap(), &Value::Int(1896));
}

#[test]
fn unknown_projection_fails_before_reading() {
    let fx = Fixture::new();
    let path = large(&fx, 10);
    let projection = vec!["Medals".to_string()];
    let err = FilterProject::new(open(&path), &Predicate::all(), Some(projection.as_slice()))
        .err()
        .unwrap();
    assert!(err.to_string().contains("Medals"));
}
