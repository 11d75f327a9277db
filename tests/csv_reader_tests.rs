//! CSV row stream: limits, malformed rows, declared types and source errors.

mod test_data_gen;

use podium::core::{DataType, Error, Row, Value};
use podium::io::{CsvRowReader, IoError, ReadOptions};
use podium::{MalformedPolicy, PreviewTable, QueryError, SearchParams, Table};
use test_data_gen::{olympics, write_large_events, Fixture};

const RAGGED: &str = "NOC,region\nUSA,United States\nFRA\nCHN,China,extra\nGBR,UK\n";

fn ragged(policy: MalformedPolicy) -> CsvRowReader<&'static [u8]> {
    CsvRowReader::from_reader(
        RAGGED.as_bytes(),
        "countries",
        ReadOptions::default().with_policy(policy),
    )
    .unwrap()
}

#[test]
fn limit_stops_reading_large_file() {
    let fx = Fixture::new();
    let path = fx.path().join("events.csv");
    write_large_events(&path, 200_000);
    let file_len = std::fs::metadata(&path).unwrap().len();

    let mut reader = CsvRowReader::open(&path, ReadOptions::default().with_limit(10)).unwrap();
    let counter = reader.counter();
    let mut rows = Vec::new();
    while let Some(row) = reader.read_row().unwrap() {
        rows.push(row);
    }

    assert_eq!(rows.len(), 10);
    let stats = reader.stats();
    assert_eq!(stats.records_read, 10);
    assert_eq!(stats.rows_emitted, 10);
    // at most a buffer or two of a multi-megabyte file
    assert!(
        counter.bytes() < file_len / 20,
        "read {} of {} bytes",
        counter.bytes(),
        file_len
    );
    assert_eq!(rows[9].get("Name").unwrap(), &Value::from("Athlete 9"));
}

#[test]
fn preview_query_reads_only_the_limit() {
    let fx = Fixture::new();
    write_large_events(&fx.path().join("events.csv"), 200_000);

    let result = fx.engine().preview(PreviewTable::Events, 10).unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(result.columns.len(), 15);
    assert_eq!(result.metrics.unwrap().rows_scanned, 10);
}

#[test]
fn skip_policy_drops_and_counts_bad_rows() {
    let mut reader = ragged(MalformedPolicy::Skip);
    let rows: Vec<Row> = reader.by_ref().collect::<Result<_, _>>().unwrap();

    let nocs: Vec<String> = rows.iter().map(|r| r.get("NOC").unwrap().to_string()).collect();
    assert_eq!(nocs, vec!["USA", "GBR"]);
    let stats = reader.stats();
    assert_eq!(stats.records_read, 4);
    assert_eq!(stats.malformed_rows, 2);
    assert_eq!(stats.rows_emitted, 2);
}

#[test]
fn fail_policy_ends_the_stream() {
    let mut reader = ragged(MalformedPolicy::Fail);
    assert!(reader.next().unwrap().is_ok());

    match reader.next() {
        Some(Err(IoError::Core(Error::MalformedRow {
            line,
            expected,
            found,
        }))) => {
            assert_eq!(line, 3);
            assert_eq!((expected, found), (2, 1));
        }
        other => panic!("expected malformed row error, got {:?}", other.map(|r| r.is_ok())),
    }
    assert!(reader.next().is_none());
}

#[test]
fn pad_policy_fills_and_truncates() {
    let mut reader = ragged(MalformedPolicy::Pad);
    let rows: Vec<Row> = reader.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].get("region").unwrap(), &Value::Null);
    assert_eq!(rows[2].len(), 2);
    assert_eq!(rows[2].get("region").unwrap(), &Value::from("China"));
    assert_eq!(reader.stats().malformed_rows, 2);
}

#[test]
fn declared_columns_do_not_infer() {
    let data = "NOC,Year,Population\n001,2012,abc\nUSA,x,1e6\n";
    let opts = ReadOptions::default()
        .declare("NOC", DataType::Utf8)
        .declare("Year", DataType::Int64)
        .declare("Population", DataType::Float64);
    let mut reader = CsvRowReader::from_reader(data.as_bytes(), "stats", opts).unwrap();
    let rows: Vec<Row> = reader.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(rows[0].get("NOC").unwrap(), &Value::from("001"));
    assert_eq!(rows[0].get("Year").unwrap(), &Value::Int(2012));
    assert_eq!(rows[0].get("Population").unwrap(), &Value::Null);
    assert_eq!(rows[1].get("Year").unwrap(), &Value::Null);
    assert_eq!(rows[1].get("Population").unwrap(), &Value::Float(1e6));
    assert_eq!(reader.schema().fields[1].data_type, DataType::Int64);
}

#[test]
fn configured_delimiter_and_tokens() {
    let fx = Fixture::new();
    fx.write("countries.csv", "NOC;region;notes\nUSA;United States;-\nFRA;France;\n");
    let cfg = podium::EngineConfig {
        delimiter: ';',
        null_tokens: vec!["-".into()],
        ..fx.config()
    };
    let engine = podium::Engine::new(cfg).unwrap();

    let result = engine.preview(PreviewTable::Countries, 20).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.value(0, "region"), Some(&Value::from("United States")));
    assert_eq!(result.value(0, "notes"), Some(&Value::Null));
    assert_eq!(result.value(1, "notes"), Some(&Value::Null));
}

#[test]
fn duplicate_header_is_a_schema_error() {
    let err = CsvRowReader::from_reader("NOC,NOC\nUSA,USA\n".as_bytes(), "dup", ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, IoError::Core(Error::Schema(_))));
}

#[test]
fn missing_file_is_a_source_error() {
    let fx = Fixture::new();
    let err = CsvRowReader::open(fx.path().join("nope.csv"), ReadOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, IoError::Open { .. }));

    let err = fx.engine().preview(PreviewTable::Events, 5).unwrap_err();
    assert!(matches!(err, QueryError::Source { table: Table::Events, .. }));
}

#[test]
fn undecodable_row_is_skipped_by_queries() {
    let fx = olympics();
    let path = fx.path().join("events.csv");
    let mut bytes = std::fs::read(&path).unwrap();
    let needle = b"Marie Dubois";
    let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
    bytes[at + 1] = 0xff;
    bytes[at + 2] = 0xfe;
    std::fs::write(&path, bytes).unwrap();

    let page = fx.engine().search_athletes(&SearchParams::default()).unwrap();
    assert_eq!(page.total, 6);
    let names: Vec<String> = page.data.iter().map(|r| r.get("Name").unwrap().to_string()).collect();
    assert_eq!(
        names,
        vec!["John Smith", "Anna Smithson", "Lee Wong", "Pierre Martin", "Kim Park", "Joe Smith"]
    );
    let metrics = page.metrics.unwrap();
    assert_eq!(metrics.malformed_rows, 1);
    assert_eq!(metrics.rows_scanned, 7);

    let sports = fx.engine().list_sports().unwrap();
    assert!(!sports.contains(&"Fencing".to_string()));
}
