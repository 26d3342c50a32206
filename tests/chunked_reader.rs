use std::collections::BTreeSet;

use chunked_sheet_reader::reader::ChunkedReader;
use chunked_sheet_reader::source::MemorySource;
use chunked_sheet_reader::types::{CellValue, ColumnDefinition, ColumnType, ReadBatch, Record, Schema};

fn id_amt_schema(amt_required: bool) -> Schema {
    let amt = if amt_required {
        ColumnDefinition::required("amt", ColumnType::Float)
    } else {
        ColumnDefinition::optional("amt", ColumnType::Float)
    };
    Schema::new(vec![ColumnDefinition::required("id", ColumnType::Int), amt])
}

fn reader(rows: &[&[&str]], schema: Schema) -> ChunkedReader<MemorySource> {
    ChunkedReader::new(MemorySource::from_text_rows(rows.iter().map(|r| r.iter())), schema)
}

fn record(fields: &[(&str, &str)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (*k, CellValue::text(*v)))
        .collect()
}

fn warned_rows(batches: &[ReadBatch]) -> BTreeSet<usize> {
    batches
        .iter()
        .flat_map(|b| b.warn.iter())
        .filter_map(|w| w.strip_prefix('[')?.split(',').next()?.parse().ok())
        .collect()
}

#[test]
fn single_read_splits_valid_and_warned_rows() {
    let mut r = reader(
        &[&["id", "amt"], &["7", "3.5"], &["x", "2"]],
        id_amt_schema(false),
    );

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.list, vec![record(&[("id", "7"), ("amt", "3.5")])]);
    assert_eq!(batch.warn, vec!["[3, id] must be INT (which is 'x')".to_string()]);
    assert!(batch.error.is_empty());
    assert!(r.finished());
    assert_eq!(r.read(10).unwrap(), None);
}

#[test]
fn missing_required_column_is_fatal() {
    let mut r = reader(&[&["id"], &["1"], &["2"]], id_amt_schema(true));

    assert_eq!(r.headers().unwrap(), ["id".to_string()]);
    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.error, vec!["Can't find column 'amt'".to_string()]);
    assert!(batch.list.is_empty());
    assert!(batch.warn.is_empty());
    assert!(r.finished());
    assert_eq!(r.read(10).unwrap(), None);
}

#[test]
fn every_mismatched_required_column_is_reported() {
    let schema = Schema::new(vec![
        ColumnDefinition::required("id", ColumnType::Int),
        ColumnDefinition::required("name", ColumnType::String),
        ColumnDefinition::required("when", ColumnType::Date),
    ]);
    let mut r = reader(&[&["ID", "name"], &["1", "a"]], schema);

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(
        batch.error,
        vec![
            "Can't find column 'id'".to_string(),
            "Can't find column 'when'".to_string(),
        ]
    );
}

#[test]
fn optional_column_past_header_end_is_fatal() {
    let mut r = reader(&[&["id"], &["1"]], id_amt_schema(false));
    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.error, vec!["Can't find column 'amt'".to_string()]);
    assert!(r.finished());
}

#[test]
fn renamed_optional_column_is_skipped() {
    let mut r = reader(
        &[&["id", "price"], &["1", "oops"], &["2", "4"]],
        id_amt_schema(false),
    );

    let batch = r.read(10).unwrap().unwrap();
    assert!(batch.error.is_empty());
    assert!(batch.warn.is_empty());
    assert_eq!(batch.list, vec![record(&[("id", "1")]), record(&[("id", "2")])]);
}

#[test]
fn step_of_one_drains_four_data_rows_in_four_reads() {
    let mut r = reader(
        &[&["id", "amt"], &["1", "1"], &["2", "2"], &["3", "3"], &["4", "4"]],
        id_amt_schema(false),
    );

    for call in 1..=4 {
        assert!(!r.finished(), "finished before read {call}");
        let batch = r.read(1).unwrap().unwrap();
        assert_eq!(batch.list.len(), 1, "read {call}");
        assert_eq!(batch.list[0].get("id"), Some(&CellValue::text(call.to_string())));
    }
    assert!(r.finished());
    assert_eq!(r.read(1).unwrap(), None);
}

#[test]
fn reset_replays_identical_batches() {
    let rows: &[&[&str]] = &[
        &["id", "amt"],
        &["1", "1.5"],
        &["nope", "2"],
        &["3", ""],
        &["", "4"],
        &["5", "5"],
    ];
    let mut r = reader(rows, id_amt_schema(true));

    let first = r.drain(2).unwrap();
    r.reset();
    assert_eq!(r.cursor(), 1);
    let second = r.drain(2).unwrap();
    assert_eq!(first, second);

    // Reset in the middle of a session.
    r.reset();
    r.read(2).unwrap();
    r.reset();
    assert_eq!(r.drain(2).unwrap(), first);
}

#[test]
fn headers_are_loaded_once() {
    let mut r = reader(&[&["id", "amt"], &["1", "2"]], id_amt_schema(false));

    let first = r.headers().unwrap().to_vec();
    let second = r.headers().unwrap().to_vec();
    assert_eq!(first, vec!["id".to_string(), "amt".to_string()]);
    assert_eq!(first, second);
    assert_eq!(r.source().load_count(), 1);
    assert_eq!(r.cursor(), 1);

    r.read(10).unwrap();
    // The first read reuses the cached header row and loads one data window.
    assert_eq!(r.source().load_count(), 2);
}

#[test]
fn listed_and_warned_rows_cover_every_data_row() {
    let mut rows: Vec<Vec<String>> = vec![vec!["id".into(), "amt".into()]];
    for i in 0..23 {
        let id = if i % 5 == 0 { "bad".to_string() } else { i.to_string() };
        let amt = if i % 7 == 0 { String::new() } else { format!("{i}.25") };
        rows.push(vec![id, amt]);
    }
    let total = rows.len() - 1;

    for step in [1, 3, 4, 10, 23, 100, usize::MAX] {
        let mut r = ChunkedReader::new(MemorySource::from_text_rows(rows.clone()), id_amt_schema(true));
        let batches = r.drain(step).unwrap();
        let listed: usize = batches.iter().map(|b| b.list.len()).sum();
        assert_eq!(listed + warned_rows(&batches).len(), total, "step {step}");
        assert!(batches.iter().all(|b| b.error.is_empty()));
    }
}

#[test]
fn all_warnings_of_a_row_are_reported() {
    let mut r = reader(&[&["id", "amt"], &["x", "NULL"], &["2", "3"]], id_amt_schema(true));

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(
        batch.warn,
        vec![
            "[2, id] must be INT (which is 'x')".to_string(),
            "[2, amt] can't be NULL".to_string(),
        ]
    );
    assert_eq!(batch.list, vec![record(&[("id", "2"), ("amt", "3")])]);
}

#[test]
fn header_only_sheet_finishes_on_first_read() {
    let mut r = reader(&[&["id", "amt"]], id_amt_schema(false));
    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch, ReadBatch::default());
    assert!(r.finished());
}

#[test]
fn keys_and_extra_columns() {
    let schema = Schema::new(vec![
        ColumnDefinition::required("Listed On", ColumnType::Date).with_key("listed_on"),
        ColumnDefinition::required("At", ColumnType::Time),
    ]);
    let mut r = reader(
        &[
            &["Listed On", "At", "notes"],
            &["2024-02-29", "2024-02-29 13:45:00", "ignored"],
            &["2023-02-29", "2024/01/02 10:00:00", ""],
        ],
        schema,
    );

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(
        batch.list,
        vec![record(&[("listed_on", "2024-02-29"), ("At", "2024-02-29 13:45:00")])]
    );
    assert_eq!(
        batch.warn,
        vec!["[3, Listed On] must be DATE (which is '2023-02-29')".to_string()]
    );
}

#[test]
fn native_numbers_are_floats_and_ints() {
    let schema = Schema::new(vec![
        ColumnDefinition::required("n", ColumnType::Int),
        ColumnDefinition::required("f", ColumnType::Float),
    ]);
    let source = MemorySource::new(vec![
        vec![CellValue::text("n"), CellValue::text("f")],
        vec![CellValue::number(7.0), CellValue::number(0.5)],
        vec![CellValue::number(7.5), CellValue::number(1.0)],
    ]);
    let mut r = ChunkedReader::new(source, schema);

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.list.len(), 1);
    assert_eq!(batch.list[0].get("n"), Some(&CellValue::Number("7".to_string())));
    assert_eq!(batch.warn, vec!["[3, n] must be INT (which is '7.5')".to_string()]);
}

#[test]
fn batch_renders_as_json() {
    let mut r = reader(&[&["id", "amt"], &["7", ""], &["x", "2"]], id_amt_schema(false));
    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(
        batch.to_json(),
        serde_json::json!({
            "list": [{"id": "7", "amt": null}],
            "warn": ["[3, id] must be INT (which is 'x')"],
            "error": [],
        })
    );
}

#[test]
fn header_width_ignores_wider_data_rows() {
    let mut r = reader(&[&["id"], &["1", "2.5"], &["2", "3", "extra"]], id_amt_schema(false));

    assert_eq!(r.headers().unwrap(), ["id".to_string()]);
    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.error, vec!["Can't find column 'amt'".to_string()]);
    assert!(batch.list.is_empty());
    assert!(r.finished());
}

#[test]
fn header_keeps_interior_blank_cells() {
    let schema = Schema::new(vec![
        ColumnDefinition::required("id", ColumnType::Int),
        ColumnDefinition::optional("", ColumnType::String),
        ColumnDefinition::optional("amt", ColumnType::Float),
    ]);
    let mut r = reader(&[&["id", "", "amt"], &["1", "x", "2"]], schema);

    assert_eq!(r.headers().unwrap(), ["id", "", "amt"].map(String::from));
    let batch = r.read(10).unwrap().unwrap();
    assert!(batch.error.is_empty());
    assert_eq!(batch.list.len(), 1);
}

#[test]
fn whitespace_only_text_is_a_string_not_null() {
    let schema = Schema::new(vec![ColumnDefinition::required("name", ColumnType::String)]);
    let mut r = reader(&[&["name"], &[" "], &[" null "]], schema);

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.list, vec![record(&[("name", " ")])]);
    assert_eq!(batch.warn, vec!["[3, name] can't be NULL".to_string()]);
}

#[test]
fn shared_key_keeps_the_later_column() {
    let schema = Schema::new(vec![
        ColumnDefinition::required("a", ColumnType::String).with_key("v"),
        ColumnDefinition::required("b", ColumnType::String).with_key("v"),
    ]);
    let mut r = reader(&[&["a", "b"], &["first", "second"]], schema);

    let batch = r.read(10).unwrap().unwrap();
    assert_eq!(batch.list, vec![record(&[("v", "second")])]);
}
