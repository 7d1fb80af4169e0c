use std::cell::RefCell;

use strata_common::Result;
use strata_schema::MessageType;

use crate::{
    converter::{GroupConverter, RecordMaterializer},
    mem::MemPageStore,
    page::LevelTriple,
    read::{ColumnReadOptions, ReaderKind, RecordReader},
    tests::{
        EventLog, RecordingGroup, TriplePageStore, document_page_store, document_schema,
        flat_schema, measurement_page_store, new_event_log, take_events,
    },
};

/// Materializes each record as its event log.
struct EventMaterializer {
    events: EventLog,
    root: RecordingGroup,
    taken: RefCell<usize>,
}

impl EventMaterializer {
    fn new(schema: &MessageType) -> EventMaterializer {
        let events = new_event_log();
        EventMaterializer {
            root: RecordingGroup::for_schema(schema, &events),
            events,
            taken: RefCell::new(0),
        }
    }
}

impl RecordMaterializer for EventMaterializer {
    type Record = Vec<String>;

    fn root_converter(&self) -> &dyn GroupConverter {
        &self.root
    }

    fn take_record(&self) -> Result<Vec<String>> {
        *self.taken.borrow_mut() += 1;
        Ok(take_events(&self.events))
    }
}

#[test]
fn test_record_reader_brackets_each_column() {
    let schema = document_schema();
    let store = document_page_store();
    let materializer = EventMaterializer::new(&schema);
    let reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
    assert_eq!(reader.row_count(), 2);
    assert_eq!(reader.column_readers().len(), 6);

    let records = reader.collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(*materializer.taken.borrow(), 2);
    assert_eq!(
        records[1],
        vec![
            "start Document",
            "DocId=20",
            "end Document",
            "start Document",
            "start Links",
            "Backward=10",
            "Backward=30",
            "end Links",
            "end Document",
            "start Document",
            "start Links",
            "Forward=80",
            "end Links",
            "end Document",
            "start Document",
            "start Name",
            "end Name",
            "end Document",
            "start Document",
            "start Name",
            "end Name",
            "end Document",
            "start Document",
            "start Name",
            "Url='http://C'",
            "end Name",
            "end Document",
        ]
    );
}

#[test]
fn test_flat_and_generic_records_match() {
    let schema = flat_schema(false);
    let store = measurement_page_store();

    let materializer = EventMaterializer::new(&schema);
    let reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
    assert!(
        reader
            .column_readers()
            .iter()
            .all(|r| r.kind() == ReaderKind::Flat)
    );
    let flat_records = reader.collect::<Result<Vec<_>>>().unwrap();

    let materializer = EventMaterializer::new(&schema);
    let generic_records = RecordReader::with_options(
        &store,
        &materializer,
        &schema,
        "",
        ColumnReadOptions {
            flat_fast_path: false,
        },
    )
    .unwrap()
    .collect::<Result<Vec<_>>>()
    .unwrap();
    assert_eq!(flat_records, generic_records);
    assert_eq!(
        flat_records[1],
        vec![
            "start Measurement",
            "Id=2",
            "end Measurement",
            "start Measurement",
            "end Measurement",
            "start Measurement",
            "Reading=2.5",
            "end Measurement",
        ]
    );
}

#[test]
fn test_record_count_disagreement() {
    let schema = document_schema();
    let materializer = EventMaterializer::new(&schema);

    // The page store claims more records than the columns hold.
    let mut store = MemPageStore::new(3);
    for path in schema.columns().iter().map(|c| c.path().to_vec()) {
        store.add_chunk(document_page_store().chunk(&path).unwrap().clone());
    }
    let mut reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
    assert!(reader.read().unwrap().is_some());
    assert!(reader.read().unwrap().is_some());
    let err = reader.read().err().unwrap();
    assert!(err.is_invalid_format(), "{err}");
    assert!(err.to_string().contains("ended after 2 of 3 records"));

    // Data left over after the last record.
    let flat = flat_schema(true);
    let materializer = EventMaterializer::new(&flat);
    let store = TriplePageStore::new(1)
        .with_column(
            &["Id"],
            vec![LevelTriple::value(0, 0, 1i64), LevelTriple::value(0, 0, 2i64)],
        )
        .with_column(&["Station"], vec![LevelTriple::value(0, 0, "x")])
        .with_column(&["Reading"], vec![LevelTriple::value(0, 0, 1.5f64)]);
    let mut reader = RecordReader::new(&store, &materializer, &flat, "").unwrap();
    assert_eq!(
        reader.read().unwrap().unwrap(),
        vec![
            "start Measurement",
            "Id=1",
            "end Measurement",
            "start Measurement",
            "Station='x'",
            "end Measurement",
            "start Measurement",
            "Reading=1.5",
            "end Measurement",
        ]
    );
    let err = reader.read().err().unwrap();
    assert!(err.to_string().contains("1 entries left after 1 records"));
}

#[test]
fn test_missing_column_fails_construction() {
    let schema = document_schema();
    let materializer = EventMaterializer::new(&schema);
    let store = TriplePageStore::new(1).with_column(&["DocId"], vec![]);
    let err = RecordReader::new(&store, &materializer, &schema, "")
        .err()
        .unwrap();
    assert!(err.is_schema_mismatch());
}

/// One Document record with two empty `Name` elements in the `Language` columns,
/// `url_names` elements in `Name.Url` and `Links` present only in `Backward`
/// when `links_mismatch` is set.
fn sibling_page_store(url_names: usize, links_mismatch: bool) -> TriplePageStore {
    use LevelTriple as T;
    let names = vec![T::null(0, 1), T::null(1, 1)];
    let url = (0..url_names)
        .map(|i| T::null(u32::from(i > 0), 1))
        .collect();
    TriplePageStore::new(1)
        .with_column(&["DocId"], vec![T::value(0, 0, 10i64)])
        .with_column(&["Links", "Backward"], vec![T::null(0, u32::from(links_mismatch))])
        .with_column(&["Links", "Forward"], vec![T::null(0, 0)])
        .with_column(&["Name", "Language", "Code"], names.clone())
        .with_column(&["Name", "Language", "Country"], names)
        .with_column(&["Name", "Url"], url)
}

#[test]
fn test_sibling_columns_must_agree_on_shared_groups() {
    let schema = document_schema();
    let materializer = EventMaterializer::new(&schema);

    let store = sibling_page_store(2, false);
    let mut reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
    let events = reader.read().unwrap().unwrap();
    assert_eq!(events.iter().filter(|e| *e == "start Name").count(), 6);
    assert!(reader.read().unwrap().is_none());

    for url_names in [1, 3] {
        let store = sibling_page_store(url_names, false);
        let mut reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
        let err = reader.read().err().unwrap();
        assert!(err.is_invalid_format(), "{err}");
        assert_eq!(
            err.to_string(),
            "invalid storage format for 'Name.Url': disagrees with \
             'Name.Language.Country' on the elements of 'Name' in record 0"
        );
    }

    let store = sibling_page_store(2, true);
    let mut reader = RecordReader::new(&store, &materializer, &schema, "").unwrap();
    let err = reader.read().err().unwrap();
    assert!(err.is_invalid_format(), "{err}");
    assert!(err.to_string().contains("on the elements of 'Links'"), "{err}");
}
