use strata_schema::{MessageType, PhysicalType, Repetition, Type};

use crate::{
    read::{ColumnReadOptions, ColumnReadStore, ReaderKind},
    tests::{
        RecordingGroup, TriplePageStore, document_page_store, document_schema, flat_schema,
        new_event_log,
    },
};

#[test]
fn test_schema_classification() {
    let events = new_event_log();
    let store = document_page_store();

    let schema = document_schema();
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert!(!read_store.is_flat_schema());
    assert!(!read_store.is_all_required());
    assert_eq!(read_store.row_count(), 2);

    let schema = flat_schema(false);
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert!(read_store.is_flat_schema());
    assert!(!read_store.is_all_required());

    let schema = flat_schema(true);
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert!(read_store.is_flat_schema());
    assert!(read_store.is_all_required());

    let schema = MessageType::new(
        "Tags",
        vec![
            Type::primitive(Repetition::Required, PhysicalType::Int32, "Id"),
            Type::primitive(Repetition::Repeated, PhysicalType::String, "Tag"),
        ],
    );
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert!(!read_store.is_flat_schema());

    // A required group makes the schema nested even if every field is required.
    let schema = MessageType::new(
        "Point",
        vec![Type::group(
            Repetition::Required,
            "Coordinates",
            vec![Type::primitive(
                Repetition::Required,
                PhysicalType::Double,
                "X",
            )],
        )],
    );
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert!(!read_store.is_flat_schema());
    assert!(read_store.is_all_required());
}

#[test]
fn test_reader_selection() {
    let events = new_event_log();
    let store = document_page_store();
    let schema = document_schema();
    let root = RecordingGroup::for_schema(&schema, &events);
    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    for column in schema.columns() {
        let reader = read_store.column_reader(&column).unwrap();
        assert_eq!(reader.kind(), ReaderKind::Generic);
        assert_eq!(reader.column(), &column);
    }

    let store = TriplePageStore::new(0)
        .with_column(&["Id"], vec![])
        .with_column(&["Station"], vec![]);
    let schema = flat_schema(false);
    let root = RecordingGroup::for_schema(&schema, &events);
    let column = schema.column(&["Station"]).unwrap();

    let read_store = ColumnReadStore::new(&store, &root, &schema, "");
    assert_eq!(
        read_store.column_reader(&column).unwrap().kind(),
        ReaderKind::Flat
    );

    let read_store = ColumnReadStore::with_options(
        &store,
        &root,
        &schema,
        "",
        ColumnReadOptions {
            flat_fast_path: false,
        },
    );
    assert!(!read_store.options().flat_fast_path);
    assert_eq!(
        read_store.column_reader(&column).unwrap().kind(),
        ReaderKind::Generic
    );
}

#[test]
fn test_writer_version_fail_soft() {
    let events = new_event_log();
    let store = document_page_store();
    let schema = document_schema();
    let root = RecordingGroup::for_schema(&schema, &events);
    let column = schema.column(&["DocId"]).unwrap();

    for created_by in ["", "   ", "garbage", "version", "parquet-mr version 1.0 (build"] {
        let read_store = ColumnReadStore::new(&store, &root, &schema, created_by);
        assert!(read_store.writer_version().is_none(), "{created_by}");
        let reader = read_store.column_reader(&column).unwrap();
        assert!(reader.writer_version().is_none());
    }

    let read_store = ColumnReadStore::new(
        &store,
        &root,
        &schema,
        "parquet-mr version 1.6.0 (build 6aa21f8776625b5fa6b18059cfebe7549f2e00cb)",
    );
    let version = read_store.writer_version().unwrap();
    assert_eq!(version.application(), "parquet-mr");
    assert_eq!(version.version(), Some("1.6.0"));
    assert!(version.requires_sequential_page_reads());

    let reader = read_store.column_reader(&column).unwrap();
    assert_eq!(reader.writer_version(), Some(version));
}
