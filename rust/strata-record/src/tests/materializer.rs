use strata_column::{
    Value,
    converter::RecordMaterializer,
};

use crate::{Group, GroupRecordMaterializer, tests::paper};

#[test]
fn test_materializer_assembles_from_column_passes() {
    let schema = paper::links_schema();
    let materializer = GroupRecordMaterializer::new(&schema);
    let root = materializer.root_converter();

    // DocId column
    root.start().unwrap();
    root.child(0)
        .unwrap()
        .as_primitive()
        .unwrap()
        .add_value(Value::Int64(20))
        .unwrap();
    root.end().unwrap();

    // Links.Backward column
    let links = root.child(1).unwrap().as_group().unwrap();
    root.start().unwrap();
    links.start().unwrap();
    let backward = links.child(0).unwrap().as_primitive().unwrap();
    backward.add_int64(10).unwrap();
    backward.add_int64(30).unwrap();
    links.end().unwrap();
    root.end().unwrap();

    // Links.Forward column enters the same Links element.
    root.start().unwrap();
    links.start().unwrap();
    links
        .child(1)
        .unwrap()
        .as_primitive()
        .unwrap()
        .add_int64(80)
        .unwrap();
    links.end().unwrap();
    root.end().unwrap();

    let record = materializer.take_record().unwrap();
    assert_eq!(record, paper::links_records().remove(1));

    let empty = materializer.take_record().unwrap();
    assert_eq!(empty, Group::new(schema.root().clone()));
}

#[test]
fn test_materializer_capabilities() {
    let schema = paper::schema();
    let materializer = GroupRecordMaterializer::new(&schema);
    let root = materializer.root_converter();

    let doc_id = root.child(0).unwrap();
    assert_eq!(doc_id.name(), "DocId");
    assert!(doc_id.as_group().err().unwrap().is_capability_mismatch());

    let name = root.child(2).unwrap();
    assert!(name.as_primitive().err().unwrap().is_capability_mismatch());
    assert!(root.child(3).is_err());

    root.start().unwrap();
    let err = doc_id
        .as_primitive()
        .unwrap()
        .add_value(Value::String("ten".into()))
        .unwrap_err();
    assert!(err.is_capability_mismatch());
    let err = doc_id.as_primitive().unwrap().add_boolean(true).unwrap_err();
    assert!(err.is_capability_mismatch());
}

#[test]
fn test_materializer_rejects_unbalanced_events() {
    let schema = paper::schema();
    let materializer = GroupRecordMaterializer::new(&schema);
    let root = materializer.root_converter();
    let links = root.child(1).unwrap().as_group().unwrap();

    root.start().unwrap();
    assert!(links.end().is_err());

    links.start().unwrap();
    assert!(root.end().is_err());
}
