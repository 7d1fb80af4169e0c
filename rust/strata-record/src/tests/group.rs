use strata_common::error::ErrorKind;

use crate::{Group, tests::paper};

#[test]
fn test_group_accessors() {
    let record = paper::record_a();
    assert_eq!(record.value("DocId", 0).unwrap().as_i64(), Some(10));
    assert_eq!(record.value_count("Name").unwrap(), 3);

    let links = record.group("Links", 0).unwrap();
    assert_eq!(links.value_count("Backward").unwrap(), 0);
    assert_eq!(links.value_count("Forward").unwrap(), 3);
    assert_eq!(links.value("Forward", 2).unwrap().as_i64(), Some(60));

    let language = record
        .group("Name", 0)
        .unwrap()
        .group("Language", 1)
        .unwrap();
    assert_eq!(language.value("Code", 0).unwrap().as_str(), Some("en"));
    assert_eq!(language.value_count("Country").unwrap(), 0);

    assert!(record.value("DocId", 1).is_err());
    assert!(record.group("DocId", 0).is_err());
    assert!(record.values("Missing").unwrap_err().is_schema_mismatch());
}

#[test]
fn test_group_rejects_invalid_additions() {
    let mut record = Group::new(paper::schema().root().clone());

    let err = record.add("DocId", "ten").unwrap_err();
    assert!(err.is_capability_mismatch());

    record.add("DocId", 10i64).unwrap();
    let err = record.add("DocId", 11i64).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidOperation { .. }));

    assert!(record.add("Missing", 1i64).unwrap_err().is_schema_mismatch());
    assert!(record.add_group("DocId").unwrap_err().is_schema_mismatch());
    assert!(record.add("Name", "x").unwrap_err().is_schema_mismatch());

    record.add_group("Links").unwrap();
    let err = record.add_group("Links").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidOperation { .. }));

    record.add_group("Name").unwrap();
    record.add_group("Name").unwrap();
    assert_eq!(record.value_count("Name").unwrap(), 2);
}

#[test]
fn test_group_display() {
    let expected = "\
DocId: 10
Links
  Forward: 20
  Forward: 40
  Forward: 60
Name
  Language
    Code: 'en-us'
    Country: 'us'
  Language
    Code: 'en'
  Url: 'http://A'
Name
  Url: 'http://B'
Name
  Language
    Code: 'en-gb'
    Country: 'gb'
";
    assert_eq!(paper::record_a().to_string(), expected);
}

#[test]
fn test_group_equality_depends_on_schema() {
    let mut full = Group::new(paper::schema().root().clone());
    full.add("DocId", 20i64).unwrap();
    let mut projected = Group::new(paper::links_schema().root().clone());
    projected.add("DocId", 20i64).unwrap();
    assert_ne!(full, projected);
    assert_eq!(full, full.clone());
}
