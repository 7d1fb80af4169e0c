//! Test harness: an event-recording converter tree, a raw triple page source and
//! the Document fixture streams.

use std::{cell::RefCell, rc::Rc};

use ahash::AHashMap;
use strata_common::{Result, error::Error};
use strata_schema::{ColumnDescriptor, GroupType, MessageType, PhysicalType, Repetition, Type};

use crate::{
    converter::{Converter, GroupConverter, PrimitiveConverter},
    mem::{ColumnChunkWriter, MemPageStore},
    page::{LevelTriple, PageReadStore, PageReader},
    value::Value,
};

mod column_read_store;
mod record_reader;

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Converter node recording every event it receives as a line of text:
/// `start Name`, `end Name`, `Code='en-us'`.
pub enum RecordingNode {
    Group(RecordingGroup),
    Primitive(RecordingPrimitive),
}

impl RecordingNode {
    fn as_converter(&self) -> &dyn Converter {
        match self {
            RecordingNode::Group(g) => g,
            RecordingNode::Primitive(p) => p,
        }
    }
}

pub struct RecordingGroup {
    name: String,
    events: EventLog,
    children: Vec<RecordingNode>,
}

impl RecordingGroup {
    pub fn new(name: &str, events: &EventLog, children: Vec<RecordingNode>) -> RecordingGroup {
        RecordingGroup {
            name: name.to_string(),
            events: events.clone(),
            children,
        }
    }

    /// Builds a converter tree mirroring `schema`.
    pub fn for_schema(schema: &MessageType, events: &EventLog) -> RecordingGroup {
        Self::for_group(schema.root(), events)
    }

    fn for_group(group: &GroupType, events: &EventLog) -> RecordingGroup {
        let children = group
            .fields()
            .iter()
            .map(|field| match field {
                Type::Primitive(leaf) => {
                    RecordingNode::Primitive(RecordingPrimitive::new(leaf.name(), events))
                }
                Type::Group(child) => RecordingNode::Group(Self::for_group(child, events)),
            })
            .collect();
        RecordingGroup::new(group.name(), events, children)
    }
}

impl Converter for RecordingGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_group(&self) -> Result<&dyn GroupConverter> {
        Ok(self)
    }
}

impl GroupConverter for RecordingGroup {
    fn child(&self, field_index: usize) -> Result<&dyn Converter> {
        self.children
            .get(field_index)
            .map(RecordingNode::as_converter)
            .ok_or_else(|| Error::invalid_arg("field_index", field_index.to_string()))
    }

    fn start(&self) -> Result<()> {
        self.events.borrow_mut().push(format!("start {}", self.name));
        Ok(())
    }

    fn end(&self) -> Result<()> {
        self.events.borrow_mut().push(format!("end {}", self.name));
        Ok(())
    }
}

pub struct RecordingPrimitive {
    name: String,
    events: EventLog,
}

impl RecordingPrimitive {
    pub fn new(name: &str, events: &EventLog) -> RecordingPrimitive {
        RecordingPrimitive {
            name: name.to_string(),
            events: events.clone(),
        }
    }
}

impl Converter for RecordingPrimitive {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_primitive(&self) -> Result<&dyn PrimitiveConverter> {
        Ok(self)
    }
}

impl PrimitiveConverter for RecordingPrimitive {
    fn add_value(&self, value: Value) -> Result<()> {
        self.events
            .borrow_mut()
            .push(format!("{}={value}", self.name));
        Ok(())
    }
}

pub fn new_event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Drains the log.
pub fn take_events(events: &EventLog) -> Vec<String> {
    std::mem::take(&mut *events.borrow_mut())
}

/// Page source serving unvalidated triples, for feeding malformed streams to the
/// readers.
pub struct TriplePageStore {
    row_count: u64,
    columns: AHashMap<Vec<String>, Vec<LevelTriple>>,
}

impl TriplePageStore {
    pub fn new(row_count: u64) -> TriplePageStore {
        TriplePageStore {
            row_count,
            columns: AHashMap::new(),
        }
    }

    pub fn with_column(mut self, path: &[&str], triples: Vec<LevelTriple>) -> TriplePageStore {
        self.columns
            .insert(path.iter().map(|s| s.to_string()).collect(), triples);
        self
    }
}

impl PageReadStore for TriplePageStore {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn page_reader(&self, column: &ColumnDescriptor) -> Result<Box<dyn PageReader + '_>> {
        let triples = self
            .columns
            .get(column.path())
            .ok_or_else(|| Error::schema_mismatch(column.path_string(), "no such column"))?;
        Ok(Box::new(TriplePageReader {
            triples: triples.clone(),
            pos: 0,
        }))
    }
}

struct TriplePageReader {
    triples: Vec<LevelTriple>,
    pos: usize,
}

impl PageReader for TriplePageReader {
    fn total_value_count(&self) -> u64 {
        self.triples.len() as u64
    }

    fn remaining(&self) -> u64 {
        (self.triples.len() - self.pos) as u64
    }

    fn read_triple(&mut self) -> Result<Option<LevelTriple>> {
        let triple = self.triples.get(self.pos).cloned();
        if triple.is_some() {
            self.pos += 1;
        }
        Ok(triple)
    }
}

pub fn document_schema() -> MessageType {
    use PhysicalType::*;
    use Repetition::*;
    MessageType::new(
        "Document",
        vec![
            Type::primitive(Required, Int64, "DocId"),
            Type::group(
                Optional,
                "Links",
                vec![
                    Type::primitive(Repeated, Int64, "Backward"),
                    Type::primitive(Repeated, Int64, "Forward"),
                ],
            ),
            Type::group(
                Repeated,
                "Name",
                vec![
                    Type::group(
                        Repeated,
                        "Language",
                        vec![
                            Type::primitive(Required, String, "Code"),
                            Type::primitive(Optional, String, "Country"),
                        ],
                    ),
                    Type::primitive(Optional, String, "Url"),
                ],
            ),
        ],
    )
}

/// Striped form of the two Document records, column by column.
pub fn document_triples() -> Vec<(Vec<&'static str>, Vec<LevelTriple>)> {
    use LevelTriple as T;
    vec![
        (
            vec!["DocId"],
            vec![T::value(0, 0, 10i64), T::value(0, 0, 20i64)],
        ),
        (
            vec!["Links", "Backward"],
            vec![T::null(0, 1), T::value(0, 2, 10i64), T::value(1, 2, 30i64)],
        ),
        (
            vec!["Links", "Forward"],
            vec![
                T::value(0, 2, 20i64),
                T::value(1, 2, 40i64),
                T::value(1, 2, 60i64),
                T::value(0, 2, 80i64),
            ],
        ),
        (
            vec!["Name", "Language", "Code"],
            vec![
                T::value(0, 2, "en-us"),
                T::value(2, 2, "en"),
                T::null(1, 1),
                T::value(1, 2, "en-gb"),
                T::null(0, 1),
            ],
        ),
        (
            vec!["Name", "Language", "Country"],
            vec![
                T::value(0, 3, "us"),
                T::null(2, 2),
                T::null(1, 1),
                T::value(1, 3, "gb"),
                T::null(0, 1),
            ],
        ),
        (
            vec!["Name", "Url"],
            vec![
                T::value(0, 2, "http://A"),
                T::value(1, 2, "http://B"),
                T::null(1, 1),
                T::value(0, 2, "http://C"),
            ],
        ),
    ]
}

/// The Document records as an in-memory page store.
pub fn document_page_store() -> MemPageStore {
    let schema = document_schema();
    let mut store = MemPageStore::new(2);
    for (path, triples) in document_triples() {
        let mut writer = ColumnChunkWriter::new(schema.column(&path).unwrap());
        for triple in triples {
            writer.write_triple(triple).unwrap();
        }
        store.add_chunk(writer.finish().unwrap());
    }
    store
}

/// A schema without groups or repeated fields.
pub fn flat_schema(all_required: bool) -> MessageType {
    let optional = if all_required {
        Repetition::Required
    } else {
        Repetition::Optional
    };
    MessageType::new(
        "Measurement",
        vec![
            Type::primitive(Repetition::Required, PhysicalType::Int64, "Id"),
            Type::primitive(optional, PhysicalType::String, "Station"),
            Type::primitive(optional, PhysicalType::Double, "Reading"),
        ],
    )
}

/// Three records of [`flat_schema`] with optional fields.
pub fn measurement_page_store() -> TriplePageStore {
    TriplePageStore::new(3)
        .with_column(
            &["Id"],
            vec![
                LevelTriple::value(0, 0, 1i64),
                LevelTriple::value(0, 0, 2i64),
                LevelTriple::value(0, 0, 3i64),
            ],
        )
        .with_column(
            &["Station"],
            vec![
                LevelTriple::value(0, 1, "north"),
                LevelTriple::null(0, 0),
                LevelTriple::value(0, 1, "south"),
            ],
        )
        .with_column(
            &["Reading"],
            vec![
                LevelTriple::null(0, 0),
                LevelTriple::value(0, 1, 2.5f64),
                LevelTriple::value(0, 1, -1.0f64),
            ],
        )
}
