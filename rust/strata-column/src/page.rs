//! Page source contract: per-column streams of level triples.
//!
//! Physical page layout, level encodings and compression live behind these traits.
//! A [`PageReadStore`] hands out one [`PageReader`] per leaf column of a column
//! chunk batch; each reader yields that column's triples in storage order.

use strata_common::{Result, error::Error};
use strata_schema::ColumnDescriptor;

use crate::value::Value;

/// One logical entry of a column stream.
///
/// `value` is present iff `definition_level` equals the column's maximum
/// definition level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTriple {
    pub repetition_level: u32,
    pub definition_level: u32,
    pub value: Option<Value>,
}

impl LevelTriple {
    pub fn new(repetition_level: u32, definition_level: u32, value: Option<Value>) -> LevelTriple {
        LevelTriple {
            repetition_level,
            definition_level,
            value,
        }
    }

    /// A defined entry.
    pub fn value(
        repetition_level: u32,
        definition_level: u32,
        value: impl Into<Value>,
    ) -> LevelTriple {
        LevelTriple::new(repetition_level, definition_level, Some(value.into()))
    }

    /// An entry that stops short of the leaf: the leaf (or one of its ancestors)
    /// is absent or empty at this position.
    pub fn null(repetition_level: u32, definition_level: u32) -> LevelTriple {
        LevelTriple::new(repetition_level, definition_level, None)
    }
}

/// Sequential reader over the triples of one column chunk.
///
/// Reads may block on I/O or decompression. Errors are returned to the column
/// readers unchanged.
pub trait PageReader {
    /// Total number of triples in the column chunk.
    fn total_value_count(&self) -> u64;

    /// Number of triples not yet read.
    fn remaining(&self) -> u64;

    /// Reads the next triple, or `None` at the end of the column chunk.
    fn read_triple(&mut self) -> Result<Option<LevelTriple>>;

    /// Reads the value of the next entry without consulting its levels.
    ///
    /// Only meaningful for columns where every entry is defined, i.e. required
    /// top-level fields. The default implementation reads a full triple and fails
    /// if it carries no value.
    fn read_value(&mut self) -> Result<Option<Value>> {
        match self.read_triple()? {
            None => Ok(None),
            Some(LevelTriple {
                value: Some(value), ..
            }) => Ok(Some(value)),
            Some(triple) => Err(Error::invalid_format(
                "column chunk",
                format!(
                    "entry at definition level {} has no value",
                    triple.definition_level
                ),
            )),
        }
    }
}

/// Source of page readers for a batch of column chunks that together describe
/// `row_count` records.
pub trait PageReadStore {
    /// Number of top-level records in this batch.
    fn row_count(&self) -> u64;

    /// Returns the reader for the given column.
    ///
    /// # Errors
    ///
    /// Implementation specific; errors propagate unchanged through the column
    /// readers.
    fn page_reader(&self, column: &ColumnDescriptor) -> Result<Box<dyn PageReader + '_>>;
}
