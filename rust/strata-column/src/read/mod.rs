//! Column readers and the factory that selects them.

pub mod column_read_store;
pub mod dremel_reader;
pub mod flat_reader;
pub mod path_resolver;
pub mod record_reader;

use strata_common::Result;
use strata_schema::ColumnDescriptor;

use crate::writer_version::WriterVersion;

pub use column_read_store::ColumnReadStore;
pub use dremel_reader::DremelColumnReader;
pub use flat_reader::FlatColumnReader;
pub use record_reader::RecordReader;

/// Tuning knobs of a [`ColumnReadStore`].
#[derive(Debug, Clone)]
pub struct ColumnReadOptions {
    /// Use [`FlatColumnReader`] for schemas without groups or repeated fields.
    /// When disabled, every column is read by the generic assembler.
    pub flat_fast_path: bool,
}

impl Default for ColumnReadOptions {
    fn default() -> Self {
        ColumnReadOptions {
            flat_fast_path: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    /// [`DremelColumnReader`]
    Generic,
    /// [`FlatColumnReader`]
    Flat,
}

/// Materializes one leaf column's part of each record into the converter tree.
pub trait ColumnReader {
    fn column(&self) -> &ColumnDescriptor;

    fn kind(&self) -> ReaderKind;

    /// Emits the converter events of the next record's entries for this column.
    /// Returns `false` at the end of the column chunk.
    ///
    /// The record root itself is started and ended by the caller.
    fn read_record(&mut self) -> Result<bool>;

    /// Number of records read so far.
    fn records_read(&self) -> u64;

    /// Number of triples not yet assembled.
    fn remaining_values(&self) -> u64;

    /// `(repetition level, definition level)` of every entry of the record most
    /// recently read. Readers that never open groups may return an empty slice.
    fn record_levels(&self) -> &[(u32, u32)];

    /// The parsed writer version of the data, if it could be parsed.
    fn writer_version(&self) -> Option<&WriterVersion>;
}
