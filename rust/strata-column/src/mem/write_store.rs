use strata_common::{Result, error::Error};
use strata_schema::{ColumnDescriptor, MessageType};

use crate::mem::{
    chunk::{ColumnChunk, ColumnChunkWriter},
    page_store::MemPageStore,
};

/// Column chunk writers for every leaf of a schema, producing a [`MemPageStore`].
///
/// Writers are addressed by their position in [`MessageType::columns`] order.
#[derive(Debug)]
pub struct MemColumnWriteStore {
    writers: Vec<ColumnChunkWriter>,
    record_count: u64,
}

impl MemColumnWriteStore {
    pub fn new(schema: &MessageType) -> MemColumnWriteStore {
        MemColumnWriteStore {
            writers: schema
                .columns()
                .into_iter()
                .map(ColumnChunkWriter::new)
                .collect(),
            record_count: 0,
        }
    }

    pub fn column_count(&self) -> usize {
        self.writers.len()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.writers.iter().map(ColumnChunkWriter::descriptor)
    }

    /// # Errors
    ///
    /// `InvalidArgument` if there is no column at `index`.
    pub fn column_writer(&mut self, index: usize) -> Result<&mut ColumnChunkWriter> {
        let count = self.writers.len();
        self.writers
            .get_mut(index)
            .ok_or_else(|| Error::invalid_arg("index", format!("{index} >= {count}")))
    }

    /// Marks the end of a record. Every column must have received at least one
    /// entry per record.
    pub fn end_record(&mut self) {
        self.record_count += 1;
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Seals all columns.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if a column does not describe exactly `record_count`
    /// records.
    pub fn finish(self) -> Result<MemPageStore> {
        let mut store = MemPageStore::new(self.record_count);
        for writer in self.writers {
            let chunk: ColumnChunk = writer.finish()?;
            if chunk.record_count() as u64 != self.record_count {
                return Err(Error::invalid_format(
                    chunk.descriptor().path_string(),
                    format!(
                        "column holds {} records, expected {}",
                        chunk.record_count(),
                        self.record_count
                    ),
                ));
            }
            store.add_chunk(chunk);
        }
        Ok(store)
    }
}
