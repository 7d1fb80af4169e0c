use ahash::AHashMap;
use strata_common::{Result, error::Error};
use strata_schema::ColumnDescriptor;

use crate::{
    mem::chunk::ColumnChunk,
    page::{LevelTriple, PageReadStore, PageReader},
    value::Value,
};

/// In-memory page source: one decoded [`ColumnChunk`] per column path.
#[derive(Debug, Clone, Default)]
pub struct MemPageStore {
    row_count: u64,
    chunks: AHashMap<Vec<String>, ColumnChunk>,
}

impl MemPageStore {
    pub fn new(row_count: u64) -> MemPageStore {
        MemPageStore {
            row_count,
            chunks: AHashMap::new(),
        }
    }

    /// Adds (or replaces) the chunk of the column named by the chunk's descriptor.
    pub fn add_chunk(&mut self, chunk: ColumnChunk) {
        self.chunks.insert(chunk.descriptor().path().to_vec(), chunk);
    }

    pub fn with_chunk(mut self, chunk: ColumnChunk) -> MemPageStore {
        self.add_chunk(chunk);
        self
    }

    pub fn chunk(&self, path: &[String]) -> Option<&ColumnChunk> {
        self.chunks.get(path)
    }

    pub fn column_count(&self) -> usize {
        self.chunks.len()
    }
}

impl PageReadStore for MemPageStore {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn page_reader(&self, column: &ColumnDescriptor) -> Result<Box<dyn PageReader + '_>> {
        let chunk = self.chunks.get(column.path()).ok_or_else(|| {
            Error::schema_mismatch(column.path_string(), "no column chunk for this path")
        })?;
        let stored = chunk.descriptor();
        if stored != column {
            return Err(Error::schema_mismatch(
                column.path_string(),
                format!("stored column is '{stored}', requested '{column}'"),
            ));
        }
        Ok(Box::new(MemPageReader::new(chunk)))
    }
}

/// Sequential reader over a [`ColumnChunk`].
pub struct MemPageReader<'a> {
    chunk: &'a ColumnChunk,
    /// Next triple.
    pos: usize,
    /// Next value in the dense value list.
    value_pos: usize,
}

impl<'a> MemPageReader<'a> {
    pub fn new(chunk: &'a ColumnChunk) -> MemPageReader<'a> {
        MemPageReader {
            chunk,
            pos: 0,
            value_pos: 0,
        }
    }

    fn next_value(&mut self) -> Result<Value> {
        let value = self.chunk.values().get(self.value_pos).ok_or_else(|| {
            Error::invalid_format(
                self.chunk.descriptor().path_string(),
                format!("value stream exhausted at entry {}", self.pos),
            )
        })?;
        self.value_pos += 1;
        Ok(value.clone())
    }
}

impl PageReader for MemPageReader<'_> {
    fn total_value_count(&self) -> u64 {
        self.chunk.value_count() as u64
    }

    fn remaining(&self) -> u64 {
        (self.chunk.value_count() - self.pos) as u64
    }

    fn read_triple(&mut self) -> Result<Option<LevelTriple>> {
        if self.pos >= self.chunk.value_count() {
            return Ok(None);
        }
        let max_d = self.chunk.descriptor().max_definition_level();
        let r = self
            .chunk
            .repetition_levels()
            .map_or(0, |levels| levels[self.pos]);
        let d = self
            .chunk
            .definition_levels()
            .map_or(max_d, |levels| levels[self.pos]);
        let value = if d == max_d {
            Some(self.next_value()?)
        } else {
            None
        };
        self.pos += 1;
        Ok(Some(LevelTriple::new(r, d, value)))
    }

    fn read_value(&mut self) -> Result<Option<Value>> {
        if self.chunk.definition_levels().is_some() {
            return match self.read_triple()? {
                None => Ok(None),
                Some(LevelTriple {
                    value: Some(value), ..
                }) => Ok(Some(value)),
                Some(triple) => Err(Error::invalid_format(
                    self.chunk.descriptor().path_string(),
                    format!(
                        "entry at definition level {} has no value",
                        triple.definition_level
                    ),
                )),
            };
        }
        if self.pos >= self.chunk.value_count() {
            return Ok(None);
        }
        let value = self.next_value()?;
        self.pos += 1;
        Ok(Some(value))
    }
}
