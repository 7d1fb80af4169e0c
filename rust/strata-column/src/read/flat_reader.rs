use std::sync::Arc;

use strata_common::{Result, error::Error, verify_data};
use strata_schema::ColumnDescriptor;

use crate::{
    converter::PrimitiveConverter,
    page::PageReader,
    read::{ColumnReader, ReaderKind},
    writer_version::WriterVersion,
};

/// Column reader for schemas without groups or repeated fields.
///
/// Every leaf sits directly under the record root and contributes at most one
/// value per record, so no group events are emitted. When every field is required
/// the level streams are not consulted at all.
pub struct FlatColumnReader<'a> {
    column: ColumnDescriptor,
    path: String,
    page_reader: Box<dyn PageReader + 'a>,
    leaf: &'a dyn PrimitiveConverter,
    all_required: bool,
    writer_version: Option<Arc<WriterVersion>>,
    records_read: u64,
}

impl<'a> FlatColumnReader<'a> {
    pub fn new(
        column: ColumnDescriptor,
        leaf: &'a dyn PrimitiveConverter,
        page_reader: Box<dyn PageReader + 'a>,
        all_required: bool,
        writer_version: Option<Arc<WriterVersion>>,
    ) -> FlatColumnReader<'a> {
        FlatColumnReader {
            path: column.path_string(),
            column,
            page_reader,
            leaf,
            all_required,
            writer_version,
            records_read: 0,
        }
    }

    pub fn is_all_required(&self) -> bool {
        self.all_required
    }

    fn read_required(&mut self) -> Result<bool> {
        match self.page_reader.read_value()? {
            Some(value) => {
                self.leaf.add_value(value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_optional(&mut self) -> Result<bool> {
        let Some(triple) = self.page_reader.read_triple()? else {
            return Ok(false);
        };
        let max_d = self.column.max_definition_level();
        let d = triple.definition_level;
        if triple.repetition_level != 0 {
            return Err(Error::invalid_format(
                self.path.clone(),
                format!(
                    "repetition level {} in a column without repeated fields",
                    triple.repetition_level
                ),
            ));
        }
        verify_data!(
            self.path,
            d <= max_d,
            "definition level {d} exceeds {max_d}"
        );
        match triple.value {
            Some(value) if d == max_d => self.leaf.add_value(value)?,
            None if d < max_d => (),
            _ => {
                return Err(Error::invalid_format(
                    self.path.clone(),
                    format!("value presence disagrees with definition level {d} (max {max_d})"),
                ));
            }
        }
        Ok(true)
    }
}

impl ColumnReader for FlatColumnReader<'_> {
    fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    fn kind(&self) -> ReaderKind {
        ReaderKind::Flat
    }

    fn read_record(&mut self) -> Result<bool> {
        let read = if self.all_required {
            self.read_required()?
        } else {
            self.read_optional()?
        };
        if read {
            self.records_read += 1;
        }
        Ok(read)
    }

    fn records_read(&self) -> u64 {
        self.records_read
    }

    fn remaining_values(&self) -> u64 {
        self.page_reader.remaining()
    }

    fn record_levels(&self) -> &[(u32, u32)] {
        &[]
    }

    fn writer_version(&self) -> Option<&WriterVersion> {
        self.writer_version.as_deref()
    }
}
