use strata_common::{Result, error::Error, try_or_ret_some_err};
use strata_schema::{ColumnDescriptor, MessageType, column::format_path};

use crate::{
    converter::RecordMaterializer,
    page::PageReadStore,
    read::{ColumnReadOptions, ColumnReadStore, ColumnReader},
};

/// Reads whole records by driving every column of a schema through one record
/// at a time.
///
/// For each record, every column reader contributes its part between a
/// `start()`/`end()` pair on the materializer's root converter, in schema column
/// order; the record is then taken from the materializer.
///
/// Adjacent columns that share a group must agree on that group's elements in
/// every record; a disagreement is an `InvalidFormat` error.
pub struct RecordReader<'a, M: RecordMaterializer> {
    materializer: &'a M,
    readers: Vec<Box<dyn ColumnReader + 'a>>,
    shared_groups: Vec<SharedGroup>,
    row_count: u64,
    records_read: u64,
}

/// The deepest group shared by column `column` and the column before it.
struct SharedGroup {
    column: usize,
    /// Dotted path of the group, used in errors.
    path: String,
    repetition_level: u32,
    definition_level: u32,
}

impl SharedGroup {
    fn collect(schema: &MessageType, columns: &[ColumnDescriptor]) -> Result<Vec<SharedGroup>> {
        let mut shared = Vec::new();
        for (column, pair) in columns.windows(2).enumerate() {
            let common = pair[0]
                .path()
                .iter()
                .zip(pair[1].path())
                .take_while(|(a, b)| a == b)
                .count();
            if common == 0 {
                continue;
            }
            let path = &pair[1].path()[..common];
            let mut repetition_level = 0;
            let mut definition_level = 0;
            for depth in 1..=common {
                let repetition = schema.type_at_path(&path[..depth])?.repetition();
                repetition_level += repetition.repetition_increment();
                definition_level += repetition.definition_increment();
            }
            shared.push(SharedGroup {
                column: column + 1,
                path: format_path(path),
                repetition_level,
                definition_level,
            });
        }
        Ok(shared)
    }

    /// The entries of a record that start an element of this group or of one of
    /// its ancestors, with definition levels cut at the group.
    fn structure(&self, levels: &[(u32, u32)]) -> impl Iterator<Item = (u32, u32)> {
        let (max_r, max_d) = (self.repetition_level, self.definition_level);
        levels
            .iter()
            .filter(move |&&(r, _)| r <= max_r)
            .map(move |&(r, d)| (r, d.min(max_d)))
    }
}

impl<'a, M: RecordMaterializer> RecordReader<'a, M> {
    pub fn new(
        page_store: &'a dyn PageReadStore,
        materializer: &'a M,
        requested_schema: &'a MessageType,
        created_by: &str,
    ) -> Result<RecordReader<'a, M>> {
        Self::with_options(
            page_store,
            materializer,
            requested_schema,
            created_by,
            ColumnReadOptions::default(),
        )
    }

    /// # Errors
    ///
    /// Fails if a column of `requested_schema` cannot be resolved against the
    /// materializer's converter tree or is missing from the page store.
    pub fn with_options(
        page_store: &'a dyn PageReadStore,
        materializer: &'a M,
        requested_schema: &'a MessageType,
        created_by: &str,
        options: ColumnReadOptions,
    ) -> Result<RecordReader<'a, M>> {
        let store = ColumnReadStore::with_options(
            page_store,
            materializer.root_converter(),
            requested_schema,
            created_by,
            options,
        );
        let columns = requested_schema.columns();
        let readers = columns
            .iter()
            .map(|column| store.column_reader(column))
            .collect::<Result<Vec<_>>>()?;
        let shared_groups = SharedGroup::collect(requested_schema, &columns)?;
        Ok(RecordReader {
            materializer,
            readers,
            shared_groups,
            row_count: page_store.row_count(),
            records_read: 0,
        })
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn column_readers(&self) -> &[Box<dyn ColumnReader + 'a>] {
        &self.readers
    }

    /// Assembles the next record, or returns `None` once `row_count` records have
    /// been read.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if a column ends before `row_count` records or still holds
    /// data after them; converter and page source errors are passed through.
    pub fn read(&mut self) -> Result<Option<M::Record>> {
        if self.records_read >= self.row_count {
            if let Some(reader) = self.readers.iter().find(|r| r.remaining_values() > 0) {
                return Err(Error::invalid_format(
                    reader.column().path_string(),
                    format!(
                        "{} entries left after {} records",
                        reader.remaining_values(),
                        self.row_count
                    ),
                ));
            }
            return Ok(None);
        }

        let materializer = self.materializer;
        let root = materializer.root_converter();
        for reader in &mut self.readers {
            root.start()?;
            if !reader.read_record()? {
                return Err(Error::invalid_format(
                    reader.column().path_string(),
                    format!(
                        "column ended after {} of {} records",
                        reader.records_read(),
                        self.row_count
                    ),
                ));
            }
            root.end()?;
        }
        self.check_shared_groups()?;
        self.records_read += 1;
        materializer.take_record().map(Some)
    }
}

impl<M: RecordMaterializer> RecordReader<'_, M> {
    fn check_shared_groups(&self) -> Result<()> {
        for group in &self.shared_groups {
            let previous = &self.readers[group.column - 1];
            let current = &self.readers[group.column];
            if !group
                .structure(previous.record_levels())
                .eq(group.structure(current.record_levels()))
            {
                return Err(Error::invalid_format(
                    current.column().path_string(),
                    format!(
                        "disagrees with '{}' on the elements of '{}' in record {}",
                        previous.column().path_string(),
                        group.path,
                        self.records_read
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<M: RecordMaterializer> Iterator for RecordReader<'_, M> {
    type Item = Result<M::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = try_or_ret_some_err!(self.read());
        record.map(Ok)
    }
}
