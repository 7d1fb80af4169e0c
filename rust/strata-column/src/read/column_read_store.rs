use std::sync::Arc;

use log::{debug, trace};
use strata_common::Result;
use strata_schema::{ColumnDescriptor, MessageType, Repetition, Type};

use crate::{
    converter::GroupConverter,
    page::PageReadStore,
    read::{
        ColumnReadOptions, ColumnReader, dremel_reader::DremelColumnReader,
        flat_reader::FlatColumnReader, path_resolver,
    },
    writer_version::WriterVersion,
};

/// Factory of column readers for one batch of column chunks.
///
/// The schema is classified once at construction; the writer version string is
/// parsed once, and an unparsable string only means "unknown writer".
pub struct ColumnReadStore<'a> {
    page_store: &'a dyn PageReadStore,
    root: &'a dyn GroupConverter,
    schema: &'a MessageType,
    writer_version: Option<Arc<WriterVersion>>,
    /// No groups and no repeated fields.
    flat_schema: bool,
    /// Every field is required.
    all_required: bool,
    options: ColumnReadOptions,
}

impl<'a> ColumnReadStore<'a> {
    pub fn new(
        page_store: &'a dyn PageReadStore,
        root: &'a dyn GroupConverter,
        schema: &'a MessageType,
        created_by: &str,
    ) -> ColumnReadStore<'a> {
        Self::with_options(
            page_store,
            root,
            schema,
            created_by,
            ColumnReadOptions::default(),
        )
    }

    pub fn with_options(
        page_store: &'a dyn PageReadStore,
        root: &'a dyn GroupConverter,
        schema: &'a MessageType,
        created_by: &str,
        options: ColumnReadOptions,
    ) -> ColumnReadStore<'a> {
        let mut flat_schema = true;
        let mut all_required = true;
        for field in schema.iter_types() {
            if matches!(field, Type::Group(_)) || field.is_repetition(Repetition::Repeated) {
                flat_schema = false;
            }
            if !field.is_repetition(Repetition::Required) {
                all_required = false;
            }
        }

        let writer_version = match WriterVersion::parse(created_by) {
            Ok(version) => {
                if version.requires_sequential_page_reads() {
                    debug!("'{version}' requires sequential page reads");
                }
                Some(Arc::new(version))
            }
            Err(e) => {
                debug!("unknown writer version: {e}");
                None
            }
        };

        debug!(
            "column read store for '{}': flat_schema={flat_schema} all_required={all_required} {options:?}",
            schema.name()
        );

        ColumnReadStore {
            page_store,
            root,
            schema,
            writer_version,
            flat_schema,
            all_required,
            options,
        }
    }

    pub fn schema(&self) -> &'a MessageType {
        self.schema
    }

    pub fn row_count(&self) -> u64 {
        self.page_store.row_count()
    }

    pub fn is_flat_schema(&self) -> bool {
        self.flat_schema
    }

    pub fn is_all_required(&self) -> bool {
        self.all_required
    }

    pub fn writer_version(&self) -> Option<&WriterVersion> {
        self.writer_version.as_deref()
    }

    pub fn options(&self) -> &ColumnReadOptions {
        &self.options
    }

    /// Creates the reader for `column`, wired to its leaf converter and to the
    /// column's page reader.
    ///
    /// # Errors
    ///
    /// Path resolution errors (`SchemaMismatch`, `CapabilityMismatch`) and page
    /// source errors, unchanged.
    pub fn column_reader(&self, column: &ColumnDescriptor) -> Result<Box<dyn ColumnReader + 'a>> {
        let resolved = path_resolver::resolve_column(self.schema.root(), self.root, column)?;
        let page_reader = self.page_store.page_reader(column)?;
        let writer_version = self.writer_version.clone();
        if self.flat_schema && self.options.flat_fast_path {
            trace!(
                "flat reader for '{column}' (all_required={})",
                self.all_required
            );
            Ok(Box::new(FlatColumnReader::new(
                column.clone(),
                resolved.leaf,
                page_reader,
                self.all_required,
                writer_version,
            )))
        } else {
            trace!("generic reader for '{column}'");
            Ok(Box::new(DremelColumnReader::new(
                column.clone(),
                resolved,
                page_reader,
                writer_version,
            )))
        }
    }
}
