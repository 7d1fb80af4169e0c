//! Level-driven record assembly for arbitrary nesting and repetition.

use std::sync::Arc;

use strata_common::{Result, error::Error, verify_data};
use strata_schema::ColumnDescriptor;

use crate::{
    converter::{GroupConverter, PrimitiveConverter},
    page::{LevelTriple, PageReader},
    read::{
        ColumnReader, ReaderKind,
        path_resolver::{AncestorGroup, ResolvedColumn},
    },
    writer_version::WriterVersion,
};

/// Assembles one leaf column's contribution to each record.
///
/// For every triple the reader closes the open ancestor groups whose current
/// element the triple does not continue, opens the ancestors the triple's
/// definition level reaches, and emits the value if the leaf itself is defined.
/// The open ancestors are kept on an explicit stack; the record root is not part
/// of it and is bracketed by the caller.
pub struct DremelColumnReader<'a> {
    column: ColumnDescriptor,
    /// Dotted column path, used in errors.
    path: String,
    page_reader: Box<dyn PageReader + 'a>,
    ancestors: Vec<AncestorGroup<'a>>,
    leaf: &'a dyn PrimitiveConverter,
    repeated_definition_levels: Vec<u32>,
    /// Converters of the currently open ancestors, `open[i]` belonging to
    /// `ancestors[i]`.
    open: Vec<&'a dyn GroupConverter>,
    /// Triple read past the end of the current record.
    lookahead: Option<LevelTriple>,
    /// Definition level of the previously assembled triple.
    last_definition_level: u32,
    /// Levels of the entries of the current (or last) record.
    record_levels: Vec<(u32, u32)>,
    writer_version: Option<Arc<WriterVersion>>,
    records_read: u64,
}

impl<'a> DremelColumnReader<'a> {
    pub fn new(
        column: ColumnDescriptor,
        resolved: ResolvedColumn<'a>,
        page_reader: Box<dyn PageReader + 'a>,
        writer_version: Option<Arc<WriterVersion>>,
    ) -> DremelColumnReader<'a> {
        let ResolvedColumn {
            ancestors,
            leaf,
            repeated_definition_levels,
        } = resolved;
        DremelColumnReader {
            path: column.path_string(),
            column,
            page_reader,
            open: Vec::with_capacity(ancestors.len()),
            ancestors,
            leaf,
            repeated_definition_levels,
            lookahead: None,
            last_definition_level: 0,
            record_levels: Vec::new(),
            writer_version,
            records_read: 0,
        }
    }

    /// Returns the next triple if it continues the current record.
    fn next_continuation(&mut self) -> Result<Option<LevelTriple>> {
        if self.lookahead.is_none() {
            self.lookahead = self.page_reader.read_triple()?;
        }
        Ok(self.lookahead.take_if(|triple| triple.repetition_level > 0))
    }

    fn validate(&self, triple: &LevelTriple) -> Result<()> {
        let r = triple.repetition_level;
        let d = triple.definition_level;
        let max_r = self.column.max_repetition_level();
        let max_d = self.column.max_definition_level();
        verify_data!(
            self.path,
            r <= max_r,
            "repetition level {r} exceeds {max_r}"
        );
        verify_data!(
            self.path,
            d <= max_d,
            "definition level {d} exceeds {max_d}"
        );
        verify_data!(
            self.path,
            triple.value.is_some() == (d == max_d),
            "value presence disagrees with definition level {d} (max {max_d})"
        );
        if r > 0 {
            let list_level = self.repeated_definition_levels[r as usize - 1];
            verify_data!(
                self.path,
                d >= list_level,
                "repetition level {r} continues a list that is not defined at definition level {d}"
            );
            verify_data!(
                self.path,
                self.last_definition_level >= list_level,
                "repetition level {r} continues an empty list"
            );
        }
        Ok(())
    }

    fn assemble(&mut self, triple: LevelTriple) -> Result<()> {
        self.validate(&triple)?;
        let r = triple.repetition_level;
        let d = triple.definition_level;

        // Open ancestors survive only while the triple repeats something below them.
        let keep = self
            .ancestors
            .iter()
            .take(self.open.len())
            .take_while(|ancestor| ancestor.repetition_level < r)
            .count();
        self.close_to(keep)?;

        while let Some(ancestor) = self.ancestors.get(self.open.len())
            && ancestor.definition_level <= d
        {
            ancestor.converter.start()?;
            self.open.push(ancestor.converter);
        }

        if let Some(value) = triple.value {
            self.leaf.add_value(value)?;
        }
        self.last_definition_level = d;
        self.record_levels.push((r, d));
        Ok(())
    }

    /// Ends open ancestors, deepest first, until `depth` remain.
    fn close_to(&mut self, depth: usize) -> Result<()> {
        while self.open.len() > depth {
            if let Some(converter) = self.open.pop() {
                converter.end()?;
            }
        }
        Ok(())
    }
}

impl ColumnReader for DremelColumnReader<'_> {
    fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    fn kind(&self) -> ReaderKind {
        ReaderKind::Generic
    }

    fn read_record(&mut self) -> Result<bool> {
        let first = match self.lookahead.take() {
            Some(triple) => Some(triple),
            None => self.page_reader.read_triple()?,
        };
        let Some(first) = first else {
            return Ok(false);
        };
        if first.repetition_level != 0 {
            return Err(Error::invalid_format(
                self.path.clone(),
                format!(
                    "record {} starts at repetition level {}",
                    self.records_read, first.repetition_level
                ),
            ));
        }
        self.record_levels.clear();
        self.assemble(first)?;
        while let Some(triple) = self.next_continuation()? {
            self.assemble(triple)?;
        }
        self.close_to(0)?;
        self.records_read += 1;
        Ok(true)
    }

    fn records_read(&self) -> u64 {
        self.records_read
    }

    fn remaining_values(&self) -> u64 {
        self.page_reader.remaining() + u64::from(self.lookahead.is_some())
    }

    fn record_levels(&self) -> &[(u32, u32)] {
        &self.record_levels
    }

    fn writer_version(&self) -> Option<&WriterVersion> {
        self.writer_version.as_deref()
    }
}
