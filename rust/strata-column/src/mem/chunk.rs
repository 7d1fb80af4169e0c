use strata_common::{Result, error::Error, verify_arg, verify_data};
use strata_schema::ColumnDescriptor;

use crate::{page::LevelTriple, value::Value};

/// Decoded content of one column chunk: level streams plus densely stored values.
///
/// A level stream is omitted when its column's maximum level is zero, or when the
/// stream is trivial (all 0 for repetition, all max for definition).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    descriptor: ColumnDescriptor,
    repetition_levels: Option<Vec<u32>>,
    definition_levels: Option<Vec<u32>>,
    /// Values of the defined entries only.
    values: Vec<Value>,
}

impl ColumnChunk {
    /// Assembles a chunk from its streams, checking that they agree with each other
    /// and with the descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if stream lengths disagree, a level is out of range, or a
    /// value does not match the column's physical type.
    pub fn try_new(
        descriptor: ColumnDescriptor,
        repetition_levels: Option<Vec<u32>>,
        definition_levels: Option<Vec<u32>>,
        values: Vec<Value>,
    ) -> Result<ColumnChunk> {
        let path = descriptor.path_string();
        let max_r = descriptor.max_repetition_level();
        let max_d = descriptor.max_definition_level();

        let value_count = repetition_levels
            .as_ref()
            .or(definition_levels.as_ref())
            .map_or(values.len(), Vec::len);
        if let Some(levels) = &repetition_levels {
            verify_data!(
                path,
                levels.len() == value_count,
                "{} repetition levels for {value_count} entries",
                levels.len()
            );
            if let Some(&r) = levels.iter().find(|&&r| r > max_r) {
                return Err(Error::invalid_format(
                    path,
                    format!("repetition level {r} exceeds {max_r}"),
                ));
            }
            verify_data!(
                path,
                levels.first().is_none_or(|&r| r == 0),
                "first entry does not start a record"
            );
        }
        let defined = match &definition_levels {
            Some(levels) => {
                verify_data!(
                    path,
                    levels.len() == value_count,
                    "{} definition levels for {value_count} entries",
                    levels.len()
                );
                if let Some(&d) = levels.iter().find(|&&d| d > max_d) {
                    return Err(Error::invalid_format(
                        path,
                        format!("definition level {d} exceeds {max_d}"),
                    ));
                }
                levels.iter().filter(|&&d| d == max_d).count()
            }
            None => value_count,
        };
        verify_data!(
            path,
            values.len() == defined,
            "{} values for {defined} defined entries",
            values.len()
        );
        if let Some(value) = values
            .iter()
            .find(|v| v.physical_type() != descriptor.physical_type())
        {
            return Err(Error::invalid_format(
                path,
                format!(
                    "{} value {value} in a {} column",
                    value.physical_type(),
                    descriptor.physical_type()
                ),
            ));
        }

        Ok(ColumnChunk {
            descriptor,
            repetition_levels,
            definition_levels,
            values,
        })
    }

    /// A chunk of a column whose entries are all defined and start a new record,
    /// e.g. a required top-level field.
    pub fn from_values(descriptor: ColumnDescriptor, values: Vec<Value>) -> Result<ColumnChunk> {
        ColumnChunk::try_new(descriptor, None, None, values)
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    pub fn repetition_levels(&self) -> Option<&[u32]> {
        self.repetition_levels.as_deref()
    }

    pub fn definition_levels(&self) -> Option<&[u32]> {
        self.definition_levels.as_deref()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of triples, defined or not.
    pub fn value_count(&self) -> usize {
        self.repetition_levels
            .as_ref()
            .or(self.definition_levels.as_ref())
            .map_or(self.values.len(), Vec::len)
    }

    /// Number of records described by this chunk (entries at repetition level 0).
    pub fn record_count(&self) -> usize {
        match &self.repetition_levels {
            Some(levels) => levels.iter().filter(|&&r| r == 0).count(),
            None => self.value_count(),
        }
    }
}

/// Accumulates the triples of one column into a [`ColumnChunk`].
#[derive(Debug)]
pub struct ColumnChunkWriter {
    descriptor: ColumnDescriptor,
    repetition_levels: Vec<u32>,
    definition_levels: Vec<u32>,
    values: Vec<Value>,
}

impl ColumnChunkWriter {
    pub fn new(descriptor: ColumnDescriptor) -> ColumnChunkWriter {
        ColumnChunkWriter {
            descriptor,
            repetition_levels: Vec::new(),
            definition_levels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Number of triples written so far.
    pub fn value_count(&self) -> usize {
        self.repetition_levels.len()
    }

    /// Appends a defined entry. Its definition level is the column's maximum.
    pub fn write_value(&mut self, value: Value, repetition_level: u32) -> Result<()> {
        verify_arg!(
            value,
            value.physical_type() == self.descriptor.physical_type()
        );
        let d = self.descriptor.max_definition_level();
        self.push_levels(repetition_level, d)?;
        self.values.push(value);
        Ok(())
    }

    /// Appends an undefined entry: the leaf or one of its ancestors is absent.
    pub fn write_null(&mut self, repetition_level: u32, definition_level: u32) -> Result<()> {
        verify_arg!(
            definition_level,
            definition_level < self.descriptor.max_definition_level()
        );
        self.push_levels(repetition_level, definition_level)
    }

    /// Appends a triple as read from a page reader.
    pub fn write_triple(&mut self, triple: LevelTriple) -> Result<()> {
        match triple.value {
            Some(value) => {
                verify_arg!(
                    triple,
                    triple.definition_level == self.descriptor.max_definition_level()
                );
                self.write_value(value, triple.repetition_level)
            }
            None => self.write_null(triple.repetition_level, triple.definition_level),
        }
    }

    fn push_levels(&mut self, repetition_level: u32, definition_level: u32) -> Result<()> {
        verify_arg!(
            repetition_level,
            repetition_level <= self.descriptor.max_repetition_level()
        );
        verify_arg!(
            repetition_level,
            repetition_level == 0 || !self.repetition_levels.is_empty()
        );
        self.repetition_levels.push(repetition_level);
        self.definition_levels.push(definition_level);
        Ok(())
    }

    /// Seals the chunk. Level streams of columns whose maximum level is zero are
    /// dropped.
    pub fn finish(self) -> Result<ColumnChunk> {
        let repetition_levels =
            (self.descriptor.max_repetition_level() > 0).then_some(self.repetition_levels);
        let definition_levels =
            (self.descriptor.max_definition_level() > 0).then_some(self.definition_levels);
        ColumnChunk::try_new(
            self.descriptor,
            repetition_levels,
            definition_levels,
            self.values,
        )
    }
}
