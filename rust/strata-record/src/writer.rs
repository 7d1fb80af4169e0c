//! Record shredding: [`Group`] records into per-column level/value streams.

use std::ops::Range;

use log::trace;
use strata_column::mem::{MemColumnWriteStore, MemPageStore};
use strata_common::{Result, error::Error};
use strata_schema::{GroupType, MessageType, Repetition, Type, column::format_path};

use crate::group::{FieldValue, Group};

struct ShredNode {
    /// Dotted field path, used in errors.
    path: String,
    field_index: usize,
    repetition: Repetition,
    /// Repetition level of the second and later occurrences of this field.
    repetition_level: u32,
    /// Definition level of a present occurrence of this field.
    definition_level: u32,
    /// Columns of the leaves below (or at) this field, in schema column order.
    columns: Range<usize>,
    children: Vec<ShredNode>,
}

impl ShredNode {
    fn build(
        group: &GroupType,
        path: &mut Vec<String>,
        repetition_level: u32,
        definition_level: u32,
        next_column: &mut usize,
    ) -> Vec<ShredNode> {
        group
            .fields()
            .iter()
            .enumerate()
            .map(|(field_index, field)| {
                let repetition = field.repetition();
                let r = repetition_level + repetition.repetition_increment();
                let d = definition_level + repetition.definition_increment();
                path.push(field.name().to_string());
                let first_column = *next_column;
                let children = match field {
                    Type::Primitive(_) => {
                        *next_column += 1;
                        Vec::new()
                    }
                    Type::Group(child) => ShredNode::build(child, path, r, d, next_column),
                };
                let node = ShredNode {
                    path: format_path(path),
                    field_index,
                    repetition,
                    repetition_level: r,
                    definition_level: d,
                    columns: first_column..*next_column,
                    children,
                };
                path.pop();
                node
            })
            .collect()
    }
}

/// Shreds records of one schema into a [`MemColumnWriteStore`].
///
/// The first occurrence of a field inherits the repetition level of its parent;
/// later occurrences use the field's own level. An absent field writes a null
/// entry at the parent's levels into every column below it.
pub struct GroupWriter {
    schema: MessageType,
    fields: Vec<ShredNode>,
    column_count: usize,
}

impl GroupWriter {
    pub fn new(schema: &MessageType) -> GroupWriter {
        let mut column_count = 0;
        let fields = ShredNode::build(schema.root(), &mut Vec::new(), 0, 0, &mut column_count);
        GroupWriter {
            schema: schema.clone(),
            fields,
            column_count,
        }
    }

    pub fn schema(&self) -> &MessageType {
        &self.schema
    }

    /// Creates a write store for this writer's schema.
    pub fn new_store(&self) -> MemColumnWriteStore {
        MemColumnWriteStore::new(&self.schema)
    }

    /// Appends one record to `store`.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` if the record or the store belongs to a different schema.
    /// - `MissingRequiredField` if a required field has no value. The store is left
    ///   with a partially written record.
    pub fn write(&self, record: &Group, store: &mut MemColumnWriteStore) -> Result<()> {
        if record.schema().as_ref() != self.schema.root().as_ref() {
            return Err(Error::schema_mismatch(
                self.schema.name(),
                "record does not belong to the writer's schema",
            ));
        }
        if store.column_count() != self.column_count {
            return Err(Error::schema_mismatch(
                self.schema.name(),
                format!(
                    "store has {} columns, schema has {}",
                    store.column_count(),
                    self.column_count
                ),
            ));
        }
        write_fields(&self.fields, record, 0, 0, store)?;
        store.end_record();
        Ok(())
    }

    /// Shreds `records` into a new page store.
    pub fn write_all<'r>(
        &self,
        records: impl IntoIterator<Item = &'r Group>,
    ) -> Result<MemPageStore> {
        let mut store = self.new_store();
        for record in records {
            self.write(record, &mut store)?;
        }
        trace!(
            "shredded {} records of '{}'",
            store.record_count(),
            self.schema.name()
        );
        store.finish()
    }
}

fn write_fields(
    fields: &[ShredNode],
    group: &Group,
    repetition_level: u32,
    definition_level: u32,
    store: &mut MemColumnWriteStore,
) -> Result<()> {
    for node in fields {
        let values = group.field_values(node.field_index);
        if values.is_empty() {
            if node.repetition == Repetition::Required {
                return Err(Error::missing_required_field(node.path.as_str()));
            }
            for column in node.columns.clone() {
                store
                    .column_writer(column)?
                    .write_null(repetition_level, definition_level)?;
            }
            continue;
        }
        for (i, value) in values.iter().enumerate() {
            let r = if i == 0 {
                repetition_level
            } else {
                node.repetition_level
            };
            match value {
                FieldValue::Primitive(value) => {
                    store
                        .column_writer(node.columns.start)?
                        .write_value(value.clone(), r)?;
                }
                FieldValue::Group(child) => {
                    write_fields(&node.children, child, r, node.definition_level, store)?;
                }
            }
        }
    }
    Ok(())
}
