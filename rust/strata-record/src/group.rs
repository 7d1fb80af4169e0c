//! In-memory nested records.

use std::{fmt, sync::Arc};

use strata_column::Value;
use strata_common::{Result, error::Error};
use strata_schema::{GroupType, Repetition, Type};

/// One occurrence of a field: a leaf value or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Primitive(Value),
    Group(Group),
}

impl FieldValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Primitive(value) => Some(value),
            FieldValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            FieldValue::Group(group) => Some(group),
            FieldValue::Primitive(_) => None,
        }
    }
}

/// A record (or nested group) instance of a [`GroupType`].
///
/// Holds, for every field of the group type in schema order, the list of its
/// occurrences: empty for an absent field, one entry for a present non-repeated
/// field, any number for a repeated one.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    schema: Arc<GroupType>,
    fields: Vec<Vec<FieldValue>>,
}

impl Group {
    pub fn new(schema: Arc<GroupType>) -> Group {
        let fields = vec![Vec::new(); schema.field_count()];
        Group { schema, fields }
    }

    pub fn schema(&self) -> &Arc<GroupType> {
        &self.schema
    }

    /// Occurrences of the field at `index`.
    pub fn field_values(&self, index: usize) -> &[FieldValue] {
        self.fields
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn field_values_mut(&mut self, index: usize) -> Option<&mut Vec<FieldValue>> {
        self.fields.get_mut(index)
    }

    /// Occurrences of the field named `name`.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if the group type has no such field.
    pub fn values(&self, name: &str) -> Result<&[FieldValue]> {
        let (index, _) = self.field(name)?;
        Ok(&self.fields[index])
    }

    pub fn value_count(&self, name: &str) -> Result<usize> {
        self.values(name).map(<[FieldValue]>::len)
    }

    /// The `i`-th value of a primitive field.
    pub fn value(&self, name: &str, i: usize) -> Result<&Value> {
        self.values(name)?
            .get(i)
            .and_then(FieldValue::as_value)
            .ok_or_else(|| Error::invalid_arg("i", format!("no value {i} in field '{name}'")))
    }

    /// The `i`-th element of a group field.
    pub fn group(&self, name: &str, i: usize) -> Result<&Group> {
        self.values(name)?
            .get(i)
            .and_then(FieldValue::as_group)
            .ok_or_else(|| Error::invalid_arg("i", format!("no group {i} in field '{name}'")))
    }

    /// Adds a value to the primitive field `name`.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` if there is no such field or it is a group.
    /// - `CapabilityMismatch` if the value does not match the field's physical type.
    /// - `InvalidOperation` if a non-repeated field already has a value.
    pub fn add(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (index, _) = self.field(name)?;
        self.add_value_at(index, value.into())
    }

    /// Same as [`Group::add`], returning `self` for chaining.
    pub fn append(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Group> {
        self.add(name, value)?;
        Ok(self)
    }

    /// Adds an empty element to the group field `name` and returns it.
    pub fn add_group(&mut self, name: &str) -> Result<&mut Group> {
        let (index, _) = self.field(name)?;
        self.add_group_at(index)
    }

    pub(crate) fn add_value_at(&mut self, index: usize, value: Value) -> Result<()> {
        let leaf = self.schema.field_at(index)?.as_primitive()?;
        if leaf.physical_type() != value.physical_type() {
            return Err(Error::capability_mismatch(
                format!("{} values", value.physical_type()),
                leaf.name(),
            ));
        }
        self.check_occurrence(index)?;
        self.fields[index].push(FieldValue::Primitive(value));
        Ok(())
    }

    pub(crate) fn add_group_at(&mut self, index: usize) -> Result<&mut Group> {
        let child = self.schema.field_at(index)?.as_group()?.clone();
        self.check_occurrence(index)?;
        let values = &mut self.fields[index];
        values.push(FieldValue::Group(Group::new(child)));
        match values.last_mut() {
            Some(FieldValue::Group(group)) => Ok(group),
            _ => Err(Error::invalid_operation("add_group")),
        }
    }

    fn field(&self, name: &str) -> Result<(usize, &Type)> {
        self.schema.find_field(name).ok_or_else(|| {
            Error::schema_mismatch(
                name,
                format!("field not found in '{}'", self.schema.name()),
            )
        })
    }

    fn check_occurrence(&self, index: usize) -> Result<()> {
        let field = self.schema.field_at(index)?;
        if !field.is_repetition(Repetition::Repeated) && !self.fields[index].is_empty() {
            return Err(Error::invalid_operation(format!(
                "second value for non-repeated field '{}'",
                field.name()
            )));
        }
        Ok(())
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for (field, values) in self.schema.fields().iter().zip(&self.fields) {
            for value in values {
                write!(f, "{:indent$}", "", indent = indent * 2)?;
                match value {
                    FieldValue::Primitive(value) => writeln!(f, "{}: {value}", field.name())?,
                    FieldValue::Group(group) => {
                        writeln!(f, "{}", field.name())?;
                        group.write_indented(f, indent + 1)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
