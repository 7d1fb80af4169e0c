//! Immutable schema trees: a root `MessageType` with ordered fields, each either a
//! `PrimitiveType` leaf or a `GroupType` with its own ordered children.

use std::{borrow::Borrow, fmt, hash::Hash, sync::Arc};

use ahash::AHashMap;
use strata_common::{Result, error::Error};

use crate::column::{ColumnDescriptor, format_path};

/// How many times a field may occur within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Exactly once.
    Required,
    /// Zero or one time.
    Optional,
    /// Zero or more times, order preserved.
    Repeated,
}

impl Repetition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repetition::Required => "required",
            Repetition::Optional => "optional",
            Repetition::Repeated => "repeated",
        }
    }

    /// Contribution of a field with this repetition to the maximum repetition level
    /// of the columns below it.
    #[inline]
    pub fn repetition_increment(&self) -> u32 {
        match self {
            Repetition::Repeated => 1,
            _ => 0,
        }
    }

    /// Contribution of a field with this repetition to the maximum definition level
    /// of the columns below it.
    #[inline]
    pub fn definition_increment(&self) -> u32 {
        match self {
            Repetition::Required => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of a leaf column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Binary,
    String,
}

impl PhysicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicalType::Boolean => "boolean",
            PhysicalType::Int32 => "int32",
            PhysicalType::Int64 => "int64",
            PhysicalType::Float => "float",
            PhysicalType::Double => "double",
            PhysicalType::Binary => "binary",
            PhysicalType::String => "string",
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveType {
    name: String,
    repetition: Repetition,
    physical_type: PhysicalType,
}

impl PrimitiveType {
    /// # Panics
    ///
    /// Panics if the name is empty.
    pub fn new(
        repetition: Repetition,
        physical_type: PhysicalType,
        name: impl Into<String>,
    ) -> PrimitiveType {
        let name = name.into();
        assert!(!name.is_empty());
        PrimitiveType {
            name,
            repetition,
            physical_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }
}

/// An inner node of the schema tree: a named, ordered list of child fields.
///
/// Children are addressed both by position (the field index shared with the
/// converter tree) and by name.
#[derive(Debug, Clone)]
pub struct GroupType {
    name: String,
    repetition: Repetition,
    fields: Vec<Type>,
    /// Field name to index in `fields`.
    field_map: AHashMap<String, usize>,
}

impl GroupType {
    /// Creates a group with the given children.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty, or if two children share a name.
    pub fn new(repetition: Repetition, name: impl Into<String>, fields: Vec<Type>) -> GroupType {
        let name = name.into();
        assert!(!name.is_empty());
        let mut field_map = AHashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let prev = field_map.insert(field.name().to_string(), index);
            assert!(prev.is_none(), "duplicate field '{}'", field.name());
        }
        GroupType {
            name,
            repetition,
            fields,
            field_map,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn fields(&self) -> &[Type] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the child at `index`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the index is out of bounds.
    pub fn field_at(&self, index: usize) -> Result<&Type> {
        self.fields
            .get(index)
            .ok_or_else(|| Error::invalid_arg("index", format!("no field {index} in '{}'", self.name)))
    }

    /// Position of the child named `name`, if any.
    pub fn field_index<Q>(&self, name: &Q) -> Option<usize>
    where
        Q: Hash + Eq + ?Sized,
        String: Borrow<Q>,
    {
        self.field_map.get(name).copied()
    }

    /// Finds a child by name and returns it along with its position.
    pub fn find_field<Q>(&self, name: &Q) -> Option<(usize, &Type)>
    where
        Q: Hash + Eq + ?Sized,
        String: Borrow<Q>,
    {
        self.field_index(name).map(|i| (i, &self.fields[i]))
    }

    pub fn field<Q>(&self, name: &Q) -> Option<&Type>
    where
        Q: Hash + Eq + ?Sized,
        String: Borrow<Q>,
    {
        self.find_field(name).map(|(_, field)| field)
    }
}

impl PartialEq for GroupType {
    fn eq(&self, other: &GroupType) -> bool {
        self.name == other.name
            && self.repetition == other.repetition
            && self.fields == other.fields
    }
}

impl Eq for GroupType {}

/// A schema node: either a leaf or a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Group(Arc<GroupType>),
}

impl Type {
    /// Shorthand for a `Type::Primitive` node.
    pub fn primitive(
        repetition: Repetition,
        physical_type: PhysicalType,
        name: impl Into<String>,
    ) -> Type {
        Type::Primitive(PrimitiveType::new(repetition, physical_type, name))
    }

    /// Shorthand for a `Type::Group` node.
    pub fn group(repetition: Repetition, name: impl Into<String>, fields: Vec<Type>) -> Type {
        Type::Group(Arc::new(GroupType::new(repetition, name, fields)))
    }

    pub fn name(&self) -> &str {
        match self {
            Type::Primitive(t) => t.name(),
            Type::Group(t) => t.name(),
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            Type::Primitive(t) => t.repetition(),
            Type::Group(t) => t.repetition(),
        }
    }

    pub fn is_repetition(&self, repetition: Repetition) -> bool {
        self.repetition() == repetition
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// # Errors
    ///
    /// `SchemaMismatch` if this node is a primitive.
    pub fn as_group(&self) -> Result<&Arc<GroupType>> {
        match self {
            Type::Group(t) => Ok(t),
            Type::Primitive(t) => Err(Error::schema_mismatch(
                t.name(),
                "primitive field used as a group",
            )),
        }
    }

    /// # Errors
    ///
    /// `SchemaMismatch` if this node is a group.
    pub fn as_primitive(&self) -> Result<&PrimitiveType> {
        match self {
            Type::Primitive(t) => Ok(t),
            Type::Group(t) => Err(Error::schema_mismatch(
                t.name(),
                "group field used as a primitive",
            )),
        }
    }
}

/// The root of a schema. Its fields are the top-level fields of every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    root: Arc<GroupType>,
}

impl MessageType {
    /// # Panics
    ///
    /// Panics if the name is empty or if two top-level fields share a name.
    pub fn new(name: impl Into<String>, fields: Vec<Type>) -> MessageType {
        MessageType {
            root: Arc::new(GroupType::new(Repetition::Required, name, fields)),
        }
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    /// The root group. Its repetition is always `Required`.
    pub fn root(&self) -> &Arc<GroupType> {
        &self.root
    }

    pub fn fields(&self) -> &[Type] {
        self.root.fields()
    }

    pub fn field_count(&self) -> usize {
        self.root.field_count()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.root.field_index(name)
    }

    /// Iterates over every field of the schema (groups and leaves, at any depth)
    /// in depth-first order.
    pub fn iter_types(&self) -> TypeIter<'_> {
        TypeIter {
            stack: self.root.fields().iter().rev().collect(),
        }
    }

    /// Resolves a field path to the schema node it names.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if a name is unknown or a non-terminal step is a primitive.
    pub fn type_at_path(&self, path: &[impl AsRef<str>]) -> Result<&Type> {
        let mut group: &GroupType = &self.root;
        let mut current: Option<&Type> = None;
        for (depth, name) in path.iter().enumerate() {
            if let Some(Type::Primitive(_)) = current {
                return Err(Error::schema_mismatch(
                    format_path(&path[..depth]),
                    "primitive field cannot have children",
                ));
            }
            let (_, field) = group.find_field(name.as_ref()).ok_or_else(|| {
                Error::schema_mismatch(
                    format_path(&path[..=depth]),
                    format!("field '{}' not found in '{}'", name.as_ref(), group.name()),
                )
            })?;
            if let Type::Group(child) = field {
                group = child.as_ref();
            }
            current = Some(field);
        }
        current.ok_or_else(|| Error::invalid_arg("path", "empty field path"))
    }

    /// Describes every leaf column, in depth-first schema order.
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        let mut columns = Vec::new();
        let mut path = Vec::new();
        collect_columns(&self.root, &mut path, 0, 0, &mut columns);
        columns
    }

    /// Describes the leaf column at `path`.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if the path does not resolve, or resolves to a group.
    pub fn column(&self, path: &[impl AsRef<str>]) -> Result<ColumnDescriptor> {
        let mut group: &GroupType = &self.root;
        let mut max_repetition_level = 0;
        let mut max_definition_level = 0;
        for (depth, name) in path.iter().enumerate() {
            let (_, field) = group.find_field(name.as_ref()).ok_or_else(|| {
                Error::schema_mismatch(
                    format_path(&path[..=depth]),
                    format!("field '{}' not found in '{}'", name.as_ref(), group.name()),
                )
            })?;
            max_repetition_level += field.repetition().repetition_increment();
            max_definition_level += field.repetition().definition_increment();
            match field {
                Type::Group(child) => group = child.as_ref(),
                Type::Primitive(leaf) if depth + 1 == path.len() => {
                    return Ok(ColumnDescriptor::new(
                        path.iter().map(|s| s.as_ref().to_string()).collect(),
                        leaf.physical_type(),
                        max_repetition_level,
                        max_definition_level,
                    ));
                }
                Type::Primitive(_) => {
                    return Err(Error::schema_mismatch(
                        format_path(&path[..=depth]),
                        "primitive field cannot have children",
                    ));
                }
            }
        }
        Err(Error::schema_mismatch(
            format_path(path),
            "path does not end at a primitive field",
        ))
    }

    /// Verifies that every field of `projection` exists in this schema with the same
    /// repetition and kind (and physical type for leaves).
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` naming the first offending field.
    pub fn check_contains(&self, projection: &MessageType) -> Result<()> {
        let mut path = Vec::new();
        check_group_contains(&self.root, &projection.root, &mut path)
    }
}

fn collect_columns(
    group: &GroupType,
    path: &mut Vec<String>,
    repetition_level: u32,
    definition_level: u32,
    columns: &mut Vec<ColumnDescriptor>,
) {
    for field in group.fields() {
        let r = repetition_level + field.repetition().repetition_increment();
        let d = definition_level + field.repetition().definition_increment();
        path.push(field.name().to_string());
        match field {
            Type::Primitive(leaf) => {
                columns.push(ColumnDescriptor::new(
                    path.clone(),
                    leaf.physical_type(),
                    r,
                    d,
                ));
            }
            Type::Group(child) => collect_columns(child, path, r, d, columns),
        }
        path.pop();
    }
}

fn check_group_contains(
    group: &GroupType,
    projection: &GroupType,
    path: &mut Vec<String>,
) -> Result<()> {
    for field in projection.fields() {
        path.push(field.name().to_string());
        let (_, existing) = group.find_field(field.name()).ok_or_else(|| {
            Error::schema_mismatch(format_path(path), "field not found in the schema")
        })?;
        if existing.repetition() != field.repetition() {
            return Err(Error::schema_mismatch(
                format_path(path),
                format!(
                    "repetition {} does not match {}",
                    field.repetition(),
                    existing.repetition()
                ),
            ));
        }
        match (existing, field) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                if a.physical_type() != b.physical_type() {
                    return Err(Error::schema_mismatch(
                        format_path(path),
                        format!(
                            "type {} does not match {}",
                            b.physical_type(),
                            a.physical_type()
                        ),
                    ));
                }
            }
            (Type::Group(a), Type::Group(b)) => check_group_contains(a, b, path)?,
            _ => {
                return Err(Error::schema_mismatch(
                    format_path(path),
                    "group/primitive kind does not match",
                ));
            }
        }
        path.pop();
    }
    Ok(())
}

/// Depth-first iterator over the fields of a schema.
pub struct TypeIter<'a> {
    stack: Vec<&'a Type>,
}

impl<'a> Iterator for TypeIter<'a> {
    type Item = &'a Type;

    fn next(&mut self) -> Option<&'a Type> {
        let next = self.stack.pop()?;
        if let Type::Group(group) = next {
            self.stack.extend(group.fields().iter().rev());
        }
        Some(next)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name())?;
        for field in self.fields() {
            write_type(f, field, 1)?;
        }
        write!(f, "}}")
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &Type, indent: usize) -> fmt::Result {
    let pad = "  ".repeat(indent);
    match ty {
        Type::Primitive(leaf) => writeln!(
            f,
            "{pad}{} {} {};",
            leaf.repetition(),
            leaf.physical_type(),
            leaf.name()
        ),
        Type::Group(group) => {
            writeln!(f, "{pad}{} group {} {{", group.repetition(), group.name())?;
            for field in group.fields() {
                write_type(f, field, indent + 1)?;
            }
            writeln!(f, "{pad}}}")
        }
    }
}
