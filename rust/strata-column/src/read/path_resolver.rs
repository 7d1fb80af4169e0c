//! Lock-step walk of the schema tree and the converter tree along a column path.

use strata_common::{Result, error::Error};
use strata_schema::{ColumnDescriptor, GroupType, Type, column::format_path};

use crate::converter::{GroupConverter, PrimitiveConverter};

/// A group on the path from the record root to a leaf column (the root excluded).
#[derive(Clone, Copy)]
pub struct AncestorGroup<'a> {
    pub converter: &'a dyn GroupConverter,
    /// Repetition level that starts a new element of this group: the number of
    /// repeated fields down to and including it.
    pub repetition_level: u32,
    /// Definition level at which this group is present: the number of optional or
    /// repeated fields down to and including it.
    pub definition_level: u32,
}

/// Result of resolving one column path.
pub struct ResolvedColumn<'a> {
    /// Groups between the root and the leaf, root-to-leaf order.
    pub ancestors: Vec<AncestorGroup<'a>>,
    pub leaf: &'a dyn PrimitiveConverter,
    /// `repeated_definition_levels[r - 1]` is the definition level of the repeated
    /// field (group or leaf) whose elements repetition level `r` continues.
    pub repeated_definition_levels: Vec<u32>,
}

/// Resolves the leaf converter of `column`, collecting the group converters along
/// the way.
///
/// # Errors
///
/// - `SchemaMismatch` if a path element is not found, a non-terminal element is a
///   primitive field, the path ends on a group, or the descriptor's type or
///   levels disagree with the schema.
/// - `CapabilityMismatch` if a converter along the path is not a group converter,
///   or the final converter is not a primitive converter.
pub fn resolve_column<'a>(
    schema: &GroupType,
    root: &'a dyn GroupConverter,
    column: &ColumnDescriptor,
) -> Result<ResolvedColumn<'a>> {
    let path = column.path();
    if path.is_empty() {
        return Err(Error::schema_mismatch("", "empty column path"));
    }

    let mut group = schema;
    let mut converter = root;
    let mut ancestors = Vec::with_capacity(path.len() - 1);
    let mut repeated_definition_levels = Vec::new();
    let mut repetition_level = 0;
    let mut definition_level = 0;

    for (depth, name) in path.iter().enumerate() {
        let (field_index, field) = group.find_field(name.as_str()).ok_or_else(|| {
            Error::schema_mismatch(
                format_path(&path[..=depth]),
                format!("field '{name}' not found in '{}'", group.name()),
            )
        })?;
        repetition_level += field.repetition().repetition_increment();
        definition_level += field.repetition().definition_increment();
        if field.repetition().repetition_increment() > 0 {
            repeated_definition_levels.push(definition_level);
        }
        let child = converter.child(field_index)?;
        let is_last = depth + 1 == path.len();

        match field {
            Type::Group(child_group) => {
                let child = child.as_group()?;
                ancestors.push(AncestorGroup {
                    converter: child,
                    repetition_level,
                    definition_level,
                });
                group = child_group.as_ref();
                converter = child;
            }
            Type::Primitive(leaf) => {
                if !is_last {
                    return Err(Error::schema_mismatch(
                        format_path(&path[..=depth]),
                        "primitive field cannot have children",
                    ));
                }
                if leaf.physical_type() != column.physical_type()
                    || repetition_level != column.max_repetition_level()
                    || definition_level != column.max_definition_level()
                {
                    return Err(Error::schema_mismatch(
                        column.path_string(),
                        format!(
                            "descriptor '{column}' disagrees with the schema ({} R:{repetition_level} D:{definition_level})",
                            leaf.physical_type()
                        ),
                    ));
                }
                return Ok(ResolvedColumn {
                    ancestors,
                    leaf: child.as_primitive()?,
                    repeated_definition_levels,
                });
            }
        }
    }
    Err(Error::schema_mismatch(
        column.path_string(),
        "path ends at a group field",
    ))
}

/// Resolves only the leaf converter of a column path.
pub fn resolve_primitive_converter<'a>(
    schema: &GroupType,
    root: &'a dyn GroupConverter,
    column: &ColumnDescriptor,
) -> Result<&'a dyn PrimitiveConverter> {
    resolve_column(schema, root, column).map(|resolved| resolved.leaf)
}
