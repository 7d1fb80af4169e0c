//! Schema projections: a `MessageType` restricted to a chosen set of field paths.
//!
//! A projection keeps every ancestor of a selected field, so the projected schema
//! is itself a valid schema whose columns carry the same repetition and definition
//! levels as in the full schema:
//!
//! ```text
//! Document                     Document
//! ├── DocId                    ├── DocId
//! ├── Links                    └── Name
//! │   ├── Backward                 └── Language
//! │   └── Forward                      └── Country
//! └── Name
//!     ├── Language
//!     │   ├── Code
//!     │   └── Country
//!     └── Url
//! ```
//!
//! Selected fields keep their relative schema order regardless of the order
//! in which paths were added. Selecting a group selects its whole subtree.

use ahash::AHashMap;
use strata_common::{Result, error::Error};

use crate::{
    column::format_path,
    schema::{GroupType, MessageType, Type},
};

/// Builds a projected `MessageType` by adding field paths one at a time.
pub struct SchemaProjectionBuilder<'a> {
    schema: &'a MessageType,
    fields: Vec<TypeProjectionBuilder<'a>>,
    /// Schema field index to position in `fields`.
    field_map: AHashMap<usize, usize>,
}

impl<'a> SchemaProjectionBuilder<'a> {
    pub fn new(schema: &'a MessageType) -> SchemaProjectionBuilder<'a> {
        SchemaProjectionBuilder {
            schema,
            fields: Vec::new(),
            field_map: AHashMap::new(),
        }
    }

    /// Adds a field path (e.g. `["Name", "Language", "Country"]`) to the projection,
    /// along with all of its ancestors.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if the path does not resolve within the schema.
    pub fn add_path(&mut self, path: &[impl AsRef<str>]) -> Result<&mut Self> {
        if path.is_empty() {
            return Ok(self);
        }
        let mut nodes: Vec<(usize, &'a Type)> = Vec::with_capacity(path.len());
        let mut group: &'a GroupType = self.schema.root();
        for (depth, name) in path.iter().enumerate() {
            if depth > 0 {
                group = match nodes[depth - 1] {
                    (_, Type::Group(child)) => child.as_ref(),
                    (_, Type::Primitive(_)) => {
                        return Err(Error::schema_mismatch(
                            format_path(&path[..depth]),
                            "primitive field cannot have children",
                        ));
                    }
                };
            }
            let node = group.find_field(name.as_ref()).ok_or_else(|| {
                Error::schema_mismatch(
                    format_path(&path[..=depth]),
                    format!("field '{}' not found in '{}'", name.as_ref(), group.name()),
                )
            })?;
            nodes.push(node);
        }
        add_nodes(&mut self.fields, &mut self.field_map, &nodes);
        Ok(self)
    }

    /// Builds the projected schema. It keeps the name of the full schema.
    pub fn build(self) -> MessageType {
        MessageType::new(self.schema.name(), finish_fields(self.fields))
    }
}

struct TypeProjectionBuilder<'a> {
    /// Position of the field within its parent in the full schema.
    index: usize,
    data_type: &'a Type,
    /// Whether the whole subtree was selected.
    full: bool,
    children: Vec<TypeProjectionBuilder<'a>>,
    child_map: AHashMap<usize, usize>,
}

impl TypeProjectionBuilder<'_> {
    fn finish(self) -> Type {
        match self.data_type {
            Type::Group(group) if !self.full => Type::group(
                group.repetition(),
                group.name(),
                finish_fields(self.children),
            ),
            other => other.clone(),
        }
    }
}

fn add_nodes<'a>(
    fields: &mut Vec<TypeProjectionBuilder<'a>>,
    field_map: &mut AHashMap<usize, usize>,
    nodes: &[(usize, &'a Type)],
) {
    let Some(&(index, data_type)) = nodes.first() else {
        return;
    };
    let pos = *field_map.entry(index).or_insert_with(|| {
        fields.push(TypeProjectionBuilder {
            index,
            data_type,
            full: false,
            children: Vec::new(),
            child_map: AHashMap::new(),
        });
        fields.len() - 1
    });
    let builder = &mut fields[pos];
    if nodes.len() == 1 {
        builder.full = true;
    } else {
        add_nodes(&mut builder.children, &mut builder.child_map, &nodes[1..]);
    }
}

fn finish_fields(mut fields: Vec<TypeProjectionBuilder<'_>>) -> Vec<Type> {
    fields.sort_by_key(|f| f.index);
    fields
        .into_iter()
        .map(TypeProjectionBuilder::finish)
        .collect()
}
