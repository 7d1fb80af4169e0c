use std::fmt;

use crate::schema::PhysicalType;

/// Describes one leaf column of a schema: its field path from the root, the
/// physical type of its values and the level bounds of its striped stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    path: Vec<String>,
    physical_type: PhysicalType,
    /// Number of `Repeated` fields along the path, the leaf included.
    max_repetition_level: u32,
    /// Number of `Optional` or `Repeated` fields along the path, the leaf included.
    max_definition_level: u32,
}

impl ColumnDescriptor {
    pub fn new(
        path: Vec<String>,
        physical_type: PhysicalType,
        max_repetition_level: u32,
        max_definition_level: u32,
    ) -> ColumnDescriptor {
        ColumnDescriptor {
            path,
            physical_type,
            max_repetition_level,
            max_definition_level,
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Name of the leaf field.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    pub fn max_repetition_level(&self) -> u32 {
        self.max_repetition_level
    }

    pub fn max_definition_level(&self) -> u32 {
        self.max_definition_level
    }

    /// Dotted form of the path, e.g. `Name.Language.Code`.
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} R:{} D:{}",
            self.path_string(),
            self.physical_type,
            self.max_repetition_level,
            self.max_definition_level
        )
    }
}

/// Joins field names with `.`.
pub fn format_path(path: &[impl AsRef<str>]) -> String {
    let mut res = String::new();
    for (i, name) in path.iter().enumerate() {
        if i != 0 {
            res.push('.');
        }
        res.push_str(name.as_ref());
    }
    res
}
