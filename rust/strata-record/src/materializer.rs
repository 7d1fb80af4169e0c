//! Converter tree that materializes [`Group`] records.
//!
//! Column readers visit a record one column at a time, so the same group element
//! is entered once per column below it. Each group converter keeps an element
//! cursor within its parent's current element: `start()` moves to the next element,
//! creating it only if no earlier column did. The root's `start()` rewinds the
//! cursors of the top-level fields before every column pass.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Arc,
};

use strata_column::{
    Value,
    converter::{Converter, GroupConverter, PrimitiveConverter, RecordMaterializer},
};
use strata_common::{Result, error::Error};
use strata_schema::{GroupType, MessageType, PhysicalType, Type};

use crate::group::{FieldValue, Group};

#[derive(Default)]
struct AssemblyState {
    /// Record being assembled.
    record: Option<Group>,
    /// `(field index, element index)` of every group entered, from the root.
    path: Vec<(usize, usize)>,
}

impl AssemblyState {
    /// The group element the converters are currently positioned in.
    fn current_group(&mut self) -> Result<&mut Group> {
        let mut group = self
            .record
            .as_mut()
            .ok_or_else(|| Error::invalid_operation("value outside of a record"))?;
        for &(field_index, element) in &self.path {
            group = match group
                .field_values_mut(field_index)
                .and_then(|values| values.get_mut(element))
            {
                Some(FieldValue::Group(child)) => child,
                _ => {
                    return Err(Error::invalid_operation(format!(
                        "no group element {element} of field {field_index}"
                    )));
                }
            };
        }
        Ok(group)
    }
}

type SharedState = Rc<RefCell<AssemblyState>>;

enum ConverterNode {
    Group(GroupFieldConverter),
    Primitive(PrimitiveFieldConverter),
}

impl ConverterNode {
    fn build(group: &GroupType, state: &SharedState) -> Vec<ConverterNode> {
        group
            .fields()
            .iter()
            .enumerate()
            .map(|(field_index, field)| match field {
                Type::Primitive(leaf) => ConverterNode::Primitive(PrimitiveFieldConverter {
                    name: leaf.name().to_string(),
                    field_index,
                    physical_type: leaf.physical_type(),
                    state: state.clone(),
                }),
                Type::Group(child) => ConverterNode::Group(GroupFieldConverter {
                    name: child.name().to_string(),
                    field_index,
                    next_element: Cell::new(0),
                    state: state.clone(),
                    children: ConverterNode::build(child, state),
                }),
            })
            .collect()
    }

    fn as_converter(&self) -> &dyn Converter {
        match self {
            ConverterNode::Group(c) => c,
            ConverterNode::Primitive(c) => c,
        }
    }

    fn child(children: &[ConverterNode], field_index: usize) -> Result<&dyn Converter> {
        children
            .get(field_index)
            .map(ConverterNode::as_converter)
            .ok_or_else(|| {
                Error::invalid_arg("field_index", format!("no child converter {field_index}"))
            })
    }

    fn rewind(children: &[ConverterNode]) {
        for child in children {
            if let ConverterNode::Group(group) = child {
                group.next_element.set(0);
            }
        }
    }
}

/// [`RecordMaterializer`] producing [`Group`] records of the requested schema.
pub struct GroupRecordMaterializer {
    root: RootConverter,
}

impl GroupRecordMaterializer {
    pub fn new(requested_schema: &MessageType) -> GroupRecordMaterializer {
        let state = SharedState::default();
        GroupRecordMaterializer {
            root: RootConverter {
                schema: requested_schema.root().clone(),
                children: ConverterNode::build(requested_schema.root(), &state),
                state,
            },
        }
    }
}

impl RecordMaterializer for GroupRecordMaterializer {
    type Record = Group;

    fn root_converter(&self) -> &dyn GroupConverter {
        &self.root
    }

    /// Returns the assembled record; a record no column contributed to is empty.
    fn take_record(&self) -> Result<Group> {
        let mut state = self.root.state.borrow_mut();
        state.path.clear();
        Ok(state
            .record
            .take()
            .unwrap_or_else(|| Group::new(self.root.schema.clone())))
    }
}

struct RootConverter {
    schema: Arc<GroupType>,
    state: SharedState,
    children: Vec<ConverterNode>,
}

impl Converter for RootConverter {
    fn name(&self) -> &str {
        self.schema.name()
    }

    fn as_group(&self) -> Result<&dyn GroupConverter> {
        Ok(self)
    }
}

impl GroupConverter for RootConverter {
    fn child(&self, field_index: usize) -> Result<&dyn Converter> {
        ConverterNode::child(&self.children, field_index)
    }

    fn start(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.record.is_none() {
            state.record = Some(Group::new(self.schema.clone()));
        }
        state.path.clear();
        ConverterNode::rewind(&self.children);
        Ok(())
    }

    fn end(&self) -> Result<()> {
        let state = self.state.borrow();
        if !state.path.is_empty() {
            return Err(Error::invalid_operation(format!(
                "record ended with {} open groups",
                state.path.len()
            )));
        }
        Ok(())
    }
}

struct GroupFieldConverter {
    name: String,
    field_index: usize,
    /// Element to enter on the next `start()`.
    next_element: Cell<usize>,
    state: SharedState,
    children: Vec<ConverterNode>,
}

impl Converter for GroupFieldConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_group(&self) -> Result<&dyn GroupConverter> {
        Ok(self)
    }
}

impl GroupConverter for GroupFieldConverter {
    fn child(&self, field_index: usize) -> Result<&dyn Converter> {
        ConverterNode::child(&self.children, field_index)
    }

    fn start(&self) -> Result<()> {
        let element = self.next_element.get();
        self.next_element.set(element + 1);

        let mut state = self.state.borrow_mut();
        let parent = state.current_group()?;
        let existing = parent.field_values(self.field_index).len();
        if element == existing {
            parent.add_group_at(self.field_index)?;
        } else if element > existing {
            return Err(Error::invalid_operation(format!(
                "element {element} of '{}' entered before element {existing}",
                self.name
            )));
        }
        state.path.push((self.field_index, element));
        drop(state);

        ConverterNode::rewind(&self.children);
        Ok(())
    }

    fn end(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.path.pop() {
            Some((field_index, _)) if field_index == self.field_index => Ok(()),
            _ => Err(Error::invalid_operation(format!(
                "end of '{}' without a matching start",
                self.name
            ))),
        }
    }
}

struct PrimitiveFieldConverter {
    name: String,
    field_index: usize,
    physical_type: PhysicalType,
    state: SharedState,
}

impl Converter for PrimitiveFieldConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_primitive(&self) -> Result<&dyn PrimitiveConverter> {
        Ok(self)
    }
}

impl PrimitiveConverter for PrimitiveFieldConverter {
    fn add_boolean(&self, value: bool) -> Result<()> {
        self.add_value(Value::Boolean(value))
    }

    fn add_int32(&self, value: i32) -> Result<()> {
        self.add_value(Value::Int32(value))
    }

    fn add_int64(&self, value: i64) -> Result<()> {
        self.add_value(Value::Int64(value))
    }

    fn add_float(&self, value: f32) -> Result<()> {
        self.add_value(Value::Float(value))
    }

    fn add_double(&self, value: f64) -> Result<()> {
        self.add_value(Value::Double(value))
    }

    fn add_binary(&self, value: Vec<u8>) -> Result<()> {
        self.add_value(Value::Binary(value))
    }

    fn add_string(&self, value: String) -> Result<()> {
        self.add_value(Value::String(value))
    }

    fn add_value(&self, value: Value) -> Result<()> {
        if value.physical_type() != self.physical_type {
            return Err(Error::capability_mismatch(
                format!("{} values", value.physical_type()),
                self.name.as_str(),
            ));
        }
        self.state
            .borrow_mut()
            .current_group()?
            .add_value_at(self.field_index, value)
    }
}
