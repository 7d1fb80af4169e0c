//! Converter capability contract.
//!
//! The caller materializes records through a tree of converters that mirrors the
//! group structure of the requested schema: a group converter exposes its children
//! by field index and receives `start`/`end` events once per element; a primitive
//! converter accepts typed values. Column readers only borrow this tree and invoke
//! its callbacks, so every method takes `&self` and implementations use interior
//! mutability for their state.
//!
//! Capabilities are queried explicitly with [`Converter::as_group`] and
//! [`Converter::as_primitive`]; asking a node for a capability it lacks fails with
//! `CapabilityMismatch`.

use strata_common::{Result, error::Error};

use crate::value::Value;

/// A node of the converter tree.
pub trait Converter {
    /// Name used in error messages.
    fn name(&self) -> &str {
        "converter"
    }

    /// # Errors
    ///
    /// `CapabilityMismatch` unless this node is a group converter.
    fn as_group(&self) -> Result<&dyn GroupConverter> {
        Err(Error::capability_mismatch("group events", self.name()))
    }

    /// # Errors
    ///
    /// `CapabilityMismatch` unless this node is a primitive converter.
    fn as_primitive(&self) -> Result<&dyn PrimitiveConverter> {
        Err(Error::capability_mismatch("primitive values", self.name()))
    }
}

/// Converter for a group (or the record root).
pub trait GroupConverter: Converter {
    /// Returns the converter of the child field at `field_index`, the same index
    /// the field has within its schema group.
    fn child(&self, field_index: usize) -> Result<&dyn Converter>;

    /// A new element of this group begins.
    fn start(&self) -> Result<()>;

    /// The current element of this group is complete.
    fn end(&self) -> Result<()>;
}

/// Converter for a leaf field. Only the methods matching the column's physical
/// type need to be implemented; the others reject the value.
pub trait PrimitiveConverter: Converter {
    fn add_boolean(&self, _value: bool) -> Result<()> {
        Err(Error::capability_mismatch("boolean values", self.name()))
    }

    fn add_int32(&self, _value: i32) -> Result<()> {
        Err(Error::capability_mismatch("int32 values", self.name()))
    }

    fn add_int64(&self, _value: i64) -> Result<()> {
        Err(Error::capability_mismatch("int64 values", self.name()))
    }

    fn add_float(&self, _value: f32) -> Result<()> {
        Err(Error::capability_mismatch("float values", self.name()))
    }

    fn add_double(&self, _value: f64) -> Result<()> {
        Err(Error::capability_mismatch("double values", self.name()))
    }

    fn add_binary(&self, _value: Vec<u8>) -> Result<()> {
        Err(Error::capability_mismatch("binary values", self.name()))
    }

    fn add_string(&self, _value: String) -> Result<()> {
        Err(Error::capability_mismatch("string values", self.name()))
    }

    /// Dispatches to the typed method matching the value.
    fn add_value(&self, value: Value) -> Result<()> {
        match value {
            Value::Boolean(v) => self.add_boolean(v),
            Value::Int32(v) => self.add_int32(v),
            Value::Int64(v) => self.add_int64(v),
            Value::Float(v) => self.add_float(v),
            Value::Double(v) => self.add_double(v),
            Value::Binary(v) => self.add_binary(v),
            Value::String(v) => self.add_string(v),
        }
    }
}

/// Owner of a converter tree that produces one record per assembly cycle.
pub trait RecordMaterializer {
    type Record;

    /// The converter for the record root.
    fn root_converter(&self) -> &dyn GroupConverter;

    /// Hands over the record assembled since the previous call.
    fn take_record(&self) -> Result<Self::Record>;
}
