//! Schema model for nested, striped records: message/group/primitive type trees,
//! per-leaf column descriptors with their maximum repetition and definition levels,
//! and path-based schema projections.

pub mod column;
pub mod projection;
pub mod schema;

pub use column::ColumnDescriptor;
pub use projection::SchemaProjectionBuilder;
pub use schema::{GroupType, MessageType, PhysicalType, PrimitiveType, Repetition, Type};
