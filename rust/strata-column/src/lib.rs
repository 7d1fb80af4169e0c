//! Column reading and record assembly for striped nested data.
//!
//! Every leaf field of a nested schema is stored as an independent stream of
//! `(repetition level, definition level, value?)` triples. This crate turns those
//! streams back into nested records by driving a caller-supplied converter tree:
//!
//! - [`read::ColumnReadStore`] classifies the schema once (flat or nested, all
//!   fields required or not), resolves each column path to its leaf converter and
//!   hands out column readers.
//! - [`read::DremelColumnReader`] is the general level-driven assembler: it keeps
//!   an explicit stack of open ancestor groups and emits `start`/`end`/value
//!   events at the right nesting depth.
//! - [`read::FlatColumnReader`] is the fast path for schemas without groups or
//!   repeated fields.
//! - [`read::RecordReader`] coordinates all column readers of a schema, one record
//!   at a time.
//!
//! Pages are supplied through [`page::PageReadStore`]; [`mem`] provides an
//! in-memory implementation together with column chunk writers.

pub mod converter;
pub mod mem;
pub mod page;
pub mod read;
pub mod value;
pub mod writer_version;

#[cfg(test)]
mod tests;

pub use value::Value;
