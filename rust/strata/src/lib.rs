//! # Strata: nested record assembly over striped columns
//!
//! Strata stores nested, schema-described records as one stream per leaf column.
//! Each stream entry carries a repetition level, a definition level and an
//! optional value; together they describe where in the record tree the value
//! belongs, which repeated ancestor it continues, and how deep the defined part
//! of the path goes. Reading reverses the striping: column readers walk these
//! streams and replay them as `start`/`end`/value events on a caller-supplied
//! converter tree, which builds records in whatever representation it likes.
//!
//! ## Module Organization
//!
//! * [`common`] - Error and result types shared by all crates
//! * [`schema`] - Message schemas, column descriptors and schema projections
//! * [`column`] - Converter contract, page abstractions, column readers and the
//!   record reader; writer-version parsing; in-memory column chunks
//! * [`record`] - A generic nested record model with its materializer and shredder
//!
//! ## Reading records
//!
//! A [`column::read::RecordReader`] binds a page store, a requested schema (any
//! projection of the stored schema) and a [`column::converter::RecordMaterializer`].
//! Schemas without groups or repeated fields are read by a flat reader that skips
//! level interpretation; every other schema goes through the generic assembler.
//! Both produce the same converter events.

pub use strata_column as column;
pub use strata_common as common;
pub use strata_record as record;
pub use strata_schema as schema;
