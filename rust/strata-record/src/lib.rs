//! Nested record model on top of the column readers: [`Group`] records, the
//! converter tree that assembles them ([`GroupRecordMaterializer`]) and the
//! shredder that stripes them into columns ([`GroupWriter`]).

pub mod group;
pub mod materializer;
pub mod writer;

pub mod tests;

pub use group::{FieldValue, Group};
pub use materializer::GroupRecordMaterializer;
pub use writer::GroupWriter;

use strata_column::{mem::MemPageStore, page::PageReadStore, read::RecordReader};
use strata_common::Result;
use strata_schema::MessageType;

/// Reads every record of `page_store` as a [`Group`] of `requested_schema`.
pub fn read_groups(
    page_store: &dyn PageReadStore,
    requested_schema: &MessageType,
    created_by: &str,
) -> Result<Vec<Group>> {
    let materializer = GroupRecordMaterializer::new(requested_schema);
    let reader = RecordReader::new(page_store, &materializer, requested_schema, created_by)?;
    reader.collect()
}

/// Shreds `records` of `schema` into an in-memory page store.
pub fn write_groups<'r>(
    schema: &MessageType,
    records: impl IntoIterator<Item = &'r Group>,
) -> Result<MemPageStore> {
    GroupWriter::new(schema).write_all(records)
}
