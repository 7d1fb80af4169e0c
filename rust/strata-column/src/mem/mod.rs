//! In-memory page source and column chunk writers.

pub mod chunk;
pub mod page_store;
pub mod write_store;

pub use chunk::{ColumnChunk, ColumnChunkWriter};
pub use page_store::{MemPageReader, MemPageStore};
pub use write_store::MemColumnWriteStore;
