//! Index writer implementations for vfsearch.
//!
//! Two implementations of [`vfsearch_core::IndexWriter`]:
//!
//! - [`MemoryIndexWriter`]: in-memory op-log writer for tests and dry runs
//! - [`TantivyIndexWriter`]: tantivy-backed full-text index on disk
//!
//! The persisted index format is owned entirely by tantivy; vfsearch
//! defines no on-disk format of its own.

pub mod memory;
pub mod tantivy;

pub use memory::{MemoryIndexWriter, WriteOp};
pub use self::tantivy::TantivyIndexWriter;
