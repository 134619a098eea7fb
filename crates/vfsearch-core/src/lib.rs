//! # vfsearch-core
//!
//! Core types and traits for the vfsearch incremental indexing pipeline.
//!
//! This crate provides the foundational abstractions used throughout
//! vfsearch:
//!
//! - **Index writing**: [`IndexWriter`] port over the backing index engine
//! - **Repository access**: [`Repository`] read API over the content store
//! - **Content extraction**: [`DocumentFactory`] per-format payload factories
//! - **Dependency chains**: [`DependencyResolver`] for co-indexed resources
//! - **Reporting**: [`ReportSink`] for progress and diagnostics
//!
//! ## Architecture
//!
//! The crate is organized around an incremental update pipeline:
//!
//! ```text
//! ChangeRecord list ─→ Planner ─→ UpdateData ─→ Scheduler ─→ IndexWriter
//!        (or full traversal)                        │
//!                                           DocumentFactory
//! ```
//!
//! A full rebuild drives the same scheduler from a recursive repository
//! listing instead of a change list.
//!
//! ## Related Crates
//!
//! - `vfsearch-extract`: extraction factory implementations and registry
//! - `vfsearch-store`: index writer implementations (memory, tantivy)
//! - `vfsearch-index`: planner, dependency resolver, scheduler, traversal
//! - `vfsearch`: command-line interface

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, ExtractError, PlanError, ReadError, Result, WriterError};
pub use traits::*;
pub use types::*;
