//! Incremental indexing orchestration for vfsearch.
//!
//! This crate ties the core ports together into the indexing pipeline:
//!
//! - [`identity`]: canonical resource identities and document keys
//! - [`dependency`]: co-indexing chain resolvers
//! - [`planner`]: change records in, update set out
//! - [`scheduler`]: timeout-bounded extraction in front of the writer
//! - [`traversal`]: full rebuilds of a scope
//! - [`repository`]: filesystem and in-memory content repositories
//! - [`report`]: progress and diagnostics sinks

pub mod dependency;
pub mod identity;
pub mod planner;
pub mod report;
pub mod repository;
pub mod scheduler;
pub mod traversal;

pub use dependency::{LocaleVariantResolver, SingletonResolver};
pub use identity::{document_key, identify, TypeRegistry};
pub use planner::UpdatePlanner;
pub use report::{CapturingReport, LogReport};
pub use repository::{FsRepository, MemoryRepository};
pub use scheduler::{CancellationPolicy, IndexScheduler, RunStatistics, SchedulerConfig};
pub use traversal::RebuildTraversal;
