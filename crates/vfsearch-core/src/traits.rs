//! Core traits for vfsearch components.
//!
//! This module defines the seams between the orchestration core and its
//! collaborators:
//!
//! - [`IndexWriter`]: narrow port over the backing index engine
//! - [`Repository`]: read API of the content repository
//! - [`DocumentFactory`]: per-format content extraction
//! - [`DependencyResolver`]: co-indexing chains over folder siblings
//! - [`ReportSink`]: progress and diagnostics output
//!
//! These traits enable a pluggable architecture where backing engines,
//! repositories, and extraction formats can be swapped without touching
//! the planner, traversal, or scheduler.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{ExtractError, ReadError, WriterError};
use crate::types::{
    DependencyChain, DocumentPayload, ResourceFilter, ResourceRecord, Severity,
};

// ============================================================================
// Index Writer Port
// ============================================================================

/// Narrow contract over the backing index engine.
///
/// `update_document` has upsert semantics: any existing entry whose path
/// matches exactly is removed before the new one is inserted, so repeated
/// calls with the same path are idempotent. `delete_documents` matches the
/// exact path only, never a subtree.
///
/// The port gives no internal synchronization guarantee; only one logical
/// caller (the scheduler) may invoke mutating methods on a given writer
/// instance at a time.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// Upsert the document stored under `path`.
    async fn update_document(
        &self,
        path: &Path,
        payload: &DocumentPayload,
    ) -> Result<(), WriterError>;

    /// Delete any document stored under exactly `path`.
    async fn delete_documents(&self, path: &Path) -> Result<(), WriterError>;

    /// Make prior writes visible. A failure here is logged by the caller
    /// and must not abort the run.
    async fn commit(&self) -> Result<(), WriterError>;

    /// Merge/compact the index.
    async fn optimize(&self) -> Result<(), WriterError>;

    /// Release the writer. No calls may follow.
    async fn close(&self) -> Result<(), WriterError>;
}

// ============================================================================
// Repository
// ============================================================================

/// Read API of the content repository.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Read a single resource by its canonical path.
    async fn read_resource(&self, path: &Path) -> Result<ResourceRecord, ReadError>;

    /// List all resources under `path` recursively, applying `filter`.
    async fn list_resources(
        &self,
        path: &Path,
        filter: &ResourceFilter,
    ) -> Result<Vec<ResourceRecord>, ReadError>;
}

// ============================================================================
// Extraction Factories
// ============================================================================

/// Converts a resource record plus its dependency context into an
/// indexable document payload.
///
/// An empty payload signals that extraction could not produce content;
/// the scheduler turns both that and an [`ExtractError`] into a defensive
/// delete. No panic or error may escape past the registry boundary.
#[async_trait]
pub trait DocumentFactory: Send + Sync {
    /// Whether this factory handles the given (type, mime) pair.
    fn can_produce(&self, type_id: u32, mime: Option<&str>) -> bool;

    /// Produce the payload for a resource.
    async fn produce(
        &self,
        record: &ResourceRecord,
        context: &DependencyChain,
    ) -> Result<DocumentPayload, ExtractError>;
}

// ============================================================================
// Dependency Resolution
// ============================================================================

/// Resolves the ordered chain of resources that must be co-indexed with a
/// given resource.
///
/// The caller supplies the sibling slice (resources sharing the parent
/// folder) from a folder lookup map built once per traversal, so chains
/// are computed once per folder rather than once per resource.
pub trait DependencyResolver: Send + Sync {
    /// Whether this indexer variant supports dependency chains at all.
    /// Without the capability the chain is the singleton {resource}.
    fn supports_dependencies(&self) -> bool {
        false
    }

    /// Resolve the chain for `resource` given its folder siblings.
    ///
    /// The returned chain always contains `resource` itself and is ordered
    /// deterministically: resolving from any member yields the same chain.
    fn resolve(
        &self,
        resource: &ResourceRecord,
        siblings: &[ResourceRecord],
    ) -> Vec<ResourceRecord>;
}

// ============================================================================
// Reporting
// ============================================================================

/// Sink for progress notes, warnings, and liveness escalation.
pub trait ReportSink: Send + Sync {
    /// Emit one message at the given severity.
    fn println(&self, message: &str, severity: Severity);
}
