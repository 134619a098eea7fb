//! Core types for vfsearch.
//!
//! This module contains the shared data structures used across the pipeline:
//!
//! ## Sources and changes
//! - [`SourceScope`]: the set of root paths an indexer unit is responsible for
//! - [`ChangeRecord`]: one changed item from a publish cycle
//! - [`ChangeState`]: kind of change (new, modified, deleted, moved)
//!
//! ## Resources
//! - [`ResourceRecord`]: uniform view over the two backing content models
//! - [`ResourceIdentity`]: canonical identity with a stable document key
//! - [`ResourceFilter`]: listing options for repository reads
//!
//! ## Planning
//! - [`DependencyChain`]: resources whose indexing is kept in lock-step
//! - [`PlannedDocument`]: one resource queued for extraction with its context
//! - [`UpdateData`]: the {to-update, to-delete} result of planning one scope
//!
//! ## Output
//! - [`DocumentPayload`]: field/value pairs handed to the index writer
//! - [`Severity`]: report sink message levels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

// ============================================================================
// Source Scopes & Change Records
// ============================================================================

/// Named set of root paths plus optional type/mime filters.
///
/// A scope defines which resources one indexer unit is responsible for.
/// Empty filter vectors mean "accept everything". Immutable after
/// configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceScope {
    /// Scope name, used in reports
    pub name: String,
    /// Root paths this scope covers
    pub roots: Vec<PathBuf>,
    /// Accepted resource type ids (empty = all)
    #[serde(default)]
    pub resource_types: Vec<u32>,
    /// Accepted mime types (empty = all)
    #[serde(default)]
    pub mime_types: Vec<String>,
}

impl SourceScope {
    /// Create a scope with no type/mime filters.
    #[must_use]
    pub fn new(name: impl Into<String>, roots: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            roots,
            resource_types: Vec::new(),
            mime_types: Vec::new(),
        }
    }

    /// Whether `path` is equal to or a descendant of one of the roots.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    /// Whether an identity passes the type/mime filters.
    #[must_use]
    pub fn accepts(&self, identity: &ResourceIdentity) -> bool {
        if !self.resource_types.is_empty() && !self.resource_types.contains(&identity.type_id) {
            return false;
        }
        if !self.mime_types.is_empty() {
            return identity
                .mime_type
                .as_ref()
                .is_some_and(|mime| self.mime_types.iter().any(|m| m == mime));
        }
        true
    }
}

/// Kind of change reported for a published resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeState {
    New,
    Modified,
    Deleted,
    Moved,
}

/// One changed item from a publish cycle. Produced externally, consumed
/// read-only by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Opaque id of the changed resource
    pub id: Uuid,
    /// Root path of the resource
    pub path: PathBuf,
    /// What happened to it
    pub state: ChangeState,
}

impl ChangeRecord {
    /// Convenience constructor.
    #[must_use]
    pub fn new(id: Uuid, path: impl Into<PathBuf>, state: ChangeState) -> Self {
        Self {
            id,
            path: path.into(),
            state,
        }
    }
}

// ============================================================================
// Resource Records
// ============================================================================

/// A resource in the current content model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VfsResource {
    /// Unique resource id
    pub id: Uuid,
    /// Canonical repository path
    pub path: PathBuf,
    /// Raw resource type id
    pub type_id: u32,
    /// Whether this is a folder (folders are never indexed)
    pub is_folder: bool,
    /// Release time, if the resource is time-windowed
    pub released: Option<DateTime<Utc>>,
    /// Expiration time, if the resource is time-windowed
    pub expires: Option<DateTime<Utc>>,
}

/// A record in the legacy content model. Legacy records live in a channel
/// folder and are not file-backed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecord {
    /// Unique record id
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Channel folder the record belongs to
    pub channel: PathBuf,
    /// Legacy content type id
    pub content_type: u32,
}

impl LegacyRecord {
    /// Canonical path of the record: its channel plus its id.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.channel.join(self.id.to_string())
    }
}

/// Uniform view over the two backing content models.
///
/// Downstream logic (identity derivation, planning, extraction) only ever
/// sees this variant, never the concrete model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ResourceRecord {
    /// Current content model
    Vfs(VfsResource),
    /// Legacy content model
    Legacy(LegacyRecord),
}

impl ResourceRecord {
    /// Opaque id of the underlying record.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Vfs(r) => r.id,
            Self::Legacy(r) => r.id,
        }
    }

    /// Canonical path of the underlying record.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        match self {
            Self::Vfs(r) => r.path.clone(),
            Self::Legacy(r) => r.path(),
        }
    }

    /// Display name: file name for VFS resources, title for legacy records.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Vfs(r) => r
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Legacy(r) => r.title.clone(),
        }
    }

    /// Raw type id before canonicalization.
    #[must_use]
    pub fn type_id(&self) -> u32 {
        match self {
            Self::Vfs(r) => r.type_id,
            Self::Legacy(r) => r.content_type,
        }
    }

    /// Whether the record can carry indexable content. Folders cannot.
    #[must_use]
    pub fn is_file(&self) -> bool {
        match self {
            Self::Vfs(r) => !r.is_folder,
            Self::Legacy(_) => true,
        }
    }

    /// Whether the record is backed by file content (drives mime detection).
    #[must_use]
    pub fn is_file_backed(&self) -> bool {
        matches!(self, Self::Vfs(_))
    }

    /// Whether the record is inside its release/expiry window at `now`.
    /// Records without a window are always available.
    #[must_use]
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Vfs(r) => {
                r.released.is_none_or(|t| t <= now) && r.expires.is_none_or(|t| now < t)
            }
            Self::Legacy(_) => true,
        }
    }
}

/// Canonical identity of a resource, independent of the backing model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    /// Opaque id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Canonical path, used as the index document address
    pub path: PathBuf,
    /// Canonical resource type id
    pub type_id: u32,
    /// Mime type, absent for non-file-backed content
    pub mime_type: Option<String>,
    /// Derived document key; stable for a given (type, mime) pair
    pub doc_key: String,
}

/// Listing options for repository reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Only return file-bearing resources, never folders
    pub files_only: bool,
    /// Ignore release/expiry windows (full rebuilds index everything)
    pub include_expired: bool,
}

impl ResourceFilter {
    /// Files inside their release window only.
    #[must_use]
    pub fn files() -> Self {
        Self {
            files_only: true,
            include_expired: false,
        }
    }

    /// All files regardless of release/expiry windows.
    #[must_use]
    pub fn files_ignore_expiration() -> Self {
        Self {
            files_only: true,
            include_expired: true,
        }
    }
}

// ============================================================================
// Dependency Chains & Planning
// ============================================================================

/// Ordered set of identities whose indexing must be kept in lock-step,
/// e.g. a canonical item and its locale variants.
///
/// Resolvers order members deterministically so that resolving the chain
/// from any member yields the identical chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyChain {
    /// Chain members, front to back
    pub members: Vec<ResourceIdentity>,
}

impl DependencyChain {
    /// Chain with a single member.
    #[must_use]
    pub fn singleton(identity: ResourceIdentity) -> Self {
        Self {
            members: vec![identity],
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a path is a member of the chain.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m.path == path)
    }
}

/// One resource queued for extraction, with the dependency context the
/// extraction factory will see.
#[derive(Debug, Clone)]
pub struct PlannedDocument {
    /// The backing record, handed to the extraction factory
    pub record: ResourceRecord,
    /// Canonical identity
    pub identity: ResourceIdentity,
    /// Dependency context persisted at planning time
    pub context: DependencyChain,
}

/// Result of planning one scope: two disjoint sets of document identities.
/// Owned exclusively by the planner's caller; snapshot once returned.
#[derive(Debug, Clone, Default)]
pub struct UpdateData {
    /// Name of the scope this plan belongs to
    pub scope: String,
    /// Documents to extract and upsert
    pub to_update: Vec<PlannedDocument>,
    /// Identities to delete (no extraction context, nothing is extracted)
    pub to_delete: Vec<ResourceIdentity>,
}

impl UpdateData {
    /// Empty plan for a scope.
    #[must_use]
    pub fn empty(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    /// Whether the plan contains no work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

// ============================================================================
// Document Payloads
// ============================================================================

/// Field/value pairs produced by extraction and handed to the index writer.
///
/// Fields are kept ordered so repeated extractions of unchanged content
/// produce byte-identical writer calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Ordered field map
    pub fields: BTreeMap<String, String>,
}

impl DocumentPayload {
    /// Empty payload, signaling "extraction produced no content".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether the payload carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Severity of a report sink message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress note
    Note,
    /// Recoverable problem (abandoned worker, unreadable root, commit failure)
    Warn,
    /// Escalated liveness problem
    Error,
}
