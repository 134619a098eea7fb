//! Resource identity derivation.
//!
//! [`identify`] is a pure function from either backing-model variant to a
//! canonical [`ResourceIdentity`]. Type canonicalization and mime lookup
//! both fall back instead of failing; no error ever crosses this boundary.

use std::collections::HashMap;
use vfsearch_core::{ResourceIdentity, ResourceRecord};

/// Maps raw resource type ids to their generic/canonical classification.
///
/// Unmapped ids resolve to themselves, so resolution can never fail.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    canonical: HashMap<u32, u32>,
}

impl TypeRegistry {
    /// Create an empty registry (every type is its own canonical type).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a raw type id to a canonical one.
    pub fn map(&mut self, raw: u32, canonical: u32) {
        self.canonical.insert(raw, canonical);
    }

    /// Builder-style mapping.
    #[must_use]
    pub fn with(mut self, raw: u32, canonical: u32) -> Self {
        self.map(raw, canonical);
        self
    }

    /// Resolve a raw type id, falling back to the raw id itself.
    #[must_use]
    pub fn resolve(&self, raw: u32) -> u32 {
        self.canonical.get(&raw).copied().unwrap_or(raw)
    }
}

/// Derive the document key for a (canonical type, mime type) pair.
///
/// The key is a deterministic pure function of its inputs and therefore
/// stable across repeated runs over unchanged content.
#[must_use]
pub fn document_key(type_id: u32, mime: Option<&str>) -> String {
    match mime {
        Some(mime) => format!("doc:{type_id}:{mime}"),
        None => format!("doc:{type_id}"),
    }
}

/// Produce the canonical identity for a record of either backing model.
#[must_use]
pub fn identify(record: &ResourceRecord, types: &TypeRegistry) -> ResourceIdentity {
    let type_id = types.resolve(record.type_id());
    // Mime is derived from the name for file-backed content only
    let mime_type = if record.is_file_backed() {
        mime_guess::from_path(record.path())
            .first()
            .map(|m| m.to_string())
    } else {
        None
    };
    let doc_key = document_key(type_id, mime_type.as_deref());

    ResourceIdentity {
        id: record.id(),
        name: record.name(),
        path: record.path(),
        type_id,
        mime_type,
        doc_key,
    }
}
