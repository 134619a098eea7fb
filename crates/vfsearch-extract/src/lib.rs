//! Content extraction for vfsearch.
//!
//! Pluggable per-format document factories behind a [`FactoryRegistry`]:
//!
//! - [`PlainTextFactory`]: file-backed resources with textual content
//! - [`LegacyContentFactory`]: records from the legacy content model
//!
//! Factories implement [`vfsearch_core::DocumentFactory`]; the registry
//! resolves one per (resource type, mime type) pair.

pub mod legacy;
pub mod registry;
pub mod text;

pub use legacy::LegacyContentFactory;
pub use registry::FactoryRegistry;
pub use text::PlainTextFactory;
