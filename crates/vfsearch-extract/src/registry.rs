//! Factory registry mapping (resource type, mime type) to document factories.

use std::sync::Arc;
use vfsearch_core::{DependencyChain, DocumentFactory, DocumentPayload, ExtractError, ResourceRecord};

/// Registry of document extraction factories.
pub struct FactoryRegistry {
    /// Named factories, probed in registration order
    factories: Vec<(String, Arc<dyn DocumentFactory>)>,
}

impl FactoryRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a factory under a name. Earlier registrations win ties.
    pub fn register<F: DocumentFactory + 'static>(&mut self, name: &str, factory: F) {
        self.factories.push((name.to_string(), Arc::new(factory)));
    }

    /// Number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve the factory for a (type, mime) pair.
    #[must_use]
    pub fn resolve(&self, type_id: u32, mime: Option<&str>) -> Option<Arc<dyn DocumentFactory>> {
        self.factories
            .iter()
            .find(|(_, f)| f.can_produce(type_id, mime))
            .map(|(_, f)| Arc::clone(f))
    }

    /// Produce the payload for a resource through the matching factory.
    ///
    /// Fails with [`ExtractError::UnsupportedType`] when no factory matches
    /// the identity's (type, mime) pair.
    pub async fn produce(
        &self,
        type_id: u32,
        mime: Option<&str>,
        record: &ResourceRecord,
        context: &DependencyChain,
    ) -> Result<DocumentPayload, ExtractError> {
        let factory = self
            .resolve(type_id, mime)
            .ok_or_else(|| ExtractError::UnsupportedType {
                type_id,
                mime: mime.map(str::to_string),
            })?;

        factory.produce(record, context).await
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
