//! Document factory for legacy content records.

use async_trait::async_trait;
use vfsearch_core::{
    DependencyChain, DocumentFactory, DocumentPayload, ExtractError, ResourceRecord,
};

/// Factory for legacy content records.
///
/// Legacy records are not file-backed; the payload is assembled from the
/// record's own fields without any repository I/O. Documents referencing
/// the record arrive through the dependency context and are listed in a
/// `references` field so they stay searchable alongside it.
pub struct LegacyContentFactory {
    /// Legacy content type ids this factory accepts
    content_types: Vec<u32>,
}

impl LegacyContentFactory {
    /// Create a factory for the given legacy content type ids.
    #[must_use]
    pub fn new(content_types: &[u32]) -> Self {
        Self {
            content_types: content_types.to_vec(),
        }
    }
}

#[async_trait]
impl DocumentFactory for LegacyContentFactory {
    fn can_produce(&self, type_id: u32, mime: Option<&str>) -> bool {
        // Legacy content never carries a mime type
        mime.is_none() && self.content_types.contains(&type_id)
    }

    async fn produce(
        &self,
        record: &ResourceRecord,
        context: &DependencyChain,
    ) -> Result<DocumentPayload, ExtractError> {
        let ResourceRecord::Legacy(legacy) = record else {
            return Err(ExtractError::Failed(
                "legacy factory requires a legacy content record".to_string(),
            ));
        };

        let mut payload = DocumentPayload::new()
            .with("title", legacy.title.clone())
            .with("content", legacy.title.clone())
            .with("channel", legacy.channel.display().to_string())
            .with("type", legacy.content_type.to_string());

        let references: Vec<String> = context
            .members
            .iter()
            .filter(|m| m.path != record.path())
            .map(|m| m.path.display().to_string())
            .collect();
        if !references.is_empty() {
            payload.insert("references", references.join(" "));
        }

        Ok(payload)
    }
}
