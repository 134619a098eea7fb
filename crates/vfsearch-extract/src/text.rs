//! Plain-text document factory for file-backed resources.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use vfsearch_core::{
    DependencyChain, DocumentFactory, DocumentPayload, ExtractError, ResourceRecord,
};

/// Factory for file-backed resources whose content is plain text.
///
/// Reads the file at the record's canonical path and emits a payload with
/// `title`, `content`, `type` and `mime` fields, plus a `variants` field
/// listing the paths of the dependency chain when the resource is indexed
/// in lock-step with siblings.
pub struct PlainTextFactory {
    /// Resource type ids this factory accepts (empty = any file-backed type)
    type_ids: Vec<u32>,
}

impl PlainTextFactory {
    /// Create a factory accepting any file-backed resource type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_ids: Vec::new(),
        }
    }

    /// Create a factory restricted to the given resource type ids.
    #[must_use]
    pub fn for_types(type_ids: &[u32]) -> Self {
        Self {
            type_ids: type_ids.to_vec(),
        }
    }

    fn mime_is_textual(mime: Option<&str>) -> bool {
        match mime {
            Some(m) => {
                m.starts_with("text/")
                    || m == "application/json"
                    || m == "application/xml"
                    || m == "application/toml"
                    || m == "application/yaml"
            }
            // Extensionless files are probed as text
            None => true,
        }
    }
}

impl Default for PlainTextFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentFactory for PlainTextFactory {
    fn can_produce(&self, type_id: u32, mime: Option<&str>) -> bool {
        if !self.type_ids.is_empty() && !self.type_ids.contains(&type_id) {
            return false;
        }
        Self::mime_is_textual(mime)
    }

    async fn produce(
        &self,
        record: &ResourceRecord,
        context: &DependencyChain,
    ) -> Result<DocumentPayload, ExtractError> {
        if !record.is_file_backed() {
            return Err(ExtractError::Failed(
                "plain-text factory requires file-backed content".to_string(),
            ));
        }

        let path = record.path();
        let bytes = fs::read(&path).await?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                return Err(ExtractError::Failed(format!(
                    "{} is not valid UTF-8",
                    path.display()
                )))
            }
        };

        // Empty content yields an empty payload, which the scheduler turns
        // into a defensive delete.
        if text.trim().is_empty() {
            return Ok(DocumentPayload::new());
        }

        let mut payload = DocumentPayload::new()
            .with("title", record.name())
            .with("content", text)
            .with("type", record.type_id().to_string());

        if let Some(mime) = mime_for(&path) {
            payload.insert("mime", mime);
        }

        if context.len() > 1 {
            let variants = context
                .members
                .iter()
                .map(|m| m.path.display().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            payload.insert("variants", variants);
        }

        Ok(payload)
    }
}

fn mime_for(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.to_string())
}
