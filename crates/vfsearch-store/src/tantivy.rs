//! Tantivy-backed index writer.
//!
//! Upserts follow the delete-term-then-add idiom: every document is
//! addressed by its exact canonical path, so deleting the path term before
//! adding makes repeated writes idempotent.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tantivy::schema::{Field, Schema, STORED, STRING, TEXT};
use tantivy::{Index, IndexWriter as TantivyWriter, TantivyDocument, Term};
use tracing::debug;
use vfsearch_core::{DocumentPayload, IndexWriter, WriterError};

/// Writer heap size. Tantivy requires at least 15MB.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Schema fields used by the writer.
#[derive(Clone, Copy)]
struct Fields {
    path: Field,
    key: Field,
    content: Field,
    raw: Field,
}

fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();
    let path = builder.add_text_field("path", STRING | STORED);
    let key = builder.add_text_field("key", STRING | STORED);
    let content = builder.add_text_field("content", TEXT);
    let raw = builder.add_text_field("raw", STORED);
    (builder.build(), Fields { path, key, content, raw })
}

/// Index writer backed by a tantivy index on disk.
pub struct TantivyIndexWriter {
    index: Index,
    writer: Mutex<TantivyWriter>,
    fields: Fields,
}

impl TantivyIndexWriter {
    /// Open or create the index at `dir`.
    pub fn open(dir: &Path) -> Result<Self, WriterError> {
        let (schema, fields) = build_schema();

        let index = if dir.join("meta.json").exists() {
            Index::open_in_dir(dir)
                .map_err(|e| WriterError::Init(format!("open index: {e}")))?
        } else {
            std::fs::create_dir_all(dir)
                .map_err(|e| WriterError::Init(format!("create index dir: {e}")))?;
            Index::create_in_dir(dir, schema)
                .map_err(|e| WriterError::Init(format!("create index: {e}")))?
        };

        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| WriterError::Init(format!("create writer: {e}")))?;

        Ok(Self {
            index,
            writer: Mutex::new(writer),
            fields,
        })
    }

    /// Number of searchable documents (committed state).
    pub fn doc_count(&self) -> Result<u64, WriterError> {
        let reader = self
            .index
            .reader()
            .map_err(|e| WriterError::Init(format!("reader: {e}")))?;
        Ok(reader.searcher().num_docs())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, TantivyWriter>, WriterError> {
        self.writer
            .lock()
            .map_err(|_| WriterError::Init("writer lock poisoned".to_string()))
    }

    fn build_document(&self, path: &Path, payload: &DocumentPayload) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.fields.path, path.display().to_string());
        if let Some(key) = payload.get("key") {
            doc.add_text(self.fields.key, key);
        }
        // All payload values are searchable through the single content field
        let content = payload
            .fields
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        doc.add_text(self.fields.content, content);
        if let Ok(raw) = serde_json::to_string(&payload.fields) {
            doc.add_text(self.fields.raw, raw);
        }
        doc
    }
}

#[async_trait]
impl IndexWriter for TantivyIndexWriter {
    async fn update_document(
        &self,
        path: &Path,
        payload: &DocumentPayload,
    ) -> Result<(), WriterError> {
        let doc = self.build_document(path, payload);
        let writer = self.lock()?;
        let term = Term::from_field_text(self.fields.path, &path.display().to_string());
        writer.delete_term(term);
        writer
            .add_document(doc)
            .map_err(|e| WriterError::Upsert(e.to_string()))?;
        debug!("upserted {:?}", path);
        Ok(())
    }

    async fn delete_documents(&self, path: &Path) -> Result<(), WriterError> {
        let writer = self.lock()?;
        let term = Term::from_field_text(self.fields.path, &path.display().to_string());
        writer.delete_term(term);
        debug!("deleted {:?}", path);
        Ok(())
    }

    async fn commit(&self) -> Result<(), WriterError> {
        let mut writer = self.lock()?;
        writer
            .commit()
            .map_err(|e| WriterError::Commit(e.to_string()))?;
        Ok(())
    }

    async fn optimize(&self) -> Result<(), WriterError> {
        let segments = self
            .index
            .searchable_segment_ids()
            .map_err(|e| WriterError::Optimize(e.to_string()))?;
        if segments.len() < 2 {
            return Ok(());
        }
        let mut writer = self.lock()?;
        writer
            .merge(&segments)
            .wait()
            .map_err(|e| WriterError::Optimize(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), WriterError> {
        let mut writer = self.lock()?;
        writer
            .commit()
            .map_err(|e| WriterError::Close(e.to_string()))?;
        Ok(())
    }
}
