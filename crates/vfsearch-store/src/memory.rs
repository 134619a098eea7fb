//! In-memory index writer for testing without tantivy.
//!
//! This module provides a [`MemoryIndexWriter`] that records every writer
//! call in an operation log. It's useful for:
//! - Asserting exact call sequences (idempotence, commit batching)
//! - Dry runs that show what a rebuild would write
//! - Unit tests that don't need a real index on disk

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;
use vfsearch_core::{DocumentPayload, IndexWriter, WriterError};

/// One recorded writer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Update {
        path: PathBuf,
        payload: DocumentPayload,
    },
    Delete {
        path: PathBuf,
    },
    Commit,
    Optimize,
    Close,
}

#[derive(Default)]
struct State {
    documents: HashMap<PathBuf, DocumentPayload>,
    ops: Vec<WriteOp>,
    fail_commits: bool,
    closed: bool,
}

/// In-memory index writer recording an operation log.
#[derive(Default)]
pub struct MemoryIndexWriter {
    state: RwLock<State>,
}

impl MemoryIndexWriter {
    /// Create a new empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `commit` fail with an I/O-style error.
    pub async fn fail_commits(&self, fail: bool) {
        self.state.write().await.fail_commits = fail;
    }

    /// Snapshot of the operation log.
    pub async fn ops(&self) -> Vec<WriteOp> {
        self.state.read().await.ops.clone()
    }

    /// Number of commits recorded so far.
    pub async fn commit_count(&self) -> usize {
        self.state
            .read()
            .await
            .ops
            .iter()
            .filter(|op| matches!(op, WriteOp::Commit))
            .count()
    }

    /// The document currently stored under `path`, if any.
    pub async fn document(&self, path: &Path) -> Option<DocumentPayload> {
        self.state.read().await.documents.get(path).cloned()
    }

    /// Number of stored documents.
    pub async fn doc_count(&self) -> usize {
        self.state.read().await.documents.len()
    }

    fn ensure_open(state: &State, what: &str) -> Result<(), WriterError> {
        if state.closed {
            return Err(WriterError::Close(format!("{what} after close")));
        }
        Ok(())
    }
}

#[async_trait]
impl IndexWriter for MemoryIndexWriter {
    async fn update_document(
        &self,
        path: &Path,
        payload: &DocumentPayload,
    ) -> Result<(), WriterError> {
        let mut state = self.state.write().await;
        Self::ensure_open(&state, "update_document")?;
        // Upsert: the insert replaces any entry with the exact same path
        state.documents.insert(path.to_path_buf(), payload.clone());
        state.ops.push(WriteOp::Update {
            path: path.to_path_buf(),
            payload: payload.clone(),
        });
        debug!("upserted {:?}", path);
        Ok(())
    }

    async fn delete_documents(&self, path: &Path) -> Result<(), WriterError> {
        let mut state = self.state.write().await;
        Self::ensure_open(&state, "delete_documents")?;
        state.documents.remove(path);
        state.ops.push(WriteOp::Delete {
            path: path.to_path_buf(),
        });
        debug!("deleted {:?}", path);
        Ok(())
    }

    async fn commit(&self) -> Result<(), WriterError> {
        let mut state = self.state.write().await;
        Self::ensure_open(&state, "commit")?;
        if state.fail_commits {
            return Err(WriterError::Commit("injected commit failure".to_string()));
        }
        state.ops.push(WriteOp::Commit);
        Ok(())
    }

    async fn optimize(&self) -> Result<(), WriterError> {
        let mut state = self.state.write().await;
        Self::ensure_open(&state, "optimize")?;
        state.ops.push(WriteOp::Optimize);
        Ok(())
    }

    async fn close(&self) -> Result<(), WriterError> {
        let mut state = self.state.write().await;
        Self::ensure_open(&state, "close")?;
        state.ops.push(WriteOp::Close);
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(content: &str) -> DocumentPayload {
        DocumentPayload::new().with("content", content)
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_path() {
        let writer = MemoryIndexWriter::new();
        let path = PathBuf::from("/site/a.txt");

        writer.update_document(&path, &payload("v1")).await.unwrap();
        writer.update_document(&path, &payload("v2")).await.unwrap();

        assert_eq!(writer.doc_count().await, 1);
        assert_eq!(
            writer.document(&path).await.unwrap().get("content"),
            Some("v2")
        );
        // Both calls are still visible in the op log
        assert_eq!(writer.ops().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_exact_path_only() {
        let writer = MemoryIndexWriter::new();
        writer
            .update_document(Path::new("/site/a.txt"), &payload("a"))
            .await
            .unwrap();
        writer
            .update_document(Path::new("/site/a.txt.bak"), &payload("b"))
            .await
            .unwrap();

        writer.delete_documents(Path::new("/site/a.txt")).await.unwrap();

        assert!(writer.document(Path::new("/site/a.txt")).await.is_none());
        // Not a prefix delete
        assert!(writer.document(Path::new("/site/a.txt.bak")).await.is_some());
    }

    #[tokio::test]
    async fn test_commit_failure_injection() {
        let writer = MemoryIndexWriter::new();
        writer.fail_commits(true).await;
        assert!(matches!(
            writer.commit().await,
            Err(WriterError::Commit(_))
        ));

        writer.fail_commits(false).await;
        writer.commit().await.unwrap();
        assert_eq!(writer.commit_count().await, 1);
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let writer = MemoryIndexWriter::new();
        writer.close().await.unwrap();
        assert!(writer
            .update_document(Path::new("/x"), &payload("x"))
            .await
            .is_err());
        assert!(writer.commit().await.is_err());
    }
}
