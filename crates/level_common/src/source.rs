//! Host collaborator interface for reading the corpus.

use crate::error::Result;
use crate::metrics::{DocumentId, DocumentSnapshot};
use async_trait::async_trait;

/// Read access to the tracked documents of a vault
#[async_trait]
pub trait VaultSource: Send + Sync {
    /// Every tracked document in the corpus
    async fn list_documents(&self) -> Result<Vec<DocumentId>>;

    /// Content, metadata and timestamps of one document. An error here skips
    /// the document for this pass only.
    async fn load_document(&self, id: &DocumentId) -> Result<DocumentSnapshot>;
}

#[async_trait]
impl<T: VaultSource + ?Sized> VaultSource for std::sync::Arc<T> {
    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        (**self).list_documents().await
    }

    async fn load_document(&self, id: &DocumentId) -> Result<DocumentSnapshot> {
        (**self).load_document(id).await
    }
}
