//! In-memory document store
//!
//! Documents live for the lifetime of the process. There is no eviction, so
//! memory grows with every upload.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use shared_types::StoredDocument;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Characters of document text that feed the legacy id hash
const LEGACY_HASH_CHARS: usize = 1000;

/// How document ids are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IdScheme {
    /// `doc_<timestamp>_<uuid>`
    #[default]
    Uuid,
    /// `doc_<timestamp>_<hash % 10000>`; two uploads in the same second can collide
    Legacy,
}

impl IdScheme {
    pub fn generate(&self, text: &str, now: DateTime<Utc>) -> String {
        let stamp = now.format("%Y%m%d_%H%M%S");
        match self {
            IdScheme::Uuid => format!("doc_{}_{}", stamp, Uuid::new_v4().simple()),
            IdScheme::Legacy => format!("doc_{}_{}", stamp, legacy_hash(text)),
        }
    }
}

fn legacy_hash(text: &str) -> u64 {
    let head: String = text.chars().take(LEGACY_HASH_CHARS).collect();
    let digest = Sha256::digest(head.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes) % 10_000
}

/// Shared handle to the document map
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<HashMap<String, Arc<StoredDocument>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, returning whatever previously held its id
    pub async fn insert(&self, document: Arc<StoredDocument>) -> Option<Arc<StoredDocument>> {
        let id = document.id.clone();
        let previous = self.documents.write().await.insert(id.clone(), document);
        if previous.is_some() {
            warn!(document_id = %id, "Document id collision, replaced earlier document");
        }
        previous
    }

    pub async fn get(&self, id: &str) -> Option<Arc<StoredDocument>> {
        self.documents.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<StoredDocument>> {
        self.documents.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// All ids, oldest upload first
    pub async fn ids(&self) -> Vec<String> {
        let documents = self.documents.read().await;
        let mut entries: Vec<_> = documents
            .values()
            .map(|d| (d.uploaded_at, d.id.clone()))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, id)| id).collect()
    }
}
