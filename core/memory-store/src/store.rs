//! The [`MemoryStore`] trait and its in-process implementations.
//!
//! The real backend (a persistent vector store with an embedding model
//! in front of it) is an out-of-scope collaborator; this crate owns the
//! interface, the ID/metadata scheme, and a usable in-process store for
//! tests and for deployments with no embedding backend configured.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use paige_error::PaigeError;

use crate::types::MemoryHit;
use crate::types::MemoryInput;
use crate::types::MemoryMetadata;
use crate::types::flatten_tags;
use crate::types::memory_id;

/// Put/query interface over a vector store for session summaries
/// (spec §4.5).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Stores `items`, assigning each a `mem_{sessionId}_{index}` ID.
    /// Returns the assigned IDs in input order.
    async fn add_memories(
        &self,
        items: Vec<MemoryInput>,
        session_id: u64,
        project: &str,
    ) -> Result<Vec<String>, PaigeError>;

    /// Returns up to `n_results` hits, sorted ascending by distance. When
    /// `project` is set, results are restricted to that project.
    async fn query(
        &self,
        query_text: &str,
        n_results: usize,
        project: Option<&str>,
    ) -> Result<Vec<MemoryHit>, PaigeError>;
}

struct StoredMemory {
    content: String,
    metadata: MemoryMetadata,
}

/// In-process [`MemoryStore`]. Distance is a lexical Jaccard overlap
/// between the query and stored content, a stand-in for the real
/// embedding-based distance metric the external backend would compute.
#[derive(Default)]
pub struct InMemoryMemoryStore {
    memories: Mutex<HashMap<String, StoredMemory>>,
    next_index: Mutex<HashMap<u64, u64>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_index_for(&self, session_id: u64) -> u64 {
        let mut counters = self
            .next_index
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = counters.entry(session_id).or_insert(0);
        let index = *entry;
        *entry += 1;
        index
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn add_memories(
        &self,
        items: Vec<MemoryInput>,
        session_id: u64,
        project: &str,
    ) -> Result<Vec<String>, PaigeError> {
        let mut ids = Vec::with_capacity(items.len());
        let mut memories = self
            .memories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for item in items {
            let index = self.next_index_for(session_id);
            let id = memory_id(session_id, index);
            let metadata = MemoryMetadata {
                session_id,
                project: project.to_string(),
                created_at: Utc::now(),
                importance: item.importance,
                tags: flatten_tags(&item.tags),
            };
            memories.insert(
                id.clone(),
                StoredMemory {
                    content: item.content,
                    metadata,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    async fn query(
        &self,
        query_text: &str,
        n_results: usize,
        project: Option<&str>,
    ) -> Result<Vec<MemoryHit>, PaigeError> {
        let memories = self
            .memories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let query_tokens = tokenize(query_text);

        let mut hits: Vec<MemoryHit> = memories
            .iter()
            .filter(|(_, mem)| match project {
                Some(p) => mem.metadata.project == p,
                None => true,
            })
            .map(|(id, mem)| MemoryHit {
                id: id.clone(),
                content: mem.content.clone(),
                distance: jaccard_distance(&query_tokens, &tokenize(&mem.content)),
                metadata: mem.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(n_results);
        Ok(hits)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

fn jaccard_distance(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;
    let set_a: HashSet<&String> = a.iter().collect();
    let set_b: HashSet<&String> = b.iter().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    1.0 - (intersection as f64 / union as f64)
}

/// Degraded implementation used when no embedding backend is configured
/// (spec §6 pattern, mirrored from [`paige_model_client::NoopModelClient`]):
/// writes are accepted and IDs assigned, but nothing is retrievable.
#[derive(Default)]
pub struct NoopMemoryStore {
    next_index: Mutex<HashMap<u64, u64>>,
}

impl NoopMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for NoopMemoryStore {
    async fn add_memories(
        &self,
        items: Vec<MemoryInput>,
        session_id: u64,
        _project: &str,
    ) -> Result<Vec<String>, PaigeError> {
        tracing::debug!(
            session_id,
            count = items.len(),
            "memory store degraded: no embedding backend configured"
        );
        let mut counters = self
            .next_index
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = counters.entry(session_id).or_insert(0);
        let ids = (0..items.len() as u64)
            .map(|i| memory_id(session_id, *entry + i))
            .collect();
        *entry += items.len() as u64;
        Ok(ids)
    }

    async fn query(
        &self,
        _query_text: &str,
        _n_results: usize,
        _project: Option<&str>,
    ) -> Result<Vec<MemoryHit>, PaigeError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;
