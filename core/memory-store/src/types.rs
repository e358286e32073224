//! Wire types for the memory store collaborator interface (spec §4.5).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Importance tier attached to a reflected memory item (spec §4.Reflect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceTier {
    Low,
    Medium,
    High,
}

/// One item passed to [`crate::MemoryStore::add_memories`].
#[derive(Debug, Clone)]
pub struct MemoryInput {
    pub content: String,
    pub tags: Vec<String>,
    pub importance: ImportanceTier,
}

impl MemoryInput {
    pub fn new(content: impl Into<String>, tags: Vec<String>, importance: ImportanceTier) -> Self {
        Self {
            content: content.into(),
            tags,
            importance,
        }
    }
}

/// Metadata stored alongside each memory document (spec §4.5). Tags are
/// flattened to a single comma-joined string for the underlying
/// document store's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub session_id: u64,
    pub project: String,
    pub created_at: DateTime<Utc>,
    pub importance: ImportanceTier,
    pub tags: String,
}

/// One result row from [`crate::MemoryStore::query`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: String,
    pub content: String,
    pub distance: f64,
    pub metadata: MemoryMetadata,
}

/// Builds the `mem_{sessionId}_{index}` ID format (spec §4.5).
pub fn memory_id(session_id: u64, index: u64) -> String {
    format!("mem_{session_id}_{index}")
}

/// Flattens tags into the `"a,b,c"` wire format (spec §4.5).
pub fn flatten_tags(tags: &[String]) -> String {
    tags.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_id_matches_expected_format() {
        assert_eq!(memory_id(42, 0), "mem_42_0");
    }

    #[test]
    fn flatten_tags_joins_with_comma() {
        assert_eq!(
            flatten_tags(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "a,b,c"
        );
    }
}
