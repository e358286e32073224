//! The per-session buffer map and its significant-change detector
//! (spec §4.2).

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use paige_protocol::Buffer;
use paige_protocol::ChangeSignificance;
use paige_protocol::classify_change;

/// Per-path significant-change tracking state, alongside the buffer's
/// own content/version.
struct Entry {
    buffer: Buffer,
    last_logged_char_count: usize,
    edit_count_since_last_log: u32,
}

/// Outcome of [`BufferCache::update`]: whether the change crossed the
/// significance threshold and, if so, the counts to log.
pub struct UpdateOutcome {
    pub significance: ChangeSignificance,
    pub previous_char_count: usize,
    pub new_char_count: usize,
}

impl UpdateOutcome {
    pub fn delta(&self) -> i64 {
        self.new_char_count as i64 - self.previous_char_count as i64
    }

    /// Builds the `buffer_significant_change` action payload described in
    /// spec §4.2. Callers should only log this when `significance` is
    /// [`ChangeSignificance::Significant`].
    pub fn significant_change_payload(&self, path: &Path) -> serde_json::Value {
        serde_json::json!({
            "kind": "significant_change",
            "path": path,
            "previousCharCount": self.previous_char_count,
            "newCharCount": self.new_char_count,
            "delta": self.delta(),
        })
    }
}

/// Snapshot used to build a `buffer_summary` action for one dirty path.
pub struct SummarySnapshot {
    pub path: PathBuf,
    pub edit_count: u32,
    pub char_count: usize,
    pub char_delta: i64,
}

/// Maps `path → Buffer` for one session, tracking significant-change
/// state per path (spec §4.2).
#[derive(Default)]
pub struct BufferCache {
    entries: Mutex<HashMap<PathBuf, Entry>>,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a full-content update, returning whether this crossed the
    /// significant-change threshold.
    pub fn update(&self, path: &Path, content: String) -> UpdateOutcome {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let new_len = content.chars().count();

        let entry = entries.entry(path.to_path_buf()).or_insert_with(|| Entry {
            buffer: Buffer::new(path.to_path_buf(), String::new()),
            last_logged_char_count: 0,
            edit_count_since_last_log: 0,
        });

        entry.buffer.apply_update(content);
        entry.edit_count_since_last_log += 1;

        let previous = entry.last_logged_char_count;
        let significance = classify_change(previous, new_len);
        if significance == ChangeSignificance::Significant {
            entry.last_logged_char_count = new_len;
            entry.edit_count_since_last_log = 0;
        }

        UpdateOutcome {
            significance,
            previous_char_count: previous,
            new_char_count: new_len,
        }
    }

    pub fn get(&self, path: &Path) -> Option<Buffer> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(path).map(|e| e.buffer.clone())
    }

    pub fn clear(&self, path: &Path) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(path);
    }

    pub fn clear_all(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Paths with at least one edit since their last summary or
    /// significant-change reset.
    pub fn dirty_paths(&self) -> Vec<PathBuf> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|(_, e)| e.edit_count_since_last_log > 0)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Builds the periodic-summary payload for every dirty path, then
    /// resets each path's significant-change state (spec §4.2).
    pub fn drain_summaries(&self) -> Vec<SummarySnapshot> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = Vec::new();
        for (path, entry) in entries.iter_mut() {
            if entry.edit_count_since_last_log == 0 {
                continue;
            }
            let char_count = entry.buffer.content.chars().count();
            let char_delta = char_count as i64 - entry.last_logged_char_count as i64;
            out.push(SummarySnapshot {
                path: path.clone(),
                edit_count: entry.edit_count_since_last_log,
                char_count,
                char_delta,
            });
            entry.last_logged_char_count = char_count;
            entry.edit_count_since_last_log = 0;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_from_empty_is_significant() {
        let cache = BufferCache::new();
        let outcome = cache.update(Path::new("/a.rs"), "fn a() {}".to_string());
        assert_eq!(outcome.significance, ChangeSignificance::Significant);
    }

    #[test]
    fn small_follow_up_edit_is_trivial() {
        let cache = BufferCache::new();
        cache.update(Path::new("/a.rs"), "x".repeat(1000));
        let outcome = cache.update(Path::new("/a.rs"), "x".repeat(1010));
        assert_eq!(outcome.significance, ChangeSignificance::Trivial);
    }

    #[test]
    fn dirty_paths_reports_pending_edits() {
        let cache = BufferCache::new();
        cache.update(Path::new("/a.rs"), "hello".to_string());
        assert_eq!(cache.dirty_paths(), vec![PathBuf::from("/a.rs")]);
    }

    #[test]
    fn drain_summaries_resets_edit_counts() {
        let cache = BufferCache::new();
        cache.update(Path::new("/a.rs"), "x".repeat(100));
        cache.update(Path::new("/a.rs"), "x".repeat(110));
        let summaries = cache.drain_summaries();
        assert_eq!(summaries.len(), 1);
        assert!(cache.dirty_paths().is_empty());
    }

    #[test]
    fn clear_removes_path() {
        let cache = BufferCache::new();
        cache.update(Path::new("/a.rs"), "x".to_string());
        cache.clear(Path::new("/a.rs"));
        assert!(cache.get(Path::new("/a.rs")).is_none());
    }
}
