//! Shared state a tool invocation reads and mutates (spec §4.7).
//!
//! Tools never hold their own state between calls; everything lives
//! here so the registry can hand out `&ToolContext` per call without
//! caring which tool is running.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::broadcast;

use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_protocol::ServerMessage;
use paige_session::SessionRegistry;

/// A highlighted line range, as requested by `highlight_lines`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HighlightRange {
    pub start: u32,
    pub end: u32,
    pub style: String,
}

/// Everything the tool surface needs, shared process-wide. One instance
/// lives for the lifetime of the `app/server` process; tools borrow it
/// per call, they do not own a copy.
pub struct ToolContext {
    pub project_dir: PathBuf,
    pub action_log: Arc<ActionLogStore>,
    pub session_registry: Arc<SessionRegistry>,
    pub buffer_cache: Arc<BufferCache>,
    pub broadcast_tx: broadcast::Sender<ServerMessage>,
    /// Paths the UI has reported open via `open_file`. Tracked here
    /// (rather than in `BufferCache`, which only knows about edited
    /// content) because a file can be open and never edited.
    open_files: Mutex<HashSet<PathBuf>>,
    highlights: Mutex<HashMap<PathBuf, Vec<HighlightRange>>>,
}

impl ToolContext {
    pub fn new(
        project_dir: PathBuf,
        action_log: Arc<ActionLogStore>,
        session_registry: Arc<SessionRegistry>,
        buffer_cache: Arc<BufferCache>,
        broadcast_tx: broadcast::Sender<ServerMessage>,
    ) -> Self {
        Self {
            project_dir,
            action_log,
            session_registry,
            buffer_cache,
            broadcast_tx,
            open_files: Mutex::new(HashSet::new()),
            highlights: Mutex::new(HashMap::new()),
        }
    }

    pub fn mark_open(&self, path: PathBuf) {
        self.lock_open_files().insert(path);
    }

    pub fn open_files(&self) -> Vec<PathBuf> {
        self.lock_open_files().iter().cloned().collect()
    }

    pub fn set_highlights(&self, path: PathBuf, ranges: Vec<HighlightRange>) {
        self.lock_highlights().insert(path, ranges);
    }

    pub fn clear_highlights(&self, path: Option<&PathBuf>) {
        let mut highlights = self.lock_highlights();
        match path {
            Some(p) => {
                highlights.remove(p);
            }
            None => highlights.clear(),
        }
    }

    /// Broadcasts a message to every connected UI client. No receivers
    /// is not an error (e.g. in tests, or between connections).
    pub fn broadcast(&self, message: ServerMessage) {
        let _ = self.broadcast_tx.send(message);
    }

    fn lock_open_files(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        self.open_files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_highlights(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<HighlightRange>>> {
        self.highlights
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
