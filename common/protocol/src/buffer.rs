//! Editor buffer cache types (spec §3, §4.2).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// A tracked editor buffer, keyed by absolute file path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buffer {
    pub path: PathBuf,
    pub content: String,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Buffer {
    pub fn new(path: PathBuf, content: String) -> Self {
        Self {
            path,
            content,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn apply_update(&mut self, content: String) {
        self.content = content;
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Classification of an edit's magnitude (spec §4.2's significant-change
/// rule), used to decide whether an immediate `buffer_significant_change`
/// action should be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSignificance {
    Trivial,
    Significant,
}

/// Applies the exact significant-change rule from spec §4.2: significant
/// if the buffer went from empty to non-empty, the absolute character
/// delta exceeds 500, or the relative delta exceeds 50% of the previous
/// length.
pub fn classify_change(last_logged_char_count: usize, new_len: usize) -> ChangeSignificance {
    if last_logged_char_count == 0 && new_len > 0 {
        return ChangeSignificance::Significant;
    }
    let delta = last_logged_char_count.abs_diff(new_len);
    if delta > 500 {
        return ChangeSignificance::Significant;
    }
    if last_logged_char_count > 0 && (delta as f64 / last_logged_char_count as f64) > 0.5 {
        return ChangeSignificance::Significant;
    }
    ChangeSignificance::Trivial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_update_bumps_version() {
        let mut buf = Buffer::new(PathBuf::from("/proj/a.rs"), "fn a() {}".to_string());
        buf.apply_update("fn a() { todo!() }".to_string());
        assert_eq!(buf.version, 1);
    }

    #[test]
    fn first_write_from_empty_is_significant() {
        assert_eq!(classify_change(0, 10), ChangeSignificance::Significant);
    }

    #[test]
    fn small_edit_is_trivial() {
        assert_eq!(classify_change(1000, 1050), ChangeSignificance::Trivial);
    }

    #[test]
    fn large_absolute_delta_is_significant() {
        assert_eq!(classify_change(1000, 1600), ChangeSignificance::Significant);
    }

    #[test]
    fn large_relative_delta_is_significant() {
        assert_eq!(classify_change(100, 160), ChangeSignificance::Significant);
    }
}
