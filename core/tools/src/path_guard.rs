//! Path containment enforcement for the tool surface (spec §7, §8
//! scenario 4): every tool that accepts a path must refuse anything
//! that resolves outside `PROJECT_DIR`.

use std::path::Path;
use std::path::PathBuf;

use paige_error::PaigeError;

/// Validates that `requested` (interpreted relative to `root` if not
/// absolute) resolves to a path lexically contained in `root`, then
/// returns the resolved absolute path.
///
/// Rejects: NUL bytes, empty strings, `..` segments that escape `root`,
/// absolute paths outside `root`, and symlink targets that escape
/// `root` (the containment check runs against the canonicalized path
/// when the candidate exists on disk).
pub fn validate_path(requested: &str, root: &Path) -> Result<PathBuf, PaigeError> {
    if requested.is_empty() || requested.contains('\0') {
        return Err(PaigeError::InvalidPath);
    }

    let candidate = Path::new(requested);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let lexical = lexically_normalize(&joined);
    let root_normalized = lexically_normalize(root);
    if !lexical.starts_with(&root_normalized) {
        return Err(PaigeError::PathEscapesRoot { path: lexical });
    }

    // Resolve symlinks before the containment check when the path (or
    // its nearest existing ancestor) is actually on disk. A path that
    // does not exist yet (e.g. a file about to be created) has no
    // symlink target to escape through.
    if let Ok(resolved) = lexical.canonicalize() {
        let root_resolved = root
            .canonicalize()
            .unwrap_or_else(|_| root_normalized.clone());
        if !resolved.starts_with(&root_resolved) {
            return Err(PaigeError::PathEscapesRoot { path: resolved });
        }
    }

    Ok(lexical)
}

/// Collapses `.` and `..` segments without touching the filesystem,
/// mirroring what `..` resolution would do on a path that may not
/// exist yet.
fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "path_guard.test.rs"]
mod tests;
