use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::git::{Git2Client, GitClient};
use crate::core::patterns::{IgnorePattern, is_ignored};

/// The packaging script historically shipped inside ghost roots. It is never
/// part of a release, no matter what the ignore files say.
pub const RELEASE_SCRIPT_NAME: &str = "release_ghost.py";

/// One resolved distribution file: its identity key (forward-slash relative
/// path) paired with where it actually lives on disk.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// Resolves the authoritative file set under a ghost root.
///
/// The primary listing comes from git (tracked plus untracked-but-not-ignored
/// files), which means `.gitignore` exclusions are respected for free. When
/// git is unavailable for the root (no repository, or the listing fails for
/// any reason) a full recursive walk stands in. The failure is never
/// surfaced to the caller; `delete` needs stronger guarantees and talks to
/// the `GitClient` directly instead of going through here.
///
/// Every surviving path is re-verified to be an existing regular file, which
/// guards against stale git listings (an index entry whose file was removed
/// from disk but not yet committed).
pub fn collect_files(root: &Path, patterns: &[IgnorePattern]) -> Result<Vec<FileEntry>> {
    let raw_paths = match git_working_tree(root) {
        Some(paths) => paths,
        None => walk_tree(root),
    };

    let mut entries = Vec::new();
    for raw in raw_paths {
        let rel_path = raw.replace('\\', "/");
        if rel_path.is_empty() || rel_path == RELEASE_SCRIPT_NAME {
            continue;
        }
        if is_ignored(&rel_path, patterns) {
            continue;
        }

        let abs_path = root.join(rel_path.split('/').collect::<PathBuf>());
        if abs_path.is_file() {
            entries.push(FileEntry { rel_path, abs_path });
        }
    }

    // Byte-wise ordering keeps the manifest deterministic across platforms
    // and locales.
    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(entries)
}

fn git_working_tree(root: &Path) -> Option<Vec<String>> {
    // Any git failure at all counts as "unavailable" here: opening the
    // repository and listing it are both allowed to fail silently.
    let client = Git2Client::open(root).ok()?;
    client.list_working_tree_files().ok()
}

fn walk_tree(root: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            let rel_str = rel
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            paths.push(rel_str);
        }
    }
    paths
}
