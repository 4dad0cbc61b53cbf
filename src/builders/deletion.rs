use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::builders::manifest::{MANIFEST_FILE_NAME, UPDATE_IGNORE_FILE};
use crate::core::git::GitClient;
use crate::core::patterns;
use crate::core::resolver::RELEASE_SCRIPT_NAME;

/// Fixed name of the deletion list inside a ghost root.
pub const DELETE_LIST_NAME: &str = "delete.txt";

/// Release artifacts and tooling that must never be listed for deletion,
/// regardless of ignore rules or accumulated history.
const ALWAYS_EXCLUDE: [&str; 3] = [MANIFEST_FILE_NAME, DELETE_LIST_NAME, RELEASE_SCRIPT_NAME];

/// Reconciles the cumulative deletion list and writes it to `output`,
/// returning the sorted list of paths.
///
/// Three snapshots are combined:
///
/// 1. `accumulated`: entries already present in the existing output file
///    (deletion history from previous releases), if any.
/// 2. `newly_deleted`: files recorded at `prev_ref` that no longer exist in
///    the working tree, when a ref is given. An unresolvable ref only prints
///    a warning; the delta is treated as empty.
/// 3. `current`: the authoritative working-tree listing. This one is fatal
///    on failure: there is no safe walk fallback, because an incomplete
///    current-tree view would mark live files as deleted.
///
/// The result is `(accumulated ∪ newly_deleted)` minus the fixed exclusions,
/// minus everything that exists in `current` (a file that exists again must
/// not be deleted by clients), minus anything the `.updateignore` rules say
/// was never distributed. With an unchanged tree and no ref the operation is
/// a fixed point: re-running it rewrites an identical file.
pub fn write_delete_list(
    root: &Path,
    output: &Path,
    prev_ref: Option<&str>,
    client: &dyn GitClient,
) -> Result<Vec<String>> {
    let ignore_patterns = patterns::load_patterns(&root.join(UPDATE_IGNORE_FILE))?;

    let mut accumulated: BTreeSet<String> = BTreeSet::new();
    if output.exists() {
        let existing = fs::read_to_string(output)
            .with_context(|| format!("Failed to read existing {}", output.display()))?;
        accumulated.extend(
            existing
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    let current: BTreeSet<String> = client
        .list_working_tree_files()
        .context("Failed to list the current working tree; delete requires an authoritative git view")?
        .into_iter()
        .map(|path| path.replace('\\', "/"))
        .collect();

    let mut newly_deleted: BTreeSet<String> = BTreeSet::new();
    if let Some(reference) = prev_ref {
        match client.list_tree_at_ref(reference) {
            Ok(previous) => {
                newly_deleted = previous
                    .into_iter()
                    .map(|path| path.replace('\\', "/"))
                    .filter(|path| !current.contains(path))
                    .collect();
            }
            Err(err) => {
                println!(
                    "⚠️  Could not resolve ref '{reference}' ({err}); skipping diff against previous release"
                );
            }
        }
    }

    // BTreeSet union keeps the result sorted by relative path.
    let deleted: Vec<String> = accumulated
        .union(&newly_deleted)
        .filter(|rel| !ALWAYS_EXCLUDE.contains(&rel.as_str()))
        .filter(|rel| !current.contains(rel.as_str()))
        .filter(|rel| !patterns::is_ignored(rel, &ignore_patterns))
        .cloned()
        .collect();

    let mut content = deleted.join("\n");
    if !deleted.is_empty() {
        content.push('\n');
    }
    fs::write(output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(deleted)
}
