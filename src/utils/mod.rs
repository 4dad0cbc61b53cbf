use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::builders::{archive, deletion, manifest};
use crate::core::git::Git2Client;

/// Entry point for the `dau` subcommand.
pub fn generate_manifest(root: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| root.join(manifest::MANIFEST_FILE_NAME));
    let count = manifest::write_manifest(root, &output)?;
    println!("✓ Generated {} ({} files)", output.display(), count);
    Ok(())
}

/// Entry point for the `nar` subcommand.
pub fn create_archive(root: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| default_archive_path(root));
    let count = archive::write_archive(root, &output)?;
    println!("✓ Created {} ({} files)", output.display(), count);
    Ok(())
}

/// Entry point for the `delete` subcommand.
///
/// Unlike manifest/archive generation there is no walk fallback here: the
/// repository must open, because deletion correctness depends on an
/// authoritative current-tree view.
pub fn generate_delete_list(
    root: &Path,
    output: Option<PathBuf>,
    prev_ref: Option<&str>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| root.join(deletion::DELETE_LIST_NAME));
    let client = Git2Client::open(root)
        .context("delete requires a git repository at the ghost root")?;
    let deleted = deletion::write_delete_list(root, &output, prev_ref, &client)?;

    println!(
        "✓ Generated {} ({} files to delete)",
        output.display(),
        deleted.len()
    );
    for rel in &deleted {
        println!("  Delete: {rel}");
    }
    Ok(())
}

/// Default archive name: the ghost directory's own name with a .nar
/// extension, placed inside the root.
fn default_archive_path(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ghost".to_string());
    root.join(format!("{name}.nar"))
}
