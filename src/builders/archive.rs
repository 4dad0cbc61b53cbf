use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use zip::write::FileOptions;

use crate::core::patterns;
use crate::core::resolver;

/// Ignore file consulted when packing the archive.
pub const NAR_IGNORE_FILE: &str = ".narignore";

/// Packs the resolved file set into a .nar archive (a ZIP container with a
/// renamed extension) and returns the number of entries written.
///
/// Only `.narignore` rules apply here. In particular updates2.dau is *not*
/// implicitly excluded, so a manifest generated beforehand rides along in the
/// archive automatically.
pub fn write_archive(root: &Path, output: &Path) -> Result<usize> {
    let patterns = patterns::load_patterns(&root.join(NAR_IGNORE_FILE))?;
    let files = resolver::collect_files(root, &patterns)?;

    let out = File::create(output)
        .with_context(|| format!("Failed to create archive {}", output.display()))?;
    let mut zip = zip::ZipWriter::new(out);

    for entry in &files {
        let options = FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(entry.rel_path.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", entry.rel_path))?;

        let mut file = File::open(&entry.abs_path)
            .with_context(|| format!("Failed to open {}", entry.abs_path.display()))?;
        io::copy(&mut file, &mut zip)
            .with_context(|| format!("Failed to write {} into archive", entry.rel_path))?;

        println!("  Added: {}", entry.rel_path);
    }

    zip.finish()
        .with_context(|| format!("Failed to finalize archive {}", output.display()))?;
    Ok(files.len())
}
