use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::core::patterns::{self, IgnorePattern};
use crate::core::resolver::{self, FileEntry};

/// Fixed name of the update manifest inside a ghost root. The SSP update
/// protocol looks this file up by name, so it is not configurable.
pub const MANIFEST_FILE_NAME: &str = "updates2.dau";

/// Ignore file consulted for both the manifest and the deletion list.
pub const UPDATE_IGNORE_FILE: &str = ".updateignore";

const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// Generates the updates2.dau manifest for a ghost root and returns the
/// number of files written.
///
/// The record format is fixed by the SSP update-file specification and must
/// stay byte-exact: per file one line of SOH-separated (0x01) fields
/// (relative path, lowercase MD5 hex digest, `size=<bytes>`), each record
/// terminated by CRLF and written in binary mode. The first record alone
/// carries a fourth `charset=UTF-8` field. Zero resolved files still produce
/// the (empty) output file.
pub fn write_manifest(root: &Path, output: &Path) -> Result<usize> {
    let mut patterns = patterns::load_patterns(&root.join(UPDATE_IGNORE_FILE))?;
    // The manifest must never list itself, even when a prior run left one
    // behind. The fixed name is used, matching the protocol-side lookup.
    if let Some(self_rule) = IgnorePattern::parse(MANIFEST_FILE_NAME) {
        patterns.push(self_rule);
    }

    let files = resolver::collect_files(root, &patterns)?;

    let mut out = File::create(output)
        .with_context(|| format!("Failed to create manifest {}", output.display()))?;
    for (i, entry) in files.iter().enumerate() {
        let record = manifest_record(entry, i == 0)?;
        out.write_all(&record)
            .with_context(|| format!("Failed to write manifest {}", output.display()))?;
    }

    Ok(files.len())
}

fn manifest_record(entry: &FileEntry, first: bool) -> Result<Vec<u8>> {
    let size = entry
        .abs_path
        .metadata()
        .with_context(|| format!("Failed to stat {}", entry.abs_path.display()))?
        .len();

    let mut fields = vec![
        entry.rel_path.clone(),
        md5_hex(&entry.abs_path)?,
        format!("size={size}"),
    ];
    if first {
        fields.push("charset=UTF-8".to_string());
    }

    let mut record = fields.join("\x01").into_bytes();
    record.extend_from_slice(b"\r\n");
    Ok(record)
}

/// Streams a file through MD5 in 64 KiB chunks. The .dau format mandates MD5
/// for content digests.
fn md5_hex(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut hasher = Md5::new();
    let mut buffer = [0u8; DIGEST_CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
