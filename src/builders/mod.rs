// This file is the module declaration file for the `builders` module.
// It declares and makes public the sub-modules that each produce one of the
// three release artifacts from a resolved file set.

// `archive` module:
// Writes the .nar distribution archive, a ZIP container (DEFLATE) with a
// renamed extension, containing every resolved file at its relative path.
pub mod archive;

// `deletion` module:
// Reconciles the cumulative delete.txt: accumulated history plus files
// removed since a previous release ref, pruned against the current working
// tree and the ignore rules.
pub mod deletion;

// `manifest` module:
// Generates the updates2.dau update manifest in the byte-exact SSP format:
// SOH-separated fields (path, MD5 digest, size), CRLF line endings, and a
// charset annotation on the first record only.
pub mod manifest;
