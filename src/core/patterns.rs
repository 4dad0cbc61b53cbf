use anyhow::{Context, Result};
use glob::Pattern;
use std::fmt;
use std::path::Path;

/// An enum that defines the three shapes of ignore rule supported by the
/// `.updateignore` / `.narignore` files.
///
/// The shapes follow gitignore conventions: a trailing slash marks a directory
/// rule, an internal slash anchors the rule to the full relative path, and a
/// bare name matches against the final path segment only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `build/`: matches if any ancestor path segment of the relative path
    /// glob-matches the pattern (with the trailing slash stripped).
    Directory,
    /// `shell/master/thumbnail.png`: matched against the entire relative
    /// path. A single leading `/` is stripped before matching.
    Anchored,
    /// `*.psd`: matched against the basename only, regardless of directory.
    Filename,
}

/// A single compiled ignore rule.
///
/// The raw line is kept alongside the compiled glob so that diagnostics and
/// `Display` output show exactly what the user wrote.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    /// The rule line exactly as it appeared in the ignore file.
    pub raw: String,
    kind: PatternKind,
    matcher: Pattern,
}

impl fmt::Display for IgnorePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl IgnorePattern {
    /// Compiles a single ignore-file line into a rule.
    ///
    /// Returns `None` when the glob does not compile (e.g. an unclosed `[`);
    /// such lines are skipped rather than failing the whole load, since the
    /// reference shell-glob matcher cannot reject them either way.
    pub fn parse(line: &str) -> Option<Self> {
        let (kind, glob_src) = if let Some(stripped) = line.strip_suffix('/') {
            (PatternKind::Directory, stripped)
        } else if line.contains('/') {
            (PatternKind::Anchored, line.strip_prefix('/').unwrap_or(line))
        } else {
            (PatternKind::Filename, line)
        };

        let matcher = Pattern::new(glob_src).ok()?;
        Some(Self {
            raw: line.to_string(),
            kind,
            matcher,
        })
    }

    #[cfg(test)]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Checks a forward-slash relative path against this rule.
    pub fn matches(&self, rel_path: &str) -> bool {
        match self.kind {
            PatternKind::Directory => {
                // Ancestor segments only; a file whose *basename* matches a
                // directory rule is not ignored.
                let mut segments = rel_path.split('/').collect::<Vec<_>>();
                segments.pop();
                segments.iter().any(|segment| self.matcher.matches(segment))
            }
            PatternKind::Anchored => self.matcher.matches(rel_path),
            PatternKind::Filename => {
                let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
                self.matcher.matches(basename)
            }
        }
    }
}

/// Checks a relative path against an ordered rule list.
///
/// Matching is a flat OR: the first rule that matches short-circuits to
/// "ignored". There is no negation support and rule order never changes the
/// outcome, only which rule reports the match first.
pub fn is_ignored(rel_path: &str, patterns: &[IgnorePattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches(rel_path))
}

/// Loads an ignore file (`.updateignore` or `.narignore`) into an ordered
/// rule list.
///
/// A missing file is not an error; it simply means no rules. Blank lines and
/// lines whose first non-whitespace character is `#` are dropped; the order
/// of the remaining lines is preserved as written.
pub fn load_patterns(path: &Path) -> Result<Vec<IgnorePattern>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ignore file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(IgnorePattern::parse)
        .collect())
}
