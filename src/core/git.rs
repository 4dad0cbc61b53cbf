use anyhow::Result;
use git2::{ObjectType, Repository, Status, StatusOptions, TreeWalkMode, TreeWalkResult};
use std::collections::BTreeSet;
use std::path::Path;
use std::str;

/// Trait defining the git operations required by the release tooling.
/// This abstraction allows for easier testing and decoupling from specific git implementations.
pub trait GitClient {
    /// Returns the full working-tree file set: every tracked file plus every
    /// untracked file that git's own ignore rules do not exclude. This is the
    /// in-process equivalent of `git ls-files --cached --others --exclude-standard`.
    fn list_working_tree_files(&self) -> Result<Vec<String>>;

    /// Returns every file path recorded at an arbitrary historical ref
    /// (a tag, branch, or commit SHA), the equivalent of
    /// `git ls-tree -r --name-only <ref>`.
    fn list_tree_at_ref(&self, reference: &str) -> Result<Vec<String>>;
}

/// Concrete implementation of GitClient using the git2 crate.
pub struct Git2Client {
    repo: Repository,
}

impl Git2Client {
    /// Opens the repository rooted at the ghost directory. Any failure here
    /// means git is unavailable for this root; callers decide whether that is
    /// recoverable (dau/nar fall back to a directory walk) or fatal (delete).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path)?;
        Ok(Self { repo })
    }
}

impl GitClient for Git2Client {
    fn list_working_tree_files(&self) -> Result<Vec<String>> {
        // BTreeSet both deduplicates (a path can be in the index and carry a
        // worktree status) and yields the listing already sorted.
        let mut files = BTreeSet::new();

        let index = self.repo.index()?;
        for i in 0..index.len() {
            if let Some(entry) = index.get(i)
                && let Ok(path_str) = str::from_utf8(&entry.path)
            {
                files.insert(path_str.to_string());
            }
        }

        // Untracked files, honouring .gitignore. `recurse_untracked_dirs`
        // expands untracked directories into their individual files, matching
        // the per-file output of `git ls-files --others`.
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .exclude_submodules(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        for entry in statuses.iter() {
            if entry.status().contains(Status::WT_NEW)
                && let Some(path) = entry.path()
            {
                files.insert(path.to_string());
            }
        }

        Ok(files.into_iter().collect())
    }

    fn list_tree_at_ref(&self, reference: &str) -> Result<Vec<String>> {
        let object = self.repo.revparse_single(reference)?;
        let tree = object.peel_to_tree()?;

        let mut files = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                files.push(format!("{dir}{name}"));
            }
            TreeWalkResult::Ok
        })?;

        Ok(files)
    }
}
