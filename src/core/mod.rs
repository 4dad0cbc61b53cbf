// This file is the module declaration file for the `core` module.
// It declares and makes public the submodules that form the file-set
// resolution engine shared by every subcommand.

// `git` module:
// Defines the narrow `GitClient` trait (working-tree listing, historical
// tree listing) and its `Git2Client` implementation over libgit2. Keeping
// the collaborator behind a trait lets the deletion reconciler be tested
// against a stub instead of a real repository.
pub mod git;

// `patterns` module:
// The gitignore-syntax rule model: the `PatternKind` enum and
// `IgnorePattern` struct, the ignore-file loader, and the `is_ignored`
// first-match-wins check used by the resolver and the deletion reconciler.
pub mod patterns;

// `resolver` module:
// Resolves the authoritative, sorted, exclusion-filtered file set under a
// ghost root: git listing when available, with a recursive directory walk as the
// fallback.
pub mod resolver;
