use ghost_release::builders::{archive, deletion, manifest};
use ghost_release::core::git::Git2Client;
use ghost_release::core::resolver;
use git2::{IndexAddOption, Repository, Signature};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_repo() -> (TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn commit_all(repo: &Repository, message: &str) -> String {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("tester", "tester@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
        .to_string()
}

#[test]
fn test_dau_manifest_is_byte_exact() {
    // No git repository here, so resolution goes through the walk fallback.
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "hello.txt", "hello world");
    write_file(root, "sub/a.txt", "hello\n");
    write_file(root, "notes.bak", "scratch");
    write_file(root, ".updateignore", ".updateignore\n*.bak\n");

    let output = root.join("updates2.dau");
    let count = manifest::write_manifest(root, &output).unwrap();
    assert_eq!(count, 2);

    // SOH field separators, CRLF terminators, lowercase MD5, exact sizes,
    // and the charset tag on the first record only.
    let bytes = fs::read(&output).unwrap();
    let expected: &[u8] = b"hello.txt\x015eb63bbbe01eeed093cb22bb8f5acdc3\x01size=11\x01charset=UTF-8\r\n\
sub/a.txt\x01b1946ac92492d2347c6235b4d2611184\x01size=6\r\n";
    assert_eq!(bytes, expected);
}

#[test]
fn test_dau_never_lists_itself_and_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "dict.txt", "OnBoot");

    let output = root.join("updates2.dau");
    manifest::write_manifest(root, &output).unwrap();
    let first_run = fs::read(&output).unwrap();

    // The manifest from the first run is now sitting in the tree; it must
    // not show up as an entry in the second run.
    let count = manifest::write_manifest(root, &output).unwrap();
    let second_run = fs::read(&output).unwrap();

    assert_eq!(count, 1);
    assert_eq!(first_run, second_run);
    assert!(!String::from_utf8_lossy(&second_run).contains("updates2.dau"));
}

#[test]
fn test_dau_empty_root_writes_empty_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("updates2.dau");

    let count = manifest::write_manifest(dir.path(), &output).unwrap();

    assert_eq!(count, 0);
    assert!(output.exists());
    assert!(fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_resolver_honours_gitignore_through_git_listing() {
    let (td, _repo) = setup_test_repo();
    let root = td.path();
    write_file(root, "dict.txt", "OnBoot");
    write_file(root, "debug.log", "noise");
    write_file(root, ".gitignore", "*.log\n");

    let entries = resolver::collect_files(root, &[]).unwrap();
    let rel_paths: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();

    // git's own exclude rules applied, .git contents never listed.
    assert_eq!(rel_paths, vec![".gitignore", "dict.txt"]);
}

#[test]
fn test_delete_full_cycle_with_prev_ref() {
    let (td, repo) = setup_test_repo();
    let root = td.path();
    write_file(root, "a.txt", "a");
    write_file(root, "b.txt", "b");
    let first_release = commit_all(&repo, "first release");

    // a.txt leaves the distribution.
    fs::remove_file(root.join("a.txt")).unwrap();
    let mut index = repo.index().unwrap();
    index.remove_path(Path::new("a.txt")).unwrap();
    index.write().unwrap();
    commit_all(&repo, "drop a.txt");

    let output = root.join("delete.txt");
    let client = Git2Client::open(root).unwrap();
    let deleted =
        deletion::write_delete_list(root, &output, Some(&first_release), &client).unwrap();
    assert_eq!(deleted, vec!["a.txt".to_string()]);
    assert_eq!(fs::read_to_string(&output).unwrap(), "a.txt\n");

    // Idempotence: an unchanged tree and no ref reproduce the same file.
    let again = deletion::write_delete_list(root, &output, None, &client).unwrap();
    assert_eq!(again, vec!["a.txt".to_string()]);
    assert_eq!(fs::read_to_string(&output).unwrap(), "a.txt\n");

    // Re-inclusion: a.txt comes back (untracked is enough), so it drops out
    // of the list even though the accumulated file still names it.
    write_file(root, "a.txt", "a is back");
    let after_return = deletion::write_delete_list(root, &output, None, &client).unwrap();
    assert!(after_return.is_empty());
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_delete_accumulates_across_runs() {
    let (td, repo) = setup_test_repo();
    let root = td.path();
    write_file(root, "keep.txt", "k");
    commit_all(&repo, "init");

    // History from an earlier release cycle.
    let output = root.join("delete.txt");
    fs::write(&output, "long_gone.txt\n").unwrap();

    let client = Git2Client::open(root).unwrap();
    let deleted = deletion::write_delete_list(root, &output, None, &client).unwrap();

    // Nothing new was deleted, the old entry survives.
    assert_eq!(deleted, vec!["long_gone.txt".to_string()]);
}

#[test]
fn test_nar_contains_resolved_files_and_prior_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "ghost/master/dict.txt", "OnBoot: hello");
    write_file(root, "readme.txt", "a ghost");
    write_file(root, "art/master.psd", "layers");
    write_file(root, ".narignore", ".narignore\n*.psd\n");

    // A manifest generated beforehand is bundled automatically: nar does not
    // exclude updates2.dau.
    manifest::write_manifest(root, &root.join("updates2.dau")).unwrap();

    let output = root.join("the_hand.nar");
    let count = archive::write_archive(root, &output).unwrap();
    assert_eq!(count, 3);

    let mut zip = zip::ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(|n| n.to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "ghost/master/dict.txt".to_string(),
            "readme.txt".to_string(),
            "updates2.dau".to_string(),
        ]
    );

    let mut entry = zip.by_name("ghost/master/dict.txt").unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    assert_eq!(content, "OnBoot: hello");
}
