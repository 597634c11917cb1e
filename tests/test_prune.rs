use gitslim::{prune, prune_with, MarkerSet, PruneEvent, PruneOptions, Removal, SlimError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn create_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn exists(root: &Path, rel: &str) -> bool {
    fs::symlink_metadata(root.join(rel)).is_ok()
}

fn gem_tree() -> TempDir {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "lib/extra.rb", "# extra");
    create_file(dir.path(), "test/test_main.rb", "# test");
    dir
}

#[test]
fn removes_files_not_in_allowed_list() {
    let dir = gem_tree();

    let result = prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(exists(dir.path(), "lib/main.rb"));
    assert!(!exists(dir.path(), "lib/extra.rb"));
    assert!(!exists(dir.path(), "test/test_main.rb"));
    assert!(!exists(dir.path(), "test"));
    assert!(exists(dir.path(), "lib"));
    assert_eq!(result.files_removed, 2);
    assert_eq!(result.dirs_removed, 1);
    assert!(result.failures.is_empty());
}

#[test]
fn keeps_ancestor_directories_of_allowed_files() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/foo/bar/baz.rb", "# baz");

    let result = prune(dir.path(), &["lib/foo/bar/baz.rb"]).unwrap();

    for rel in ["lib", "lib/foo", "lib/foo/bar", "lib/foo/bar/baz.rb"] {
        assert!(exists(dir.path(), rel), "{} should survive", rel);
    }
    assert_eq!(result.files_removed, 0);
    assert_eq!(result.bytes_removed, 0);
}

#[test]
fn preserves_marker_files() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "mygem.gemspec", "# gemspec");
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "extra.txt", "extra");

    prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(exists(dir.path(), "mygem.gemspec"));
    assert!(exists(dir.path(), "lib/main.rb"));
    assert!(!exists(dir.path(), "extra.txt"));
}

#[test]
fn marker_survives_empty_allowed_list() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "mygem.gemspec", "# gemspec");
    create_file(dir.path(), "lib/main.rb", "# main");

    let result = prune::<&str>(dir.path(), &[]).unwrap();

    assert!(exists(dir.path(), "mygem.gemspec"));
    assert!(!exists(dir.path(), "lib"));
    assert_eq!(result.files_removed, 1);
}

#[test]
fn nested_gemspecs_are_not_markers() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "vendor/other.gemspec", "# other");

    prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(!exists(dir.path(), "vendor"));
}

#[test]
fn empty_allowed_list_empties_the_root() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "a/b/c/d.txt", "deep");
    fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

    let options = PruneOptions {
        markers: MarkerSet::empty(),
        dry_run: false,
    };
    let result =
        prune_with::<&str>(dir.path(), &[], &options, &mut |_: &PruneEvent<'_>| {}).unwrap();

    assert!(dir.path().is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(result.files_removed, 2);
    // lib, a, a/b, a/b/c, empty, empty/nested
    assert_eq!(result.dirs_removed, 6);
}

#[test]
fn handles_dotfiles() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), ".hidden", "hidden");
    create_file(dir.path(), ".config/settings.yml", "settings");
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "lib/.keep", "");

    prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(!exists(dir.path(), ".hidden"));
    assert!(!exists(dir.path(), ".config"));
    assert!(!exists(dir.path(), "lib/.keep"));
    assert!(exists(dir.path(), "lib/main.rb"));
}

#[test]
fn allowed_dotfiles_survive() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), ".rspec", "--require spec_helper");
    create_file(dir.path(), ".github/workflows/ci.yml", "on: push");

    prune(dir.path(), &[".rspec"]).unwrap();

    assert!(exists(dir.path(), ".rspec"));
    assert!(!exists(dir.path(), ".github"));
}

#[test]
fn handles_deeply_nested_structures() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "a/b/c/d/e/f.rb", "# deep");
    create_file(dir.path(), "a/b/x/y.rb", "# another");

    prune(dir.path(), &["a/b/c/d/e/f.rb"]).unwrap();

    assert!(exists(dir.path(), "a/b/c/d/e/f.rb"));
    assert!(!exists(dir.path(), "a/b/x"));
}

#[test]
fn handles_multiple_allowed_files() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/a.rb", "# a");
    create_file(dir.path(), "lib/b.rb", "# b");
    create_file(dir.path(), "bin/exec", "# exec");
    create_file(dir.path(), "test/test.rb", "# test");

    prune(dir.path(), &["lib/a.rb", "bin/exec"]).unwrap();

    assert!(exists(dir.path(), "lib/a.rb"));
    assert!(!exists(dir.path(), "lib/b.rb"));
    assert!(exists(dir.path(), "bin/exec"));
    assert!(!exists(dir.path(), "test"));
}

#[test]
fn allowed_paths_are_normalized() {
    let dir = gem_tree();

    prune(dir.path(), &["./lib/../lib/main.rb"]).unwrap();

    assert!(exists(dir.path(), "lib/main.rb"));
    assert!(!exists(dir.path(), "lib/extra.rb"));
}

#[test]
fn escaping_allowed_paths_cannot_reach_outside() {
    let outer = tempdir().unwrap();
    let root = outer.path().join("gem");
    create_file(&root, "lib/main.rb", "# main");
    create_file(outer.path(), "sibling.txt", "outside");

    prune(&root, &["lib/main.rb", "../sibling.txt"]).unwrap();

    assert!(exists(outer.path(), "sibling.txt"));
    assert!(exists(&root, "lib/main.rb"));
}

#[test]
fn missing_allowed_paths_are_harmless() {
    let dir = gem_tree();

    let result = prune(dir.path(), &["lib/main.rb", "lib/does_not_exist.rb"]).unwrap();

    assert!(exists(dir.path(), "lib/main.rb"));
    assert_eq!(result.files_removed, 2);
}

#[cfg(unix)]
#[test]
fn removes_symlinks_to_files() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    let link = dir.path().join("link_to_main.rb");
    std::os::unix::fs::symlink(dir.path().join("lib/main.rb"), &link).unwrap();

    let result = prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(exists(dir.path(), "lib/main.rb"));
    assert!(fs::symlink_metadata(&link).is_err());
    assert_eq!(result.files_removed, 1);
}

#[cfg(unix)]
#[test]
fn removes_symlinks_to_directories() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "vendor/dep.rb", "# dep");
    let link = dir.path().join("vendor_link");
    std::os::unix::fs::symlink(dir.path().join("vendor"), &link).unwrap();

    prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(exists(dir.path(), "lib/main.rb"));
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(!exists(dir.path(), "vendor"));
}

#[cfg(unix)]
#[test]
fn symlink_targets_outside_root_are_untouched() {
    let outside = tempdir().unwrap();
    create_file(outside.path(), "shared/data.txt", "shared");
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    std::os::unix::fs::symlink(outside.path().join("shared"), dir.path().join("shared")).unwrap();

    prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert!(!exists(dir.path(), "shared"));
    assert_eq!(
        fs::read_to_string(outside.path().join("shared/data.txt")).unwrap(),
        "shared"
    );
}

#[test]
fn counts_removed_bytes() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "lib/extra.rb", "# extra");
    create_file(dir.path(), "test/a.rb", "# a");
    create_file(dir.path(), "test/b.rb", "# b");

    let result = prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert_eq!(result.files_removed, 3);
    assert_eq!(result.bytes_removed, ("# extra".len() + "# a".len() + "# b".len()) as u64);
}

#[test]
fn second_run_removes_nothing() {
    let dir = gem_tree();
    create_file(dir.path(), "mygem.gemspec", "# gemspec");

    let first = prune(dir.path(), &["lib/main.rb"]).unwrap();
    let second = prune(dir.path(), &["lib/main.rb"]).unwrap();

    assert_eq!(first.files_removed, 2);
    assert_eq!(second.files_removed, 0);
    assert_eq!(second.bytes_removed, 0);
    assert_eq!(second.dirs_removed, 0);
}

#[test]
fn dry_run_reports_without_deleting() {
    let dir = gem_tree();
    let options = PruneOptions {
        dry_run: true,
        ..PruneOptions::default()
    };

    let mut would_remove = Vec::new();
    let result = prune_with(dir.path(), &["lib/main.rb"], &options, &mut |event| {
        if event.outcome.is_removed() {
            would_remove.push(event.path.to_path_buf());
        }
    })
    .unwrap();

    assert!(result.dry_run);
    assert_eq!(result.files_removed, 2);
    assert_eq!(result.dirs_removed, 1);
    assert!(would_remove.contains(&dir.path().join("test")));
    assert!(exists(dir.path(), "lib/extra.rb"));
    assert!(exists(dir.path(), "test/test_main.rb"));

    let real = prune(dir.path(), &["lib/main.rb"]).unwrap();
    assert_eq!(real.files_removed, result.files_removed);
    assert_eq!(real.bytes_removed, result.bytes_removed);
    assert_eq!(real.dirs_removed, result.dirs_removed);
}

#[test]
fn sink_sees_every_non_kept_entry() {
    let dir = gem_tree();

    let mut outcomes = Vec::new();
    prune_with(
        dir.path(),
        &["lib/main.rb"],
        &PruneOptions::default(),
        &mut |event| {
            let tag = match event.outcome {
                Removal::File { .. } => "file",
                Removal::Directory => "dir",
                Removal::KeptNonEmpty => "kept",
                Removal::Vanished => "vanished",
                Removal::Failed(_) => "failed",
            };
            let rel = event.path.strip_prefix(dir.path()).unwrap().to_path_buf();
            outcomes.push((rel, tag));
        },
    )
    .unwrap();

    outcomes.sort();
    assert_eq!(
        outcomes,
        vec![
            (PathBuf::from("lib/extra.rb"), "file"),
            (PathBuf::from("test"), "dir"),
            (PathBuf::from("test/test_main.rb"), "file"),
        ]
    );
}

#[test]
fn missing_root_fails_before_touching_anything() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = prune(&missing, &["lib/main.rb"]).unwrap_err();
    assert!(matches!(err, SlimError::RootNotFound(_)));
}

#[test]
fn file_root_is_rejected() {
    let dir = tempdir().unwrap();
    create_file(dir.path(), "file.txt", "not a dir");

    let err = prune(&dir.path().join("file.txt"), &["x"]).unwrap_err();
    assert!(matches!(err, SlimError::RootNotDirectory(_)));
    assert!(exists(dir.path(), "file.txt"));
}

#[cfg(unix)]
#[test]
fn unremovable_entries_do_not_abort_the_pass() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    create_file(dir.path(), "lib/main.rb", "# main");
    create_file(dir.path(), "locked/inner.txt", "locked");
    create_file(dir.path(), "other.txt", "other");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // A superuser can still write into a read-only directory.
    let canary = locked.join("canary");
    if fs::write(&canary, "").is_ok() {
        fs::remove_file(&canary).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipping: permission bits are not enforced for this user");
        return;
    }

    let result = prune(dir.path(), &["lib/main.rb"]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(exists(dir.path(), "locked/inner.txt"));
    assert!(!exists(dir.path(), "other.txt"));
    assert!(exists(dir.path(), "lib/main.rb"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.files_removed, 1);
}
