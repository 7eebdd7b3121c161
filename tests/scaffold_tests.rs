//! Integration tests for the tree scaffolder

use camino::Utf8PathBuf;
use fileproc::models::NullSink;
use fileproc::services::{ScaffoldError, plan_scaffold, scaffold, scaffold_from_file};
use std::fs;
use tempfile::TempDir;

fn create_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

const PROJECT: &str = "proj\n    src\n        main.py\n    README.md\n";

#[test]
fn test_project_example() {
    let (_temp_dir, root) = create_root();

    let report = scaffold(&root, PROJECT, &mut NullSink).unwrap();

    assert!(root.join("proj").is_dir());
    assert!(root.join("proj/src").is_dir());
    assert!(root.join("proj/src/main.py").is_file());
    assert!(root.join("proj/README.md").is_file());
    assert_eq!(report.dirs_created, 2);
    assert_eq!(report.files_created, 2);
    assert_eq!(report.failed, 0);
}

#[test]
fn test_rerun_only_skips() {
    let (_temp_dir, root) = create_root();
    scaffold(&root, PROJECT, &mut NullSink).unwrap();

    let mut lines = Vec::new();
    let report = scaffold(&root, PROJECT, &mut lines).unwrap();

    assert_eq!(report.dirs_created + report.files_created, 0);
    assert_eq!(report.skipped, 4);
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.message.contains("already exists, skipped")));
}

#[test]
fn test_existing_file_content_kept() {
    let (_temp_dir, root) = create_root();
    fs::create_dir(root.join("proj")).unwrap();
    fs::write(root.join("proj/README.md"), "keep me").unwrap();

    scaffold(&root, PROJECT, &mut NullSink).unwrap();

    assert_eq!(fs::read_to_string(root.join("proj/README.md")).unwrap(), "keep me");
}

#[test]
fn test_dedent_multiple_levels() {
    let (_temp_dir, root) = create_root();
    let description = "a\n    b\n        c\n            d.txt\ne\n";

    let plan = plan_scaffold(&root, description).unwrap();
    let depths: Vec<usize> = plan.iter().map(|n| n.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 3, 0]);

    scaffold(&root, description, &mut NullSink).unwrap();
    assert!(root.join("a/b/c/d.txt").is_file());
    assert!(root.join("e").is_dir());
}

#[test]
fn test_blank_lines_ignored() {
    let (_temp_dir, root) = create_root();
    let description = "docs\n\n    guide.md\n   \n";

    let report = scaffold(&root, description, &mut NullSink).unwrap();

    assert_eq!(report.dirs_created, 1);
    assert!(root.join("docs/guide.md").is_file());
}

#[test]
fn test_misaligned_indent_creates_nothing() {
    let (_temp_dir, root) = create_root();
    let description = "proj\n  src\n";

    let err = scaffold(&root, description, &mut NullSink).unwrap_err();

    assert!(matches!(err, ScaffoldError::MisalignedIndent { line: 2, delta: 2 }));
    assert!(!root.join("proj").exists());
}

#[test]
fn test_indent_jump_rejected() {
    let (_temp_dir, root) = create_root();
    let err = plan_scaffold(&root, "proj\n        deep.txt\n").unwrap_err();
    assert!(matches!(err, ScaffoldError::IndentJump { line: 2 }));
}

#[test]
fn test_parent_traversal_rejected() {
    let (_temp_dir, root) = create_root();
    let err = plan_scaffold(&root, "proj\n    ..\n").unwrap_err();
    assert!(matches!(err, ScaffoldError::InvalidName { line: 2, .. }));
}

#[test]
fn test_missing_root() {
    let (_temp_dir, root) = create_root();
    let err = scaffold(&root.join("nope"), PROJECT, &mut NullSink).unwrap_err();
    assert!(matches!(err, ScaffoldError::RootNotFound(_)));
}

#[test]
fn test_from_file() {
    let (_temp_dir, root) = create_root();
    let description_path = root.join("layout.txt");
    fs::write(&description_path, "out\n    a.log\n").unwrap();

    let report = scaffold_from_file(&root, &description_path, &mut NullSink).unwrap();
    assert_eq!(report.files_created, 1);
    assert!(root.join("out/a.log").is_file());

    let err = scaffold_from_file(&root, &root.join("absent.txt"), &mut NullSink).unwrap_err();
    assert!(matches!(err, ScaffoldError::Read { .. }));
}
