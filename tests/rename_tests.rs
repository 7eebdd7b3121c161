//! Integration tests for the rename mapper and the extension changer

use camino::Utf8PathBuf;
use fileproc::models::NullSink;
use fileproc::services::{
    ExtensionError, RenameEntry, RenameError, apply_renames, change_extensions, read_mapping,
    rename_from_mapping,
};
use std::fs;
use tempfile::TempDir;

fn create_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

#[test]
fn test_one_found_one_missing() {
    let (_temp_dir, root) = create_root();
    fs::write(root.join("a.txt"), "a").unwrap();

    let entries = vec![
        RenameEntry::new("a.txt", "b.txt"),
        RenameEntry::new("missing.txt", "c.txt"),
    ];
    let report = apply_renames(&root, &entries, &mut NullSink).unwrap();

    assert_eq!(report.success_count, 1);
    assert_eq!(report.failure_count, 1);
    assert!(!root.join("a.txt").exists());
    assert!(root.join("b.txt").exists());
    assert!(
        report
            .log
            .iter()
            .any(|l| l.is_error() && l.message.contains("not found") && l.message.contains("missing.txt"))
    );
    assert!(report.log.last().unwrap().message.starts_with("Rename finished"));
}

#[test]
fn test_failure_does_not_block_later_rows() {
    let (_temp_dir, root) = create_root();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();
    fs::write(root.join("c.txt"), "c").unwrap();

    let entries = vec![
        // Occupied target: never overwritten
        RenameEntry::new("a.txt", "b.txt"),
        RenameEntry::new("c.txt", "d.txt"),
    ];
    let report = apply_renames(&root, &entries, &mut NullSink).unwrap();

    assert_eq!(report.success_count, 1);
    assert_eq!(report.failure_count, 1);
    assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "b");
    assert!(root.join("d.txt").exists());
}

#[test]
fn test_names_outside_root_fail() {
    let (_temp_dir, root) = create_root();
    let inner = root.join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("a.txt"), "a").unwrap();

    let entries = vec![RenameEntry::new("a.txt", "../escaped.txt")];
    let report = apply_renames(&inner, &entries, &mut NullSink).unwrap();

    assert_eq!(report.failure_count, 1);
    assert!(inner.join("a.txt").exists());
    assert!(!root.join("escaped.txt").exists());
}

#[test]
fn test_csv_header_skipped() {
    let (_temp_dir, root) = create_root();
    let mapping = root.join("map.csv");
    fs::write(&mapping, "old,new\nx.txt,y.txt\nx.txt, z.txt ,ignored\n").unwrap();

    let entries = read_mapping(&mapping).unwrap();

    assert_eq!(
        entries,
        vec![RenameEntry::new("x.txt", "y.txt"), RenameEntry::new("x.txt", "z.txt")]
    );
}

#[test]
fn test_tsv_mapping_applied() {
    let (_temp_dir, root) = create_root();
    fs::write(root.join("report 1.doc"), "r").unwrap();
    let mapping = root.join("map.tsv");
    fs::write(&mapping, "from\tto\nreport 1.doc\treport-2024.doc\n").unwrap();

    let report = rename_from_mapping(&root, &mapping, &mut NullSink).unwrap();

    assert_eq!(report.success_count, 1);
    assert!(root.join("report-2024.doc").exists());
}

#[test]
fn test_single_column_rejected_without_side_effects() {
    let (_temp_dir, root) = create_root();
    fs::write(root.join("a.txt"), "a").unwrap();
    let mapping = root.join("map.csv");
    fs::write(&mapping, "old,new\na.txt,b.txt\nlonely\n").unwrap();

    let err = rename_from_mapping(&root, &mapping, &mut NullSink).unwrap_err();

    assert!(matches!(err, RenameError::TooFewColumns { row: 3, found: 1 }));
    assert!(root.join("a.txt").exists());
}

#[test]
fn test_single_column_header_rejected() {
    let (_temp_dir, root) = create_root();
    let mapping = root.join("map.csv");
    fs::write(&mapping, "names\na.txt\n").unwrap();

    let err = read_mapping(&mapping).unwrap_err();
    assert!(matches!(err, RenameError::TooFewColumns { row: 1, .. }));
}

#[test]
fn test_change_extensions_recursive() {
    let (_temp_dir, root) = create_root();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("a.txt"), "").unwrap();
    fs::write(root.join("sub/b.txt"), "").unwrap();
    fs::write(root.join("c.txt.bak"), "").unwrap();
    fs::write(root.join("d.md"), "").unwrap();

    let report = change_extensions(&root, ".txt", "md", &mut NullSink).unwrap();

    assert_eq!(report.renamed, 2);
    assert!(root.join("a.md").exists());
    assert!(root.join("sub/b.md").exists());
    assert!(root.join("c.txt.bak").exists());
}

#[test]
fn test_change_extensions_never_overwrites() {
    let (_temp_dir, root) = create_root();
    fs::write(root.join("a.txt"), "txt").unwrap();
    fs::write(root.join("a.md"), "md").unwrap();

    let report = change_extensions(&root, "txt", "md", &mut NullSink).unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(fs::read_to_string(root.join("a.md")).unwrap(), "md");
}

#[test]
fn test_change_extensions_no_match_and_invalid() {
    let (_temp_dir, root) = create_root();

    let report = change_extensions(&root, "jpg", "png", &mut NullSink).unwrap();
    assert_eq!(report.renamed, 0);
    assert!(report.log[0].message.contains("No files matching .jpg"));

    assert!(matches!(
        change_extensions(&root, "", "png", &mut NullSink),
        Err(ExtensionError::Empty)
    ));
    assert!(matches!(
        change_extensions(&root, "jpg", "p/ng", &mut NullSink),
        Err(ExtensionError::Invalid(_))
    ));
}
