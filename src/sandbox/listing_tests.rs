use super::*;
use std::fs;

fn fixture() -> (tempfile::TempDir, Root) {
    let tmp = tempfile::tempdir().unwrap();
    let root = Root::new(tmp.path()).unwrap();
    let sub = root.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a.txt"), b"0123456789").unwrap();
    fs::create_dir(sub.join("b")).unwrap();
    (tmp, root)
}

#[test]
fn lists_sub_directory_dirs_first() {
    let (_tmp, root) = fixture();
    let listing = list_directory(&root, "/sub", ListMode::Full).unwrap();
    assert_eq!(listing.current_path, "/sub");
    assert_eq!(listing.parent_path, "/");
    assert_eq!(listing.files.len(), 2);

    let b = &listing.files[0];
    assert_eq!(b.name, "b");
    assert!(b.is_dir);
    assert_eq!(b.path, "/sub/b");
    assert_eq!(b.size, 0);
    assert_eq!(b.size_formatted, "0 B");

    let a = &listing.files[1];
    assert_eq!(a.name, "a.txt");
    assert!(!a.is_dir);
    assert_eq!(a.path, "/sub/a.txt");
    assert_eq!(a.size, 10);
    assert_eq!(a.size_formatted, "10 B");
    assert_eq!(a.create_time, a.mod_time);
}

#[test]
fn root_listing_has_empty_parent() {
    let (_tmp, root) = fixture();
    for requested in ["", "/"] {
        let listing = list_directory(&root, requested, ListMode::Full).unwrap();
        assert_eq!(listing.current_path, "/");
        assert_eq!(listing.parent_path, "");
        assert_eq!(listing.files[0].path, "/sub");
    }
}

#[test]
fn ordering_groups_then_names() {
    let tmp = tempfile::tempdir().unwrap();
    let root = Root::new(tmp.path()).unwrap();
    for f in ["zeta.txt", "Alpha.txt", "beta.txt"] {
        fs::write(root.path().join(f), b"x").unwrap();
    }
    for d in ["zdir", "Adir", "mdir"] {
        fs::create_dir(root.path().join(d)).unwrap();
    }
    let listing = list_directory(&root, "/", ListMode::Full).unwrap();
    let names: Vec<&str> = listing.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Adir", "mdir", "zdir", "Alpha.txt", "beta.txt", "zeta.txt"]);

    let dirs = list_directory(&root, "/", ListMode::DirectoriesOnly).unwrap();
    let dir_names: Vec<&str> = dirs.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(dir_names, vec!["Adir", "mdir", "zdir"]);
    assert!(dirs.files.iter().all(|f| f.is_dir && f.size == 0 && f.size_formatted.is_empty()));
}

#[test]
fn missing_path_is_not_found() {
    let (_tmp, root) = fixture();
    let err = list_directory(&root, "/nope", ListMode::Full).unwrap_err();
    assert_eq!(err.http_status(), 404);
    let err = list_directory(&root, "/nope", ListMode::DirectoriesOnly).unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[test]
fn file_path_is_not_a_directory() {
    let (_tmp, root) = fixture();
    let err = list_directory(&root, "/sub/a.txt", ListMode::Full).unwrap_err();
    assert!(matches!(err, AppError::NotADirectory { .. }));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn escape_is_forbidden() {
    let (_tmp, root) = fixture();
    let err = list_directory(&root, "/../", ListMode::Full).unwrap_err();
    assert_eq!(err.http_status(), 403);
}

#[test]
fn empty_directory_lists_no_files() {
    let (_tmp, root) = fixture();
    let listing = list_directory(&root, "/sub/b", ListMode::Full).unwrap();
    assert!(listing.files.is_empty());
    assert_eq!(listing.parent_path, "/sub");
    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["files"], serde_json::json!([]));
    assert_eq!(json["currentPath"], "/sub/b");
}

#[test]
fn serializes_with_client_field_names() {
    let (_tmp, root) = fixture();
    let listing = list_directory(&root, "/sub", ListMode::Full).unwrap();
    let json = serde_json::to_value(&listing).unwrap();
    let a = &json["files"][1];
    assert_eq!(a["isDir"], false);
    assert_eq!(a["sizeFormatted"], "10 B");
    assert!(a["modTime"].is_string());
    assert!(a["createTime"].is_string());
}
