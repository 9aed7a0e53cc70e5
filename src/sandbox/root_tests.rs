use super::*;

fn tmp_root() -> (tempfile::TempDir, Root) {
    let tmp = tempfile::tempdir().unwrap();
    let root = Root::new(tmp.path()).unwrap();
    (tmp, root)
}

#[test]
fn resolves_paths_at_and_below_root() {
    let (_tmp, root) = tmp_root();
    assert_eq!(root.resolve("/").unwrap(), root.path());
    assert_eq!(root.resolve("").unwrap(), root.path());
    assert_eq!(root.resolve("/sub").unwrap(), root.path().join("sub"));
    assert_eq!(root.resolve("sub/a.txt").unwrap(), root.path().join("sub").join("a.txt"));
    // `..` that stays inside is collapsed, not rejected
    assert_eq!(root.resolve("/a/../b").unwrap(), root.path().join("b"));
    assert_eq!(root.resolve("/a/./b/").unwrap(), root.path().join("a").join("b"));
}

#[test]
fn rejects_parent_escapes() {
    let (_tmp, root) = tmp_root();
    for bad in ["..", "/..", "../etc", "/a/../../x", "/../../../../etc/passwd"] {
        match root.resolve(bad) {
            Err(ResolveError::OutsideRoot(p)) => assert_eq!(p, bad),
            other => panic!("expected OutsideRoot for {bad:?}, got {other:?}"),
        }
    }
}

#[test]
fn absolute_input_is_rooted_not_an_override() {
    let (_tmp, root) = tmp_root();
    assert_eq!(root.resolve("/etc/passwd").unwrap(), root.path().join("etc").join("passwd"));
    assert_eq!(root.resolve("//etc").unwrap(), root.path().join("etc"));
}

#[test]
fn sibling_sharing_the_root_prefix_is_outside() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("data")).unwrap();
    std::fs::create_dir(tmp.path().join("data-evil")).unwrap();
    let root = Root::new(tmp.path().join("data")).unwrap();

    let sibling = root.path().parent().unwrap().join("data-evil");
    assert!(!root.contains(&sibling));
    assert!(matches!(root.resolve("../data-evil/x"), Err(ResolveError::OutsideRoot(_))));
    assert!(root.contains(&root.path().join("evil")));
}

#[test]
fn nul_bytes_are_malformed() {
    let (_tmp, root) = tmp_root();
    assert!(matches!(root.resolve("a\u{0000}b"), Err(ResolveError::Malformed(..))));
}

#[test]
fn resolve_errors_map_to_http_statuses() {
    let (_tmp, root) = tmp_root();
    let escape: AppError = root.resolve("../x").unwrap_err().into();
    assert_eq!(escape.http_status(), 403);
    let malformed: AppError = root.resolve("\u{0000}").unwrap_err().into();
    assert_eq!(malformed.http_status(), 400);
}

#[test]
fn root_must_be_an_existing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(Root::new(tmp.path().join("missing")).is_err());
    let file = tmp.path().join("f.txt");
    std::fs::write(&file, b"x").unwrap();
    let err = Root::new(&file).unwrap_err();
    assert!(err.to_string().contains("must be a folder"));
}

#[test]
fn client_path_round_trips() {
    let (_tmp, root) = tmp_root();
    assert_eq!(root.client_path(root.path()), "/");
    let abs = root.resolve("/sub/../sub/b/").unwrap();
    assert_eq!(root.client_path(&abs), "/sub/b");
}

#[test]
fn client_parent_never_climbs_above_root() {
    assert_eq!(client_parent("/"), "");
    assert_eq!(client_parent(""), "");
    assert_eq!(client_parent("/sub"), "/");
    assert_eq!(client_parent("/sub/b"), "/sub");
    assert_eq!(client_parent("/sub/b/"), "/sub");
}

#[test]
fn client_join_collapses_separators() {
    assert_eq!(client_join("/", "a.txt"), "/a.txt");
    assert_eq!(client_join("/docs/", "/a.txt"), "/docs/a.txt");
    assert_eq!(client_join("", "x"), "/x");
}
