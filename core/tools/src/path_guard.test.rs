use super::*;

#[test]
fn traversal_above_root_is_rejected() {
    let err = validate_path("../../etc/passwd", Path::new("/tmp/proj")).unwrap_err();
    let message = err.to_string().to_lowercase();
    assert!(
        message.contains("outside")
            || message.contains("traversal")
            || message.contains("within")
            || message.contains("escape"),
        "unexpected message: {message}"
    );
}

#[test]
fn internal_dotdot_that_stays_within_root_resolves() {
    let resolved = validate_path("src/../README.md", Path::new("/tmp/proj")).expect("resolves");
    assert_eq!(resolved, PathBuf::from("/tmp/proj/README.md"));
}

#[test]
fn empty_path_is_rejected() {
    assert!(validate_path("", Path::new("/tmp/proj")).is_err());
}

#[test]
fn nul_byte_is_rejected() {
    assert!(validate_path("a\0b", Path::new("/tmp/proj")).is_err());
}

#[test]
fn absolute_path_outside_root_is_rejected() {
    assert!(validate_path("/etc/passwd", Path::new("/tmp/proj")).is_err());
}

#[test]
fn absolute_path_inside_root_resolves() {
    let resolved =
        validate_path("/tmp/proj/src/a.rs", Path::new("/tmp/proj")).expect("resolves");
    assert_eq!(resolved, PathBuf::from("/tmp/proj/src/a.rs"));
}

#[test]
fn symlink_escaping_root_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("proj");
    std::fs::create_dir_all(&root).expect("mkdir");
    let outside = dir.path().join("secret.txt");
    std::fs::write(&outside, "top secret").expect("write");

    #[cfg(unix)]
    {
        let link = root.join("escape.txt");
        std::os::unix::fs::symlink(&outside, &link).expect("symlink");
        let err = validate_path("escape.txt", &root).unwrap_err();
        assert!(matches!(err, PaigeError::PathEscapesRoot { .. }));
    }
}
