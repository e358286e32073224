use super::*;

#[tokio::test]
async fn read_file_returns_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.rs"), "fn a() {}").expect("write");

    let result = execute("read_file", &json!({"path": "a.rs"}), dir.path())
        .await
        .expect("ok");
    assert_eq!(result["content"], json!("fn a() {}"));
}

#[tokio::test]
async fn read_file_rejects_traversal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = execute("read_file", &json!({"path": "../../etc/passwd"}), dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::PathEscapesRoot { .. }));
}

#[tokio::test]
async fn list_files_finds_created_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.rs"), "fn a() {}").expect("write");

    let result = execute("list_files", &json!({}), dir.path()).await.expect("ok");
    let files = result["files"].as_array().expect("array");
    assert!(files.iter().any(|f| f.as_str().unwrap_or("").ends_with("a.rs")));
}

#[tokio::test]
async fn unknown_tool_name_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = execute("delete_everything", &json!({}), dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, PaigeError::Validation { .. }));
}
