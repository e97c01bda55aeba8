// tests/pidfile.rs

use backblast::errors::BackblastError;
use backblast::server::PidFile;

#[test]
fn pid_file_holds_our_pid_and_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run").join("backblast.pid");

    let pid_file = PidFile::create(&path).unwrap();
    let contents = std::fs::read_to_string(pid_file.path()).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());

    drop(pid_file);
    assert!(!path.exists());
}

#[test]
fn existing_pid_file_blocks_a_second_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backblast.pid");

    let _first = PidFile::create(&path).unwrap();

    match PidFile::create(&path) {
        Err(BackblastError::ConfigError(msg)) => assert!(msg.contains("already exists")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
    // The failed attempt must not remove the first daemon's file.
    assert!(path.exists());
}
