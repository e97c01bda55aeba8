// tests/event_file.rs

use std::path::Path;

use backblast::engine::{Change, Event};
use backblast::errors::BackblastError;
use backblast::trigger::{is_event_file, parse_event_file};

#[test]
fn typed_event_with_params_is_parsed() {
    let event = parse_event_file(
        r#"
type = "change-created"

[change]
id = "4711"

[change.params]
number = "555-0100"
retries = "3"
"#,
    )
    .unwrap();

    let expected = Event::new(
        "change-created",
        Change::new("4711")
            .with_param("number", "555-0100")
            .with_param("retries", "3"),
    );
    assert_eq!(event, expected);
}

#[test]
fn missing_or_blank_type_yields_an_untyped_event() {
    let missing = parse_event_file("[change]\nid = \"1\"\n").unwrap();
    assert_eq!(missing.event_type, None);

    let blank = parse_event_file("type = \"  \"\n[change]\nid = \"2\"\n").unwrap();
    assert_eq!(blank.event_type, None);
}

#[test]
fn empty_change_id_is_rejected() {
    match parse_event_file("type = \"A\"\n[change]\nid = \" \"\n") {
        Err(BackblastError::EventFileError(msg)) => assert!(msg.contains("[change].id")),
        other => panic!("Expected EventFileError, got: {:?}", other),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert!(matches!(
        parse_event_file("type = \"A\"\n[change\nid = 1"),
        Err(BackblastError::TomlError(_))
    ));
    assert!(matches!(
        parse_event_file("type = \"A\"\n"),
        Err(BackblastError::TomlError(_))
    ));
}

#[test]
fn only_toml_files_are_event_files() {
    assert!(is_event_file(Path::new("/spool/0001.toml")));
    assert!(!is_event_file(Path::new("/spool/0001.toml.rejected")));
    assert!(!is_event_file(Path::new("/spool/0001.tmp")));
    assert!(!is_event_file(Path::new("/spool/README")));
}
