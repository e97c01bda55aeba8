// tests/cli_args.rs

use std::path::Path;

use backblast::cli::CliArgs;
use backblast::types::LogLevel;
use clap::{CommandFactory, Parser};

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "backblast",
        "-c",
        "/etc/backblast/test.toml",
        "--log-level",
        "debug",
        "--pid-file",
        "/run/backblast.pid",
        "--check",
    ])
    .unwrap();

    assert_eq!(args.config.as_deref(), Some(Path::new("/etc/backblast/test.toml")));
    assert_eq!(args.log_level, Some(LogLevel::Debug));
    assert_eq!(args.pid_file.as_deref(), Some(Path::new("/run/backblast.pid")));
    assert!(args.check);
}

#[test]
fn there_is_no_daemonize_flag() {
    assert!(CliArgs::try_parse_from(["backblast", "-d"]).is_err());

    let help = CliArgs::command().render_long_help().to_string();
    assert!(help.contains("foreground"), "{help}");
    assert!(help.contains("supervisor"), "{help}");
}
