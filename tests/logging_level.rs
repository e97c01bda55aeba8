// tests/logging_level.rs

use backblast::logging::resolve_level;
use backblast::types::LogLevel;

#[test]
fn cli_flag_wins_over_env_and_config() {
    assert_eq!(
        resolve_level(Some(LogLevel::Trace), Some(LogLevel::Warn), Some(LogLevel::Error)),
        LogLevel::Trace
    );
}

#[test]
fn env_wins_over_config() {
    assert_eq!(
        resolve_level(None, Some(LogLevel::Warn), Some(LogLevel::Error)),
        LogLevel::Warn
    );
}

#[test]
fn config_then_default() {
    assert_eq!(resolve_level(None, None, Some(LogLevel::Debug)), LogLevel::Debug);
    assert_eq!(resolve_level(None, None, None), LogLevel::Info);
}

#[test]
fn level_names_are_parsed_leniently() {
    assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
    assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
    assert_eq!(LogLevel::parse("loud"), None);
}
