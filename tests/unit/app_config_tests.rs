/*!
 * Tests for app configuration
 */

use ass2srt::app_config::{Config, LogLevel};
use ass2srt::conversion::OutputFormat;
use ass2srt::script::TextEncoding;

use crate::common;

#[test]
fn test_default_config_shouldBeValid() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert!(config.conversion.drop_comments);
    assert!(!config.conversion.keep_position_tags);
    assert_eq!(config.conversion.output_format, OutputFormat::Srt);
    assert_eq!(config.dictionary.source, None);
    assert!(config.dictionary.cache_downloads);
    assert_eq!(config.dictionary.timeout_secs, 30);
    assert_eq!(config.bulk.archive_name, "subtitles.zip");
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_save_and_from_file_shouldPreserveValues() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.conversion.drop_comments = false;
    config.conversion.encoding = TextEncoding::Utf16Le;
    config.conversion.output_format = OutputFormat::BulkArchive;
    config.dictionary.source = Some("dicts/t2s.txt".to_string());
    config.bulk.concurrent_jobs = 2;
    config.log_level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert!(!loaded.conversion.drop_comments);
    assert_eq!(loaded.conversion.encoding, TextEncoding::Utf16Le);
    assert_eq!(loaded.conversion.output_format, OutputFormat::BulkArchive);
    assert_eq!(loaded.dictionary.source.as_deref(), Some("dicts/t2s.txt"));
    assert_eq!(loaded.bulk.concurrent_jobs, 2);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"conversion": {"output_format": "bulk_archive"}, "log_level": "warn"}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.conversion.output_format, OutputFormat::BulkArchive);
    assert!(config.conversion.drop_comments);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.bulk.concurrent_jobs, 4);
}

#[test]
fn test_from_file_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(temp_dir.path().join("missing.json")).is_err());
}

#[test]
fn test_validate_withBadDictionarySettings_shouldFail() {
    let mut config = Config::default();
    config.dictionary.delimiter = "ab".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.dictionary.delimiter = "#".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.dictionary.delimiter = "\n".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.dictionary.source = Some("ftp://example.com/t2s.txt".to_string());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.dictionary.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withHttpSource_shouldPass() {
    let mut config = Config::default();
    config.dictionary.source = Some("https://example.com/t2s.txt".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBadBulkSettings_shouldFail() {
    let mut config = Config::default();
    config.bulk.concurrent_jobs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.bulk.archive_name = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_dictionary_format_shouldFollowConfig() {
    let mut config = Config::default();
    config.dictionary.delimiter = "=".to_string();
    config.dictionary.comment_marker = ";".to_string();
    config.dictionary.first_candidate_only = true;

    let format = config.dictionary.format().unwrap();
    assert_eq!(format.delimiter, '=');
    assert_eq!(format.comment_marker, ';');
    assert!(format.first_candidate_only);
}

#[test]
fn test_conversion_options_shouldMirrorConversionConfig() {
    let mut config = Config::default();
    config.conversion.drop_comments = false;
    config.conversion.keep_position_tags = true;

    let options = config.conversion_options();
    assert!(!options.drop_comments);
    assert!(options.keep_position_tags);
    assert!(options.dictionary.is_none());
}

#[test]
fn test_log_level_shouldMapToLevelFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
