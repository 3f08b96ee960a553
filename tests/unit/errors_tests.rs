/*!
 * Tests for error types and their messages
 */

use ass2srt::errors::{
    ArchiveError, ConvertError, DictionaryFormatError, FileFailure, ParseError,
    ParseErrorKind, ParseWarning, TimeCodeError, WarningKind,
};

#[test]
fn test_parse_error_display_shouldIncludeLine() {
    let err = ParseError::new(12, ParseErrorKind::MissingColumn("text".to_string()));
    assert_eq!(err.to_string(), "parse error at line 12: Format line has no 'text' column");
}

#[test]
fn test_parse_warning_display_shouldIncludeLineAndReason() {
    let warning = ParseWarning {
        line: 7,
        kind: WarningKind::TimeCode(TimeCodeError::Malformed("0:0x".to_string())),
    };
    assert_eq!(warning.to_string(), "line 7: malformed time code '0:0x'");
}

#[test]
fn test_convert_error_fromParts_shouldWrap() {
    let err: ConvertError = ParseError::new(1, ParseErrorKind::NotAScript).into();
    assert!(matches!(err, ConvertError::Parse(_)));

    let err: ConvertError = DictionaryFormatError {
        line: 3,
        reason: "missing delimiter".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "dictionary format error at line 3: missing delimiter");

    let err: ConvertError = ArchiveError::TooManyEntries(70_000).into();
    assert!(matches!(err, ConvertError::Archive(ArchiveError::TooManyEntries(70_000))));
}

#[test]
fn test_all_files_failed_display_shouldCountFailures() {
    let failures = vec![
        FileFailure {
            name: "a.ass".to_string(),
            error: ConvertError::EmptyOutput { events: 0, comments: 0, dropped: 0 },
        },
        FileFailure {
            name: "b.ass".to_string(),
            error: ParseError::new(0, ParseErrorKind::EmptyInput).into(),
        },
    ];

    assert_eq!(failures[1].to_string(), "b.ass: parse error at line 0: script is empty");
    assert_eq!(ConvertError::AllFilesFailed(failures).to_string(), "all 2 files failed to convert");
}
