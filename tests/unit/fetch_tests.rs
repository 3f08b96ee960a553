/*!
 * Tests for dictionary fetchers
 */

use std::fs;
use url::Url;
use ass2srt::errors::FetchError;
use ass2srt::fetch::{DictionaryFetcher, DictionarySource, FileFetcher, HttpFetcher, fetch_dictionary};

use crate::common;

#[test]
fn test_source_parse_withMixedCaseScheme_shouldBeUrl() {
    let source = DictionarySource::parse("HTTPS://Example.com/t2s.txt").unwrap();
    match source {
        DictionarySource::Url(url) => assert_eq!(url.host_str(), Some("example.com")),
        other => panic!("expected a URL, got {:?}", other),
    }
}

#[test]
fn test_source_parse_withWindowsPath_shouldBePath() {
    let source = DictionarySource::parse(r"C:\dicts\t2s.txt").unwrap();
    assert!(matches!(source, DictionarySource::Path(_)));
    assert_eq!(source.to_string(), r"C:\dicts\t2s.txt");
}

#[test]
fn test_cache_path_shouldBeStablePerUrl() {
    let dir = std::path::Path::new("/cache");
    let a = Url::parse("https://example.com/a.txt").unwrap();
    let b = Url::parse("https://example.com/b.txt").unwrap();

    let path_a = HttpFetcher::cache_path(dir, &a);
    assert_eq!(path_a, HttpFetcher::cache_path(dir, &a));
    assert_ne!(path_a, HttpFetcher::cache_path(dir, &b));
    assert_eq!(path_a.extension().unwrap(), "txt");
    assert_eq!(path_a.file_stem().unwrap().len(), 64);
}

#[tokio::test]
async fn test_file_fetcher_withExistingFile_shouldReturnText() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "t2s.txt", "头\t頭\n").unwrap();

    let text = FileFetcher.fetch(&DictionarySource::Path(path)).await.unwrap();
    assert_eq!(text, "头\t頭\n");
}

#[tokio::test]
async fn test_file_fetcher_withMissingFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let source = DictionarySource::Path(temp_dir.path().join("missing.txt"));

    let err = FileFetcher.fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::File(_)));
}

#[tokio::test]
async fn test_file_fetcher_withBinaryFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("binary.txt");
    fs::write(&path, [0xFF, 0xFE, 0xFD]).unwrap();

    let err = FileFetcher.fetch(&DictionarySource::Path(path)).await.unwrap_err();
    assert!(matches!(err, FetchError::NotText(_)));
}

#[tokio::test]
async fn test_file_fetcher_withUrl_shouldRejectSource() {
    let source = DictionarySource::parse("https://example.com/t2s.txt").unwrap();
    let err = FileFetcher.fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidSource(_)));
}

#[tokio::test]
async fn test_http_fetcher_withCachedDownload_shouldNotTouchNetwork() {
    let temp_dir = common::create_temp_dir().unwrap();
    // Reserved TLD, never resolvable
    let url = Url::parse("https://dictionaries.invalid/t2s.txt").unwrap();
    let cached = HttpFetcher::cache_path(temp_dir.path(), &url);
    fs::write(&cached, "a\tb\n").unwrap();

    let fetcher = HttpFetcher::new(1).with_cache_dir(temp_dir.path());
    let text = fetcher.fetch(&DictionarySource::Url(url)).await.unwrap();
    assert_eq!(text, "a\tb\n");
}

#[tokio::test]
async fn test_http_fetcher_withPath_shouldRejectSource() {
    let fetcher = HttpFetcher::default();
    let err = fetcher
        .fetch(&DictionarySource::Path("t2s.txt".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidSource(_)));
}

#[tokio::test]
async fn test_fetch_dictionary_withPath_shouldUseFileFetcher() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "d.txt", "x\ty\n").unwrap();

    let text = fetch_dictionary(&DictionarySource::Path(path), &HttpFetcher::default())
        .await
        .unwrap();
    assert_eq!(text, "x\ty\n");
}
