/*!
 * Tests for file and folder operations
 */

use std::path::{Path, PathBuf};
use ass2srt::file_utils::FileManager;

use crate::common::{self, SAMPLE_ASS};

#[test]
fn test_generate_output_path_withoutOutputDir_shouldStayBesideInput() {
    let output = FileManager::generate_output_path("/media/show/ep01.ass", None);
    assert_eq!(output, PathBuf::from("/media/show/ep01.srt"));
}

#[test]
fn test_generate_output_path_withOutputDir_shouldUseIt() {
    let output = FileManager::generate_output_path("/media/show/EP01.SSA", Some(Path::new("/tmp/out")));
    assert_eq!(output, PathBuf::from("/tmp/out/EP01.srt"));
}

#[test]
fn test_output_dir_for_shouldPreferOutputDir() {
    assert_eq!(
        FileManager::output_dir_for("/media/show/ep01.ass", None),
        PathBuf::from("/media/show")
    );
    assert_eq!(
        FileManager::output_dir_for("/media/show/ep01.ass", Some(Path::new("/tmp/out"))),
        PathBuf::from("/tmp/out")
    );
    assert_eq!(FileManager::output_dir_for("ep01.ass", None), PathBuf::new());
}

#[test]
fn test_is_script_file_shouldMatchExtensionsCaseInsensitively() {
    assert!(FileManager::is_script_file("a.ass"));
    assert!(FileManager::is_script_file("a.SSA"));
    assert!(!FileManager::is_script_file("a.srt"));
    assert!(!FileManager::is_script_file("ass"));
}

#[test]
fn test_find_scripts_shouldRecurseAndSort() {
    let temp_dir = common::create_temp_dir().unwrap();
    let root = temp_dir.path();
    common::create_test_file(root, "b.ass", SAMPLE_ASS).unwrap();
    common::create_test_file(root, "a.ssa", SAMPLE_ASS).unwrap();
    common::create_test_file(root, "nested/c.ass", SAMPLE_ASS).unwrap();
    common::create_test_file(root, "notes.txt", "not a script").unwrap();

    let found = FileManager::find_scripts(root).unwrap();
    assert_eq!(
        found,
        vec![root.join("a.ssa"), root.join("b.ass"), root.join("nested").join("c.ass")]
    );
}

#[test]
fn test_collect_inputs_shouldKeepOrderAndDropDuplicates() {
    let temp_dir = common::create_temp_dir().unwrap();
    let root = temp_dir.path();
    let single = common::create_test_file(root, "single.txt", SAMPLE_ASS).unwrap();
    let dir = root.join("season");
    common::create_test_file(&dir, "ep02.ass", SAMPLE_ASS).unwrap();
    let ep01 = common::create_test_file(&dir, "ep01.ass", SAMPLE_ASS).unwrap();

    let inputs = FileManager::collect_inputs(&[single.clone(), dir.clone(), ep01.clone()]).unwrap();
    assert_eq!(inputs, vec![single, ep01, dir.join("ep02.ass")]);
}

#[test]
fn test_collect_inputs_withMissingPath_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let missing = temp_dir.path().join("missing.ass");
    assert!(FileManager::collect_inputs(&[missing]).is_err());
}

#[test]
fn test_write_bytes_shouldCreateParentDirectories() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("a").join("b").join("out.srt");

    FileManager::write_bytes(&path, b"content").unwrap();
    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(path.parent().unwrap()));
    assert_eq!(FileManager::read_bytes(&path).unwrap(), b"content");
}
