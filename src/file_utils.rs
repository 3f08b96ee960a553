use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions of scripts the converter accepts
pub const SCRIPT_EXTENSIONS: [&str; 2] = ["ass", "ssa"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: Directory an input's output goes to: output_dir, else the input's own
    pub fn output_dir_for<P: AsRef<Path>>(input_file: P, output_dir: Option<&Path>) -> PathBuf {
        output_dir
            .map(Path::to_path_buf)
            .or_else(|| input_file.as_ref().parent().map(Path::to_path_buf))
            .unwrap_or_default()
    }

    // @generates: `<stem>.srt` next to the input, or inside output_dir
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, output_dir: Option<&Path>) -> PathBuf {
        let input_file = input_file.as_ref();
        let name = input_file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let output_filename = crate::archive::archive_entry_name(&name);

        Self::output_dir_for(input_file, output_dir).join(output_filename)
    }

    /// Whether the path names an ASS/SSA script by extension
    pub fn is_script_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Find ASS/SSA scripts below a directory, sorted by path
    pub fn find_scripts<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_script_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand files and directories into the list of scripts to convert.
    ///
    /// Files are taken as given, whatever their extension; directories are
    /// searched recursively. Duplicates keep their first position.
    pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut result: Vec<PathBuf> = Vec::new();

        for path in paths {
            if Self::dir_exists(path) {
                for script in Self::find_scripts(path)? {
                    if !result.contains(&script) {
                        result.push(script);
                    }
                }
            } else if Self::file_exists(path) {
                if !result.contains(path) {
                    result.push(path.clone());
                }
            } else {
                return Err(anyhow::anyhow!("Input path does not exist: {:?}", path));
            }
        }

        Ok(result)
    }

    /// Read a file to bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
