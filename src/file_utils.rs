use anyhow::{Result, Context};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions of game plugin files, compared case-insensitively
pub const PLUGIN_EXTENSIONS: &[&str] = &["esp", "esm", "esl"];

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
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @returns: Final path component as a string, empty when there is none
    pub fn file_name_of<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    // @checks: Plugin extension (.esp/.esm/.esl, any case)
    pub fn is_plugin_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                PLUGIN_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Find plugins directly inside `root` and one level down in each mod directory.
    ///
    /// Results are sorted by path so repeated runs see the same order.
    pub fn find_mod_plugins<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(anyhow::anyhow!("Mods directory does not exist: {:?}", root));
        }

        let mut result = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(2).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to read directory entry under {:?}", root))?;
            if entry.file_type().is_file() && Self::is_plugin_file(entry.path()) {
                result.push(entry.into_path());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Directory the plugins are read from.
    ///
    /// A dropped directory is used as-is, a dropped file resolves to its
    /// parent, and no argument means `default_dir`.
    pub fn resolve_input_dir(arg: Option<&Path>, default_dir: &Path) -> PathBuf {
        match arg {
            Some(path) if path.is_dir() => path.to_path_buf(),
            Some(path) if path.is_file() => path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_dir.to_path_buf()),
            _ => default_dir.to_path_buf(),
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }
}
