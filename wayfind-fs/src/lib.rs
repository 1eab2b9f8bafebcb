//! Filesystem helpers for locating and reading engine configuration.
//!
//! All access goes through `cap-std` with ambient authority confined to the
//! directory that holds the target, and all paths are UTF-8 via `camino`.
#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// File name assumed when a configuration path names a directory.
pub const DEFAULT_CONFIG_FILE: &str = "valhalla.json";

/// Open a UTF-8 file path using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the directory containing `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether an existing path is a regular file.
///
/// A missing file or parent directory is a [`io::ErrorKind::NotFound`] error.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Read a UTF-8 file into a string.
pub fn read_utf8_to_string(path: &Utf8Path) -> io::Result<String> {
    let mut file = open_utf8_file(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Resolve a configuration argument to a file path.
///
/// Paths ending in `.json` are used as given. Anything else names a
/// directory, and `default_name` inside it is used.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use wayfind_fs::{resolve_config_file, DEFAULT_CONFIG_FILE};
///
/// let direct = resolve_config_file(Utf8Path::new("/data/engine.json"), DEFAULT_CONFIG_FILE);
/// assert_eq!(direct.as_str(), "/data/engine.json");
///
/// let dir = resolve_config_file(Utf8Path::new("/data/tiles"), DEFAULT_CONFIG_FILE);
/// assert_eq!(dir.as_str(), "/data/tiles/valhalla.json");
/// ```
#[must_use]
pub fn resolve_config_file(path: &Utf8Path, default_name: &str) -> Utf8PathBuf {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        path.to_path_buf()
    } else {
        path.join(default_name)
    }
}
