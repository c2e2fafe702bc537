// Copyright 2025 Niclas Hedam
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Simple file I/O operations

use crate::error::{PixVeilError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read an entire file into a byte vector
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write data to a file, creating it if it doesn't exist
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
    File::create(path)?.write_all(data)
}

/// Lists every `.png` file directly inside `dir`, in lexicographic order by
/// basename — the same ordering §4.7 uses to pick the map carrier and §4.8
/// uses to scan for the map prefix.
pub fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| PixVeilError::FileRead {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("png"))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        write_file(&path, b"some bytes").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"some bytes");
    }

    #[test]
    fn test_list_png_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path().join("b.png"), b"").unwrap();
        write_file(dir.path().join("a.png"), b"").unwrap();
        write_file(dir.path().join("notes.txt"), b"").unwrap();

        let files = list_png_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_list_png_files_missing_dir_is_file_read_error() {
        let result = list_png_files(Path::new("/nonexistent/dir"));
        assert!(matches!(result, Err(PixVeilError::FileRead { .. })));
    }
}
