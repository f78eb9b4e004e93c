#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const LISTING_HEADER: &str = "Shopping Mall,Brand,Model Name,Screen Size,Display Type,Resolution,Refresh Rate,Brightness,Platform,Price,Features,Image,URL";

/// Builds a listing CSV with the full required header row. Each row is
/// given as (mall, brand, model, size, display, resolution, price); the
/// remaining columns are filled with plausible constants.
pub fn listing_csv(rows: &[(&str, &str, &str, &str, &str, &str, &str)]) -> String {
    let mut contents = String::from(LISTING_HEADER);
    contents.push('\n');
    for (mall, brand, model, size, display, resolution, price) in rows {
        contents.push_str(&format!(
            "{mall},{brand},{model},{size},{display},{resolution},120Hz,500 nits,WebOS,\"{price}\",HDR10,https://img.example.com/{model}.jpg,https://shop.example.com/{model}\n"
        ));
    }
    contents
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
