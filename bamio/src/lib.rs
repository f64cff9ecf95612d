//! File and network I/O for the BAM import pipeline: fetching resources over HTTP, unpacking the
//! archive they arrive in, and walking the working directories.

#[macro_use]
extern crate log;

mod download;
mod unzip;

pub use download::{download_bytes, download_to_file};
pub use unzip::unzip;

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Lists the files directly inside a directory, sorted by name. Subdirectories are skipped.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs_err::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Formats a count with comma separators for log messages.
pub fn prettyprint_usize(x: usize) -> String {
    let num = x.to_string();
    let mut result = String::new();
    for (i, c) in num.chars().enumerate() {
        if i > 0 && (num.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
