use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use zip::ZipArchive;

/// Extracts every entry of a zip archive into a directory, creating it if needed. Entries
/// overwrite existing files with the same name. Returns the number of files extracted. On
/// failure, entries already extracted are left on disk.
pub fn unzip(archive: &Path, out_dir: &Path) -> Result<usize> {
    info!("Unzipping {}", archive.display());
    fs_err::create_dir_all(out_dir)?;

    let file = fs_err::File::open(archive)?;
    let mut zip =
        ZipArchive::new(file).with_context(|| format!("opening {}", archive.display()))?;

    let mut count = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        // Entries that escape out_dir (absolute paths, ..) are hostile
        let name = match entry.enclosed_name() {
            Some(path) => path.to_owned(),
            None => bail!(
                "{} has an entry with an unusable path: {}",
                archive.display(),
                entry.name()
            ),
        };
        let out_path = out_dir.join(name);
        if entry.is_dir() {
            fs_err::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs_err::create_dir_all(parent)?;
            }
            let mut out = fs_err::File::create(&out_path)?;
            io::copy(&mut entry, &mut out)
                .with_context(|| format!("extracting {}", out_path.display()))?;
            count += 1;
        }
    }
    info!("Extracted {} files to {}", count, out_dir.display());
    Ok(count)
}
