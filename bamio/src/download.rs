use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::prettyprint_usize;

/// Downloads bytes from a URL. This must be called with a tokio runtime somewhere.
pub async fn download_bytes<I: AsRef<str>>(url: I) -> Result<Vec<u8>> {
    let url = url.as_ref();
    info!("Downloading {}", url);
    let mut resp = reqwest::get(url)
        .await
        .with_context(|| format!("downloading {}", url))?;
    resp.error_for_status_ref()
        .with_context(|| format!("downloading {}", url))?;

    let mut bytes = Vec::new();
    while let Some(chunk) = resp
        .chunk()
        .await
        .with_context(|| format!("reading response from {}", url))?
    {
        bytes.write_all(&chunk)?;
    }
    info!("Got {} bytes from {}", prettyprint_usize(bytes.len()), url);
    Ok(bytes)
}

/// Downloads a file, overwriting anything already at that path. This must be called with a tokio
/// runtime somewhere.
pub async fn download_to_file<I: AsRef<str>>(url: I, path: &Path) -> Result<()> {
    let bytes = download_bytes(url).await?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    let mut file = fs_err::File::create(path)?;
    file.write_all(&bytes)?;
    info!("Saved {}", path.display());
    Ok(())
}
