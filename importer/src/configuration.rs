use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The zip of per-region overlay descriptors published by AHAS.
pub const DEFAULT_ARCHIVE_URL: &str = "http://www.usahas.com/Downloads/GE_BAM.zip";

/// Everything the pipeline needs to know up front: where the archive comes from, and the fixed
/// layout of paths everything lands under. Nothing else is read from the environment.
#[derive(Clone)]
pub struct Configuration {
    pub archive_url: String,
    /// Where the downloaded archive is saved.
    pub archive_path: PathBuf,
    /// The descriptor files are extracted here.
    pub kml_dir: PathBuf,
    /// The raster images are downloaded here, one per descriptor.
    pub images_dir: PathBuf,
    /// The workspace the georeferenced records are written into.
    pub workspace_dir: PathBuf,
}

/// What importer.toml may override.
#[derive(Deserialize)]
struct RawConfiguration {
    archive_url: Option<String>,
    working_dir: Option<PathBuf>,
}

impl Configuration {
    /// Lays out the fixed directory structure under one working directory.
    pub fn new(archive_url: String, working_dir: &Path) -> Configuration {
        Configuration {
            archive_url,
            archive_path: working_dir.join("GE_BAM.zip"),
            kml_dir: working_dir.join("kmls"),
            images_dir: working_dir.join("images"),
            workspace_dir: working_dir.join("bam_workspace"),
        }
    }
}

/// Reads importer.toml from the current directory if it exists; anything missing or malformed
/// falls back to the defaults.
pub fn load_configuration() -> Configuration {
    match fs_err::read_to_string("importer.toml") {
        Ok(text) => match toml::from_str::<RawConfiguration>(&text) {
            Ok(raw) => fill_in_defaults(raw),
            Err(_) => default_configuration(),
        },
        Err(_) => default_configuration(),
    }
}

fn default_configuration() -> Configuration {
    Configuration::new(DEFAULT_ARCHIVE_URL.to_string(), Path::new("working"))
}

fn fill_in_defaults(raw: RawConfiguration) -> Configuration {
    Configuration::new(
        raw.archive_url
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string()),
        &raw.working_dir.unwrap_or_else(|| PathBuf::from("working")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_lay_out_the_working_directory() {
        let config = default_configuration();
        assert_eq!(config.archive_url, DEFAULT_ARCHIVE_URL);
        assert_eq!(config.archive_path, Path::new("working/GE_BAM.zip"));
        assert_eq!(config.kml_dir, Path::new("working/kmls"));
        assert_eq!(config.images_dir, Path::new("working/images"));
        assert_eq!(config.workspace_dir, Path::new("working/bam_workspace"));
    }

    #[test]
    fn partial_overrides_keep_the_other_defaults() {
        let raw: RawConfiguration =
            toml::from_str("archive_url = \"http://example/other.zip\"").unwrap();
        let config = fill_in_defaults(raw);
        assert_eq!(config.archive_url, "http://example/other.zip");
        assert_eq!(config.kml_dir, Path::new("working/kmls"));

        let raw: RawConfiguration = toml::from_str("working_dir = \"elsewhere\"").unwrap();
        let config = fill_in_defaults(raw);
        assert_eq!(config.archive_url, DEFAULT_ARCHIVE_URL);
        assert_eq!(config.archive_path, Path::new("elsewhere/GE_BAM.zip"));
    }
}
