//! A one-shot importer for the USAF Bird Avoidance Model (BAM) rasters published by the Avian
//! Hazard Advisory System (AHAS). Downloads the zip of per-region ground-overlay descriptors,
//! fetches the raster image each one references, and georeferences every raster into a workspace
//! of GeoTIFF records stamped with WGS 84.
//!
//! Everything runs strictly in sequence; the first failing stage halts the whole run, leaving
//! whatever was already written on disk.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod configuration;
mod error;

pub use configuration::{load_configuration, Configuration, DEFAULT_ARCHIVE_URL};
pub use error::StageError;

use std::path::Path;

use anyhow::Result;

use georef::{GeoEngine, BAM_GEO_CORNERS, BAM_PIXEL_CORNERS};

/// All output records carry the WGS 1984 geographic coordinate system.
const WGS84_EPSG: u32 = 4326;

/// Runs the whole pipeline: download the archive, unzip it, fetch the raster behind every
/// descriptor, then warp every raster into the workspace. A rerun re-downloads everything and
/// overwrites in place.
pub async fn run(config: &Configuration, engine: &dyn GeoEngine) -> Result<(), StageError> {
    bamio::download_to_file(&config.archive_url, &config.archive_path)
        .await
        .map_err(StageError::Download)?;

    bamio::unzip(&config.archive_path, &config.kml_dir).map_err(StageError::Unzip)?;

    for path in bamio::list_dir(&config.kml_dir).map_err(StageError::Descriptor)? {
        info!("Extracting {}", path.display());
        extract_descriptor(&path, &config.images_dir)
            .await
            .map_err(StageError::Descriptor)?;
    }

    for path in bamio::list_dir(&config.images_dir).map_err(StageError::Georeference)? {
        info!("Georeferencing {}", path.display());
        georeference(engine, &path).map_err(StageError::Georeference)?;
    }

    Ok(())
}

/// Parses one descriptor and downloads the image it references.
async fn extract_descriptor(path: &Path, images_dir: &Path) -> Result<()> {
    let overlay = kml::load_ground_overlay(path)?;
    kml::fetch_overlay_image(&overlay, images_dir).await?;
    Ok(())
}

/// Warps one raster into the workspace and stamps its spatial reference.
fn georeference(engine: &dyn GeoEngine, image: &Path) -> Result<()> {
    let file_name = image
        .file_name()
        .and_then(|x| x.to_str())
        .ok_or_else(|| anyhow!("weird image path {}", image.display()))?;
    let record = georef::record_name(file_name);
    engine.warp(image, &record, &BAM_PIXEL_CORNERS, &BAM_GEO_CORNERS)?;
    engine.define_projection(&record, WGS84_EPSG)?;
    Ok(())
}
