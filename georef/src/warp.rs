use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, Driver};

use crate::{affine_from_corners, pixel_extent, GeoEngine, LonLat, Pt2D};

/// Georeferences rasters into a workspace directory of GeoTIFF records, one per raster. A warped
/// record stays open until its spatial reference is defined, then it's flushed to disk.
pub struct GdalEngine {
    workspace: PathBuf,
    open_records: RefCell<BTreeMap<String, Dataset>>,
}

impl GdalEngine {
    /// Selects the workspace all records will be written into, creating the directory if needed.
    pub fn new(workspace: &Path) -> Result<GdalEngine> {
        fs_err::create_dir_all(workspace)?;
        Ok(GdalEngine {
            workspace: workspace.to_path_buf(),
            open_records: RefCell::new(BTreeMap::new()),
        })
    }

    fn record_path(&self, record: &str) -> PathBuf {
        self.workspace.join(format!("{}.tif", record))
    }
}

impl GeoEngine for GdalEngine {
    fn warp(
        &self,
        input: &Path,
        record: &str,
        src: &[Pt2D; 4],
        tgt: &[LonLat; 4],
    ) -> Result<()> {
        let src_dataset =
            Dataset::open(input).with_context(|| format!("opening {}", input.display()))?;

        // The control points are fixed per run; a raster of a different size still warps, just
        // stretched to the same footprint.
        let (expected_width, expected_height) = pixel_extent(src);
        let (actual_width, actual_height) = src_dataset.raster_size();
        if (actual_width, actual_height) != (expected_width, expected_height) {
            warn!(
                "{} is {}x{}, but the control points assume {}x{}; the output will be stretched",
                input.display(),
                actual_width,
                actual_height,
                expected_width,
                expected_height
            );
        }

        let transform = affine_from_corners(src, tgt)?;
        let out_path = self.record_path(record);
        let driver = Driver::get("GTiff")?;
        let out_dataset = src_dataset
            .create_copy(&driver, &out_path.display().to_string())
            .with_context(|| format!("creating record {}", out_path.display()))?;
        out_dataset.set_geo_transform(&transform)?;

        info!("Warped {} into {}", input.display(), out_path.display());
        self.open_records
            .borrow_mut()
            .insert(record.to_string(), out_dataset);
        Ok(())
    }

    fn define_projection(&self, record: &str, epsg: u32) -> Result<()> {
        let dataset = match self.open_records.borrow_mut().remove(record) {
            Some(dataset) => dataset,
            None => bail!("no warped record named {}", record),
        };
        let srs = SpatialRef::from_epsg(epsg)?;
        dataset.set_projection(&srs.to_wkt()?)?;
        // Dropping the dataset flushes and closes the record
        Ok(())
    }
}
