//! Georeferencing for BAM rasters. The images arrive as bare PNGs with no spatial information,
//! but every one is published with the same pixel extent and drapes over the same continental
//! footprint, so a fixed set of four corner control points places all of them. This crate holds
//! those constants, the affine math, and the narrow seam to the geospatial engine that actually
//! writes the georeferenced records.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

#[cfg(feature = "gdal-backend")]
mod warp;

#[cfg(feature = "gdal-backend")]
pub use warp::GdalEngine;

use std::path::Path;

use anyhow::Result;

/// A point in WGS 84 degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }
}

/// A point in the unreferenced pixel space of a raster: column centers sit at integer x starting
/// from 0, and y decreases downward from the first row's center at 0. The top-left corner of the
/// image is therefore (-0.5, 0.5).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pt2D {
    pub x: f64,
    pub y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        Pt2D { x, y }
    }
}

/// The pixel-space corners of every BAM raster, ordered top-left, top-right, bottom-left,
/// bottom-right. They assume a 4331x1797 image.
pub const BAM_PIXEL_CORNERS: [Pt2D; 4] = [
    Pt2D { x: -0.5, y: 0.5 },
    Pt2D { x: 4330.5, y: 0.5 },
    Pt2D { x: -0.5, y: -1796.5 },
    Pt2D { x: 4330.5, y: -1796.5 },
];

/// The geographic footprint every BAM raster covers, same corner order.
pub const BAM_GEO_CORNERS: [LonLat; 4] = [
    LonLat {
        longitude: -179.77501667257,
        latitude: 71.7596743910802,
    },
    LonLat {
        longitude: -65.5369154883902,
        latitude: 71.7596743910802,
    },
    LonLat {
        longitude: -179.77501667257,
        latitude: 24.3665227454068,
    },
    LonLat {
        longitude: -65.5369154883902,
        latitude: 24.3665227454068,
    },
];

/// The narrow seam to the geospatial engine. The workspace all records land in is selected when
/// the engine is constructed. One implementation wraps GDAL; tests use a recording fake, so the
/// rest of the pipeline doesn't care which backend is present.
pub trait GeoEngine {
    /// Produces the named record in the workspace by warping the raster so that the four source
    /// pixel-space control points land on the four target geographic control points.
    fn warp(&self, input: &Path, record: &str, src: &[Pt2D; 4], tgt: &[LonLat; 4])
        -> Result<()>;

    /// Stamps the record's spatial reference.
    fn define_projection(&self, record: &str, epsg: u32) -> Result<()>;
}

/// Derives the output record name from a raster's file name: the ".png" suffix is stripped, and
/// every dash and space becomes an underscore.
pub fn record_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".png").unwrap_or(file_name);
    stem.replace('-', "_").replace(' ', "_")
}

/// The raster width and height implied by four pixel-space corners.
pub fn pixel_extent(src: &[Pt2D; 4]) -> (usize, usize) {
    (
        (src[1].x - src[0].x).round() as usize,
        (src[0].y - src[2].y).round() as usize,
    )
}

/// Computes the affine geotransform `[x origin, x pixel size, 0, y origin, 0, y pixel size]`
/// mapping the source pixel corners onto the target geographic corners. Both quads must be
/// axis-aligned rectangles in the same top-left, top-right, bottom-left, bottom-right order. The
/// origin is anchored at the outer edge of the top-left pixel, so the half-pixel inset of the
/// source corners cancels out.
pub fn affine_from_corners(src: &[Pt2D; 4], tgt: &[LonLat; 4]) -> Result<[f64; 6]> {
    if src[0].x != src[2].x || src[1].x != src[3].x || src[0].y != src[1].y || src[2].y != src[3].y
    {
        bail!("source control points don't form an axis-aligned rectangle");
    }
    if tgt[0].longitude != tgt[2].longitude
        || tgt[1].longitude != tgt[3].longitude
        || tgt[0].latitude != tgt[1].latitude
        || tgt[2].latitude != tgt[3].latitude
    {
        bail!("target control points don't form an axis-aligned rectangle");
    }
    let dx = src[1].x - src[0].x;
    let dy = src[0].y - src[2].y;
    if dx == 0.0 || dy == 0.0 {
        bail!("control points span a degenerate extent");
    }

    let x_size = (tgt[1].longitude - tgt[0].longitude) / dx;
    let y_size = (tgt[2].latitude - tgt[0].latitude) / dy;
    // Shift from the pixel-center convention of the control points to the top-left-corner origin
    // the transform is anchored at
    let x_origin = tgt[0].longitude - x_size * (src[0].x + 0.5);
    let y_origin = tgt[0].latitude + y_size * (src[0].y - 0.5);
    Ok([x_origin, x_size, 0.0, y_origin, 0.0, y_size])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bam_affine_matches_the_fixed_footprint() {
        let gt = affine_from_corners(&BAM_PIXEL_CORNERS, &BAM_GEO_CORNERS).unwrap();
        // The origin lands exactly on the north-west corner
        assert_eq!(gt[0], -179.77501667257);
        assert_eq!(gt[3], 71.7596743910802);
        // No rotation terms
        assert_eq!(gt[2], 0.0);
        assert_eq!(gt[4], 0.0);
        // Pixel sizes are the continental span divided by the assumed extent
        let x_size = (-65.5369154883902 - -179.77501667257) / 4331.0;
        let y_size = (24.3665227454068 - 71.7596743910802) / 1797.0;
        assert!((gt[1] - x_size).abs() < 1e-12);
        assert!((gt[5] - y_size).abs() < 1e-12);
        assert!(gt[5] < 0.0);
    }

    #[test]
    fn bam_extent_is_4331_by_1797() {
        assert_eq!(pixel_extent(&BAM_PIXEL_CORNERS), (4331, 1797));
    }

    #[test]
    fn record_names_are_filesystem_friendly() {
        for (input, expected) in [
            ("North-Central Region.png", "North_Central_Region"),
            ("Alaska.png", "Alaska"),
            ("Pacific Northwest.png", "Pacific_Northwest"),
            ("no_extension", "no_extension"),
        ] {
            assert_eq!(record_name(input), expected);
        }
    }

    #[test]
    fn skewed_control_points_are_rejected() {
        let mut src = BAM_PIXEL_CORNERS;
        src[2].x = 7.0;
        assert!(affine_from_corners(&src, &BAM_GEO_CORNERS).is_err());

        let mut tgt = BAM_GEO_CORNERS;
        tgt[3].latitude = 30.0;
        assert!(affine_from_corners(&BAM_PIXEL_CORNERS, &tgt).is_err());
    }

    #[test]
    fn degenerate_extent_is_rejected() {
        let src = [
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
        ];
        assert!(affine_from_corners(&src, &BAM_GEO_CORNERS).is_err());
    }
}
