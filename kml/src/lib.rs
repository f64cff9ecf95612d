//! Parses the ground-overlay descriptors the Bird Avoidance Model publishes, one .kml per
//! region, and fetches the raster image each one references.

#[macro_use]
extern crate anyhow;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A single ground overlay: an image draped over a fixed geographic footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundOverlay {
    /// The human-readable name of the overlay, used to name the downloaded image. The upstream
    /// names are trusted as-is; nothing sanitizes them for file-system use.
    pub name: String,
    /// The URL of the raster image.
    pub icon_href: String,
}

/// Parses a .kml descriptor and returns the single ground overlay it describes. The descriptors
/// have a fixed shape: exactly one GroundOverlay element with a nested Icon/href, and at least
/// one name element somewhere in the document.
pub fn load_ground_overlay(path: &Path) -> Result<GroundOverlay> {
    let raw_string = fs_err::read_to_string(path)?;
    parse_ground_overlay(&raw_string)
        .with_context(|| format!("extracting overlay from {}", path.display()))
}

fn parse_ground_overlay(raw_string: &str) -> Result<GroundOverlay> {
    let tree = roxmltree::Document::parse(raw_string)?;

    let overlays: Vec<roxmltree::Node> = tree
        .root()
        .descendants()
        .filter(|node| node.tag_name().name() == "GroundOverlay")
        .collect();
    let overlay = match overlays.len() {
        1 => overlays[0],
        n => bail!("expected exactly one GroundOverlay, found {}", n),
    };

    let icon = overlay
        .descendants()
        .find(|node| node.tag_name().name() == "Icon")
        .ok_or_else(|| anyhow!("GroundOverlay has no Icon"))?;
    let icon_href = icon
        .descendants()
        .find(|node| node.tag_name().name() == "href")
        .and_then(|node| node.text())
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    if icon_href.is_empty() {
        bail!("GroundOverlay's Icon has no href");
    }

    // The upstream files keep the region name in the first name element of the document, not
    // necessarily the one nested in the overlay
    let name = tree
        .root()
        .descendants()
        .find(|node| node.tag_name().name() == "name")
        .and_then(|node| node.text())
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        bail!("no name element found");
    }

    Ok(GroundOverlay { name, icon_href })
}

/// The path a descriptor's image gets downloaded to: `<images_dir>/<display name>.png`.
pub fn image_output_path(overlay: &GroundOverlay, images_dir: &Path) -> PathBuf {
    images_dir.join(format!("{}.png", overlay.name))
}

/// Downloads the raster image a descriptor references, named after the overlay's display name.
/// Returns the path of the downloaded image.
pub async fn fetch_overlay_image(
    overlay: &GroundOverlay,
    images_dir: &Path,
) -> Result<PathBuf> {
    let output = image_output_path(overlay, images_dir);
    bamio::download_to_file(&overlay.icon_href, &output).await?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_region_descriptor() {
        let overlay = parse_ground_overlay(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <GroundOverlay>
    <name>Region1</name>
    <Icon>
      <href>http://example/x.png</href>
    </Icon>
    <LatLonBox>
      <north>71.759674</north>
      <south>24.366523</south>
      <east>-65.536915</east>
      <west>-179.775017</west>
    </LatLonBox>
  </GroundOverlay>
</kml>"#,
        )
        .unwrap();
        assert_eq!(
            overlay,
            GroundOverlay {
                name: "Region1".to_string(),
                icon_href: "http://example/x.png".to_string(),
            }
        );
    }

    #[test]
    fn first_name_in_document_order_wins() {
        let overlay = parse_ground_overlay(
            r#"<kml>
  <Document>
    <name>North-Central Region</name>
    <GroundOverlay>
      <name>nested name</name>
      <Icon><href>http://example/nc.png</href></Icon>
    </GroundOverlay>
  </Document>
</kml>"#,
        )
        .unwrap();
        assert_eq!(overlay.name, "North-Central Region");
    }

    #[test]
    fn image_lands_under_the_display_name() {
        let overlay = GroundOverlay {
            name: "Region1".to_string(),
            icon_href: "http://example/x.png".to_string(),
        };
        assert_eq!(
            image_output_path(&overlay, Path::new("working/images")),
            Path::new("working/images/Region1.png")
        );
    }

    #[test]
    fn missing_ground_overlay_is_an_error() {
        let result = parse_ground_overlay(
            r#"<kml><Document><name>Region1</name></Document></kml>"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn two_ground_overlays_is_an_error() {
        let result = parse_ground_overlay(
            r#"<kml>
  <GroundOverlay><name>a</name><Icon><href>http://example/a.png</href></Icon></GroundOverlay>
  <GroundOverlay><name>b</name><Icon><href>http://example/b.png</href></Icon></GroundOverlay>
</kml>"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_href_is_an_error() {
        let result = parse_ground_overlay(
            r#"<kml><GroundOverlay><name>Region1</name><Icon><href></href></Icon></GroundOverlay></kml>"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_name_is_an_error() {
        let result = parse_ground_overlay(
            r#"<kml><GroundOverlay><Icon><href>http://example/x.png</href></Icon></GroundOverlay></kml>"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(parse_ground_overlay("this is not xml <<<").is_err());
    }
}
