//! Writing rendered pages and their index to disk

use anyhow::Context;
use std::path::{Path, PathBuf};
use track_atlas_lib::{RenderedPage, index_text};

use crate::settings::ImageFormat;

/// Name of the plain-text index written next to the pages
pub const INDEX_FILE: &str = "index.txt";

/// Write one image per page plus the index into `dir`, creating it if needed
///
/// Returns the paths of the written page images, in page order.
pub fn write_pages(
    dir: &Path,
    pages: &[RenderedPage],
    format: ImageFormat,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = dir.join(format!("{}.{}", page.encoded_name, format.extension()));
        page.image
            .save(&path)
            .with_context(|| format!("failed to write page {}", path.display()))?;
        tracing::info!(
            page = page.index + 1,
            missing_tiles = page.missing_tiles,
            "Wrote {}",
            path.display()
        );
        written.push(path);
    }

    let index_path = dir.join(INDEX_FILE);
    std::fs::write(&index_path, index_text(pages))
        .with_context(|| format!("failed to write index {}", index_path.display()))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use track_atlas_lib::{Corner, ElevationProfile, Raster};

    fn page(index: usize, name: &str) -> RenderedPage {
        RenderedPage {
            index,
            name: name.to_string(),
            encoded_name: track_atlas_lib::encode_name(name),
            description: "Through unknown (00)".to_string(),
            profile: ElevationProfile::from_samples(vec![0, 1], vec![0.0, 1.0], vec![10.0, 20.0]),
            legend_corner: Corner::TopLeft,
            track_points: 0,
            ticks: 0,
            missing_tiles: 0,
            image: Raster::from_pixel(40, 30, Rgb([10, 20, 30])),
        }
    }

    #[test]
    fn test_write_pages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("atlas");
        let pages = vec![page(0, "Stage 01: Gien"), page(1, "Stage 02: Briare")];

        let written = write_pages(&out, &pages, ImageFormat::Png).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("Stage_01-Gien.png"));

        let reloaded = image::open(&written[1]).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (40, 30));
        assert_eq!(*reloaded.get_pixel(3, 3), Rgb([10, 20, 30]));

        let index = std::fs::read_to_string(out.join(INDEX_FILE)).unwrap();
        assert!(index.starts_with("Stage 01: Gien\n--\nThrough unknown (00)\n"));
        assert!(index.contains("Stage 02: Briare"));
    }

    #[test]
    fn test_write_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_pages(dir.path(), &[page(0, "Stage 01: Gien")], ImageFormat::Jpg).unwrap();
        assert!(written[0].extension().is_some_and(|ext| ext == "jpg"));
        assert!(image::open(&written[0]).is_ok());
    }
}
