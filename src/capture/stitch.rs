//! Compositing tiles onto one full-height canvas.

use super::tiles::Tile;
use crate::error::StitchError;
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tracing::{debug, instrument};

/// Largest RGBA canvas the stitcher will allocate, in bytes
pub const MAX_CANVAS_BYTES: u64 = 1 << 31;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Encoded full-page raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchedImage {
    /// PNG bytes
    pub data: Vec<u8>,
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
}

/// Stitches tiles into a single image
pub struct ImageStitcher;

impl ImageStitcher {
    /// Paste `tiles` at `(0, offset)` on a white `viewport_width` x
    /// `total_height` canvas, in the given order, and encode it as PNG.
    ///
    /// Where two tiles overlap, the later one wins. Tiles reaching past the
    /// canvas bottom are clipped.
    #[instrument(skip(tiles), fields(tile_count = tiles.len()))]
    pub fn stitch(
        tiles: Vec<Tile>,
        total_height: u32,
        viewport_width: u32,
    ) -> Result<StitchedImage, StitchError> {
        if tiles.is_empty() {
            return Err(StitchError::NoTiles);
        }

        let mut canvas = Self::allocate(viewport_width, total_height)?;

        for tile in tiles {
            let raster = image::load_from_memory(&tile.data)
                .map_err(|e| StitchError::DecodeFailed {
                    offset: tile.offset,
                    reason: e.to_string(),
                })?
                .to_rgba8();

            debug!(
                "Compositing {}x{} tile at y={}",
                raster.width(),
                raster.height(),
                tile.offset
            );
            imageops::replace(&mut canvas, &raster, 0, i64::from(tile.offset));
        }

        let data = Self::encode(&canvas)?;
        Ok(StitchedImage {
            data,
            width: viewport_width,
            height: total_height,
        })
    }

    fn allocate(width: u32, height: u32) -> Result<RgbaImage, StitchError> {
        if width == 0 || height == 0 {
            return Err(StitchError::EmptyCanvas { width, height });
        }

        let bytes = u64::from(width) * u64::from(height) * 4;
        if bytes > MAX_CANVAS_BYTES {
            return Err(StitchError::CanvasTooLarge {
                width,
                height,
                limit: MAX_CANVAS_BYTES,
            });
        }

        Ok(RgbaImage::from_pixel(width, height, BACKGROUND))
    }

    fn encode(canvas: &RgbaImage) -> Result<Vec<u8>, StitchError> {
        let mut buffer = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| StitchError::EncodeFailed(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_tile(width: u32, height: u32, color: [u8; 4], offset: u32) -> Tile {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        Tile { data, offset }
    }

    #[test]
    fn test_empty_tiles_rejected() {
        assert_eq!(
            ImageStitcher::stitch(Vec::new(), 100, 100),
            Err(StitchError::NoTiles)
        );
    }

    #[test]
    fn test_zero_height_rejected() {
        let tiles = vec![solid_tile(4, 4, [0, 0, 0, 255], 0)];
        assert!(matches!(
            ImageStitcher::stitch(tiles, 0, 4),
            Err(StitchError::EmptyCanvas { .. })
        ));
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let tiles = vec![solid_tile(4, 4, [0, 0, 0, 255], 0)];
        assert!(matches!(
            ImageStitcher::stitch(tiles, u32::MAX, 1366),
            Err(StitchError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_garbage_tile_is_decode_error() {
        let tiles = vec![Tile {
            data: b"not a png".to_vec(),
            offset: 40,
        }];
        assert!(matches!(
            ImageStitcher::stitch(tiles, 100, 10),
            Err(StitchError::DecodeFailed { offset: 40, .. })
        ));
    }

    #[test]
    fn test_uncovered_rows_stay_white() {
        let tiles = vec![solid_tile(10, 10, [255, 0, 0, 255], 0)];
        let out = ImageStitcher::stitch(tiles, 30, 10).unwrap();
        let img = image::load_from_memory(&out.data).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 25), &BACKGROUND);
    }
}
