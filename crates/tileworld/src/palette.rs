use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::frame::{rgba_len, Frame, RgbaView};
use crate::geometry::{Color, Rect};

/// Collection of equally sized tile images addressed by index.
pub trait TilePalette {
    fn tile_width(&self) -> u32;

    fn tile_height(&self) -> u32;

    fn tile_count(&self) -> usize;

    /// Draws `tile` into `dest`, given in screen pixels.
    fn draw(&self, tile: u16, dest: Rect, frame: &mut Frame<'_>) -> Result<(), PaletteError>;

    /// Colour of pixel (`x`, `y`) inside `tile`, relative to the tile's top-left corner.
    fn pixel_color(&self, tile: u16, x: u32, y: u32) -> Result<Color, PaletteError>;
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("tile size must be non-zero, got {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },
    #[error(
        "sheet {sheet_width}x{sheet_height} is smaller than one {tile_width}x{tile_height} tile"
    )]
    SheetTooSmall {
        sheet_width: u32,
        sheet_height: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("sheet rgba length mismatch: expected {expected}, got {actual}")]
    RgbaLengthMismatch { expected: usize, actual: usize },
    #[error("tile index {tile} out of range for palette of {tile_count} tiles")]
    TileOutOfRange { tile: u16, tile_count: usize },
    #[error("pixel ({x}, {y}) outside {tile_width}x{tile_height} tile")]
    PixelOutOfRange {
        x: u32,
        y: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("failed to open tile sheet {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode tile sheet {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Palette backed by a single sprite sheet. Tiles are laid out left to right,
/// top to bottom; partial tiles at the right and bottom edges are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPalette {
    sheet_width: u32,
    sheet_height: u32,
    rgba: Vec<u8>,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    tile_count: usize,
}

impl SheetPalette {
    pub fn from_rgba(
        sheet_width: u32,
        sheet_height: u32,
        rgba: Vec<u8>,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, PaletteError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(PaletteError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let expected = rgba_len(sheet_width, sheet_height);
        if rgba.len() != expected {
            return Err(PaletteError::RgbaLengthMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        let columns = sheet_width / tile_width;
        let rows = sheet_height / tile_height;
        if columns == 0 || rows == 0 {
            return Err(PaletteError::SheetTooSmall {
                sheet_width,
                sheet_height,
                tile_width,
                tile_height,
            });
        }
        // Indices are u16; anything past u16::MAX can never be addressed.
        let tile_count = (columns as usize * rows as usize).min(u16::MAX as usize + 1);
        Ok(Self {
            sheet_width,
            sheet_height,
            rgba,
            tile_width,
            tile_height,
            columns,
            tile_count,
        })
    }

    pub fn load(path: &Path, tile_width: u32, tile_height: u32) -> Result<Self, PaletteError> {
        let reader = ImageReader::open(path).map_err(|source| PaletteError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| PaletteError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        let (sheet_width, sheet_height) = image.dimensions();
        let palette = Self::from_rgba(
            sheet_width,
            sheet_height,
            image.into_raw(),
            tile_width,
            tile_height,
        )?;
        debug!(
            path = %path.display(),
            sheet_width,
            sheet_height,
            tile_width,
            tile_height,
            tile_count = palette.tile_count,
            "tile_palette_loaded"
        );
        Ok(palette)
    }

    /// Top-left sheet pixel of `tile`.
    pub fn tile_origin(&self, tile: u16) -> Option<(u32, u32)> {
        if tile as usize >= self.tile_count {
            return None;
        }
        let tile = tile as u32;
        Some((
            (tile % self.columns) * self.tile_width,
            (tile / self.columns) * self.tile_height,
        ))
    }

    fn checked_origin(&self, tile: u16) -> Result<(u32, u32), PaletteError> {
        self.tile_origin(tile).ok_or(PaletteError::TileOutOfRange {
            tile,
            tile_count: self.tile_count,
        })
    }
}

impl TilePalette for SheetPalette {
    fn tile_width(&self) -> u32 {
        self.tile_width
    }

    fn tile_height(&self) -> u32 {
        self.tile_height
    }

    fn tile_count(&self) -> usize {
        self.tile_count
    }

    fn draw(&self, tile: u16, dest: Rect, frame: &mut Frame<'_>) -> Result<(), PaletteError> {
        let (origin_x, origin_y) = self.checked_origin(tile)?;
        let source = RgbaView {
            rgba: &self.rgba,
            width: self.sheet_width,
            height: self.sheet_height,
        };
        let source_rect = Rect::new(
            origin_x as i32,
            origin_y as i32,
            self.tile_width,
            self.tile_height,
        );
        frame.blit_scaled(source, source_rect, dest);
        Ok(())
    }

    fn pixel_color(&self, tile: u16, x: u32, y: u32) -> Result<Color, PaletteError> {
        let (origin_x, origin_y) = self.checked_origin(tile)?;
        if x >= self.tile_width || y >= self.tile_height {
            return Err(PaletteError::PixelOutOfRange {
                x,
                y,
                tile_width: self.tile_width,
                tile_height: self.tile_height,
            });
        }
        let sheet_x = (origin_x + x) as usize;
        let sheet_y = (origin_y + y) as usize;
        let offset = (sheet_y * self.sheet_width as usize + sheet_x) * 4;
        let bytes = &self.rgba[offset..offset + 4];
        Ok(Color::rgba(bytes[0], bytes[1], bytes[2], bytes[3]))
    }
}
