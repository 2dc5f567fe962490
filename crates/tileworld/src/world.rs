use thiserror::Error;
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::frame::Frame;
use crate::geometry::{Color, Rect, Vec2};
use crate::grid::TileGrid;
use crate::palette::{PaletteError, SheetPalette, TilePalette};

/// A drawable world with a pixel size and an optional collision lookup.
pub trait World {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn draw(&self, camera: &dyn Camera, frame: &mut Frame<'_>)
        -> Result<DrawStats, TileWorldError>;

    fn collision_color_at(&self, position: Vec2) -> Result<Color, TileWorldError>;
}

#[derive(Debug, Error)]
pub enum TileWorldError {
    #[error("palette tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
    #[error("cell ({column}, {row}) uses tile {tile} but the palette has {tile_count} tiles")]
    TileOutOfRange {
        column: u32,
        row: u32,
        tile: u16,
        tile_count: usize,
    },
    #[error(
        "collision palette tile size {actual_width}x{actual_height} differs from \
         world tile size {expected_width}x{expected_height}"
    )]
    CollisionTileSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error(
        "cell ({column}, {row}) uses tile {tile} but the collision palette has {tile_count} tiles"
    )]
    CollisionTileOutOfRange {
        column: u32,
        row: u32,
        tile: u16,
        tile_count: usize,
    },
    #[error("no collision palette attached to the world")]
    NoCollisionPalette,
    #[error("position ({x}, {y}) is outside the world")]
    PositionOutOfBounds { x: f32, y: f32 },
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Cells inside the camera's view range.
    pub visited: usize,
    /// Cells the camera reported visible and the palette drew.
    pub drawn: usize,
}

/// Inclusive cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub column_min: u32,
    pub column_max: u32,
    pub row_min: u32,
    pub row_max: u32,
}

/// Grid of palette indices rendered through a [`TilePalette`], with an
/// optional second palette of the same tile size for collision lookups.
#[derive(Debug, Clone)]
pub struct TileWorld<P: TilePalette = SheetPalette> {
    grid: TileGrid,
    palette: P,
    collision_palette: Option<P>,
}

impl<P: TilePalette> TileWorld<P> {
    pub fn new(palette: P, grid: TileGrid) -> Result<Self, TileWorldError> {
        let (tile_width, tile_height) = (palette.tile_width(), palette.tile_height());
        if tile_width == 0 || tile_height == 0 {
            return Err(TileWorldError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        if let Some((column, row, tile)) = first_tile_outside(&grid, palette.tile_count()) {
            return Err(TileWorldError::TileOutOfRange {
                column,
                row,
                tile,
                tile_count: palette.tile_count(),
            });
        }
        debug!(
            columns = grid.columns(),
            rows = grid.rows(),
            tile_width,
            tile_height,
            "tile_world_created"
        );
        Ok(Self {
            grid,
            palette,
            collision_palette: None,
        })
    }

    pub fn with_collision_palette(mut self, collision_palette: P) -> Result<Self, TileWorldError> {
        self.set_collision_palette(collision_palette)?;
        Ok(self)
    }

    /// Attaches `collision_palette`, returning the one it replaces.
    pub fn set_collision_palette(
        &mut self,
        collision_palette: P,
    ) -> Result<Option<P>, TileWorldError> {
        let (actual_width, actual_height) = (
            collision_palette.tile_width(),
            collision_palette.tile_height(),
        );
        if actual_width != self.tile_width() || actual_height != self.tile_height() {
            return Err(TileWorldError::CollisionTileSizeMismatch {
                expected_width: self.tile_width(),
                expected_height: self.tile_height(),
                actual_width,
                actual_height,
            });
        }
        let tile_count = collision_palette.tile_count();
        if let Some((column, row, tile)) = first_tile_outside(&self.grid, tile_count) {
            return Err(TileWorldError::CollisionTileOutOfRange {
                column,
                row,
                tile,
                tile_count,
            });
        }
        debug!(tile_count, "collision_palette_attached");
        Ok(self.collision_palette.replace(collision_palette))
    }

    pub fn take_collision_palette(&mut self) -> Option<P> {
        self.collision_palette.take()
    }

    pub fn collision_palette(&self) -> Option<&P> {
        self.collision_palette.as_ref()
    }

    pub fn palette(&self) -> &P {
        &self.palette
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tile_width(&self) -> u32 {
        self.palette.tile_width()
    }

    pub fn tile_height(&self) -> u32 {
        self.palette.tile_height()
    }

    pub fn width(&self) -> u32 {
        self.grid.columns().saturating_mul(self.tile_width())
    }

    pub fn height(&self) -> u32 {
        self.grid.rows().saturating_mul(self.tile_height())
    }

    /// World-space rectangle covered by cell (`column`, `row`).
    pub fn tile_rect(&self, column: u32, row: u32) -> Rect {
        let (tile_width, tile_height) = (self.tile_width(), self.tile_height());
        Rect::new(
            saturating_i32(column as i64 * tile_width as i64),
            saturating_i32(row as i64 * tile_height as i64),
            tile_width,
            tile_height,
        )
    }

    /// Cells whose rectangles can intersect `view`, clamped to the grid.
    pub fn visible_cells(&self, view: Rect) -> Option<CellRange> {
        if self.grid.is_empty() || view.is_empty() {
            return None;
        }
        let tile_width = self.tile_width() as i64;
        let tile_height = self.tile_height() as i64;
        let raw_column_min = (view.x as i64).div_euclid(tile_width);
        let raw_column_max = (view.right() as i64 - 1).div_euclid(tile_width);
        let raw_row_min = (view.y as i64).div_euclid(tile_height);
        let raw_row_max = (view.bottom() as i64 - 1).div_euclid(tile_height);

        let column_min = raw_column_min.max(0);
        let column_max = raw_column_max.min(self.grid.columns() as i64 - 1);
        let row_min = raw_row_min.max(0);
        let row_max = raw_row_max.min(self.grid.rows() as i64 - 1);
        if column_min > column_max || row_min > row_max {
            return None;
        }
        Some(CellRange {
            column_min: column_min as u32,
            column_max: column_max as u32,
            row_min: row_min as u32,
            row_max: row_max as u32,
        })
    }

    pub fn draw<C: Camera + ?Sized>(
        &self,
        camera: &C,
        frame: &mut Frame<'_>,
    ) -> Result<DrawStats, TileWorldError> {
        let mut stats = DrawStats::default();
        let Some(range) = self.visible_cells(camera.view_rect()) else {
            trace!(visited = 0, drawn = 0, "tile_world_drawn");
            return Ok(stats);
        };

        for row in range.row_min..=range.row_max {
            for column in range.column_min..=range.column_max {
                let Some(tile) = self.grid.tile_at(column, row) else {
                    continue;
                };
                stats.visited += 1;
                let dest = self.tile_rect(column, row);
                if !camera.is_visible(dest) {
                    continue;
                }
                self.palette
                    .draw(tile, camera.world_to_screen(dest), frame)?;
                stats.drawn += 1;
            }
        }
        trace!(
            visited = stats.visited,
            drawn = stats.drawn,
            "tile_world_drawn"
        );
        Ok(stats)
    }

    /// Cell owning `position`, or `None` outside the grid.
    pub fn cell_at(&self, position: Vec2) -> Option<(u32, u32)> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / self.tile_width() as f32).floor();
        let row = (position.y / self.tile_height() as f32).floor();
        if column >= self.grid.columns() as f32 || row >= self.grid.rows() as f32 {
            return None;
        }
        Some((column as u32, row as u32))
    }

    pub fn tile_index_at(&self, position: Vec2) -> Result<u16, TileWorldError> {
        self.cell_at(position)
            .and_then(|(column, row)| self.grid.tile_at(column, row))
            .ok_or(TileWorldError::PositionOutOfBounds {
                x: position.x,
                y: position.y,
            })
    }

    pub fn collision_color_at(&self, position: Vec2) -> Result<Color, TileWorldError> {
        let collision_palette = self
            .collision_palette
            .as_ref()
            .ok_or(TileWorldError::NoCollisionPalette)?;
        let tile = self.tile_index_at(position)?;
        let local_x = position.x.floor() as u32 % collision_palette.tile_width();
        let local_y = position.y.floor() as u32 % collision_palette.tile_height();
        Ok(collision_palette.pixel_color(tile, local_x, local_y)?)
    }
}

impl<P: TilePalette> World for TileWorld<P> {
    fn width(&self) -> u32 {
        TileWorld::width(self)
    }

    fn height(&self) -> u32 {
        TileWorld::height(self)
    }

    fn draw(
        &self,
        camera: &dyn Camera,
        frame: &mut Frame<'_>,
    ) -> Result<DrawStats, TileWorldError> {
        TileWorld::draw(self, camera, frame)
    }

    fn collision_color_at(&self, position: Vec2) -> Result<Color, TileWorldError> {
        TileWorld::collision_color_at(self, position)
    }
}

fn first_tile_outside(grid: &TileGrid, tile_count: usize) -> Option<(u32, u32, u16)> {
    grid.iter_cells()
        .find(|(_, _, tile)| *tile as usize >= tile_count)
}

fn saturating_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
