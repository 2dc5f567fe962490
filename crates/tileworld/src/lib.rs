mod camera;
mod frame;
mod geometry;
mod grid;
mod map;
mod palette;
mod world;

pub use camera::{Camera, Camera2D, Viewport};
pub use frame::{Frame, FrameError, RgbaView};
pub use geometry::{Color, Rect, Vec2};
pub use grid::{TileGrid, TileGridError};
pub use map::{
    build_world, load_world_map, parse_world_map_json, MapLoadError, PaletteDesc, SheetPathError,
    WorldMapDesc,
};
pub use palette::{PaletteError, SheetPalette, TilePalette};
pub use world::{CellRange, DrawStats, TileWorld, TileWorldError, World};
