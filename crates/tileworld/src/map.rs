use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::grid::{TileGrid, TileGridError};
use crate::palette::{PaletteError, SheetPalette};
use crate::world::{TileWorld, TileWorldError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteDesc {
    /// Sheet image path, relative to the map file.
    pub sheet: String,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldMapDesc {
    pub palette: PaletteDesc,
    #[serde(default)]
    pub collision_palette: Option<PaletteDesc>,
    /// Rows of palette indices, top row first.
    pub tiles: Vec<Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetPathError {
    #[error("sheet path must not be empty")]
    Empty,
    #[error("sheet path must not start with '/'")]
    LeadingSlash,
    #[error("sheet path must not contain '\\\\'")]
    Backslash,
    #[error("sheet path must not contain '..'")]
    ParentTraversal,
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read world map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid world map json at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid sheet path {sheet:?}: {source}")]
    InvalidSheetPath {
        sheet: String,
        #[source]
        source: SheetPathError,
    },
    #[error(transparent)]
    Grid(#[from] TileGridError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    World(#[from] TileWorldError),
}

pub fn parse_world_map_json(raw: &str) -> Result<WorldMapDesc, MapLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldMapDesc>(&mut deserializer).map_err(|error| {
        let location = error.path().to_string();
        let location = if location.is_empty() || location == "." {
            "<root>".to_string()
        } else {
            location
        };
        MapLoadError::Parse {
            location,
            source: error.into_inner(),
        }
    })
}

/// Reads a map file and builds its world; sheet paths resolve against the
/// map file's directory.
pub fn load_world_map(path: &Path) -> Result<TileWorld<SheetPalette>, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let desc = parse_world_map_json(&raw)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let world = build_world(&desc, base_dir)?;
    info!(
        path = %path.display(),
        columns = world.grid().columns(),
        rows = world.grid().rows(),
        width_px = world.width(),
        height_px = world.height(),
        has_collision_palette = world.collision_palette().is_some(),
        "world_map_loaded"
    );
    Ok(world)
}

pub fn build_world(
    desc: &WorldMapDesc,
    base_dir: &Path,
) -> Result<TileWorld<SheetPalette>, MapLoadError> {
    let grid = TileGrid::from_rows(desc.tiles.clone())?;
    let palette = load_palette(&desc.palette, base_dir)?;
    let mut world = TileWorld::new(palette, grid)?;
    if let Some(collision_desc) = &desc.collision_palette {
        world.set_collision_palette(load_palette(collision_desc, base_dir)?)?;
    }
    Ok(world)
}

fn load_palette(desc: &PaletteDesc, base_dir: &Path) -> Result<SheetPalette, MapLoadError> {
    let sheet_path = resolve_sheet_path(base_dir, &desc.sheet)?;
    Ok(SheetPalette::load(
        &sheet_path,
        desc.tile_width,
        desc.tile_height,
    )?)
}

fn resolve_sheet_path(base_dir: &Path, sheet: &str) -> Result<PathBuf, MapLoadError> {
    validate_sheet_path(sheet).map_err(|source| MapLoadError::InvalidSheetPath {
        sheet: sheet.to_string(),
        source,
    })?;
    Ok(base_dir.join(sheet))
}

pub(crate) fn validate_sheet_path(sheet: &str) -> Result<(), SheetPathError> {
    if sheet.is_empty() {
        return Err(SheetPathError::Empty);
    }
    if sheet.starts_with('/') {
        return Err(SheetPathError::LeadingSlash);
    }
    if sheet.contains('\\') {
        return Err(SheetPathError::Backslash);
    }
    if sheet.split('/').any(|segment| segment == "..") {
        return Err(SheetPathError::ParentTraversal);
    }
    Ok(())
}
