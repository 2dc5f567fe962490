use thiserror::Error;

/// Fixed-size grid of palette indices, stored row-major.
/// - Cell `(column, row)` lives at `row * columns + column`.
/// - Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl TileGrid {
    pub fn new(columns: u32, rows: u32, tiles: Vec<u16>) -> Result<Self, TileGridError> {
        let expected = columns as usize * rows as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TileGridError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            columns,
            rows,
            tiles,
        })
    }

    pub fn from_rows(rows: Vec<Vec<u16>>) -> Result<Self, TileGridError> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        let mut tiles = Vec::with_capacity(columns * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(TileGridError::RaggedRow {
                    row: index,
                    expected: columns,
                    actual: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }
        Self::new(columns as u32, rows.len() as u32, tiles)
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn index_of(&self, column: u32, row: u32) -> Option<usize> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(row as usize * self.columns as usize + column as usize)
    }

    pub fn tile_at(&self, column: u32, row: u32) -> Option<u16> {
        self.index_of(column, row)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, u16)> + '_ {
        let columns = self.columns.max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| {
                let index = index as u32;
                (index % columns, index / columns, *tile)
            })
    }

    pub fn max_tile(&self) -> Option<u16> {
        self.tiles.iter().copied().max()
    }
}
