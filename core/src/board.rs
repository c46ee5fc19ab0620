use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square grid of tiles for one round.
///
/// Boards are values: every reveal produces a new board and leaves the previous one untouched, so older snapshots stay
/// valid for as long as anyone holds them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid_size: Coord,
    tiles: Array2<Tile>,
    mine_count: CellCount,
}

impl Board {
    pub(crate) fn from_tiles(grid_size: Coord, tiles: Array2<Tile>) -> Self {
        let mine_count = tiles.iter().filter(|tile| tile.is_mine()).count() as CellCount;
        Self {
            grid_size,
            tiles,
            mine_count,
        }
    }

    /// Board with mines at exactly `mine_coords`, everything hidden.
    pub fn from_mine_coords(grid_size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let size = (grid_size, grid_size);
        let mut tiles: Array2<Tile> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= grid_size || coords.1 >= grid_size {
                return Err(GameError::InvalidCoords);
            }
            tiles[coords.to_nd_index()] = Tile::hidden(TileKind::Mine);
        }

        Ok(Self::from_tiles(grid_size, tiles))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.grid_size && coords.1 < self.grid_size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn grid_size(&self) -> Coord {
        self.grid_size
    }

    pub fn total_tiles(&self) -> CellCount {
        mult(self.grid_size, self.grid_size)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_tile_count(&self) -> CellCount {
        self.total_tiles() - self.mine_count
    }

    pub fn tile(&self, coords: Coord2) -> Option<Tile> {
        self.validate_coords(coords).ok().map(|coords| self[coords])
    }

    pub fn revealed_count(&self) -> CellCount {
        self.tiles.iter().filter(|tile| tile.is_revealed()).count() as CellCount
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.tiles
            .iter()
            .filter(|tile| tile.is_revealed() && !tile.is_mine())
            .count() as CellCount
    }

    /// Every tile with its coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        iter_coords(self.grid_size).map(|coords| (coords, self[coords]))
    }

    pub fn mine_coords(&self) -> Vec<Coord2> {
        self.iter()
            .filter(|(_, tile)| tile.is_mine())
            .map(|(coords, _)| coords)
            .collect()
    }

    /// Whether both boards hide mines in the same places, regardless of what has been revealed.
    pub fn same_layout(&self, other: &Board) -> bool {
        self.grid_size == other.grid_size
            && self
                .tiles
                .iter()
                .zip(other.tiles.iter())
                .all(|(a, b)| a.kind() == b.kind())
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut Array2<Tile> {
        &mut self.tiles
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}
