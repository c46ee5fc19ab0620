use crate::*;

/// Outcome of clicking a tile during a round.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Safe,
    HitMine,
    Cleared,
}

impl RevealOutcome {
    pub const fn ends_round(self) -> bool {
        matches!(self, Self::HitMine | Self::Cleared)
    }
}

impl Board {
    /// Returns a copy of this board with the tile at `coords` revealed, plus the kind of that tile.
    ///
    /// Revealing an already revealed tile is a no-op: the returned board equals this one.
    pub fn reveal(&self, coords: Coord2) -> Result<(Board, TileKind)> {
        let coords = self.validate_coords(coords)?;
        let tile = self[coords];

        let mut next = self.clone();
        if !tile.is_revealed() {
            next.tiles_mut()[coords.to_nd_index()] = tile.into_revealed();
            log::trace!("Revealed {:?} at {:?}", tile.kind(), coords);
        }
        Ok((next, tile.kind()))
    }

    /// Returns a copy with every mine revealed and gems left as they were.
    pub fn reveal_all_mines(&self) -> Board {
        let mut next = self.clone();
        next.tiles_mut().mapv_inplace(|tile| {
            if tile.is_mine() {
                tile.into_revealed()
            } else {
                tile
            }
        });
        next
    }
}
