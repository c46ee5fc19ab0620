use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Gem,
    Mine,
}

impl TileKind {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// One cell of the board. The kind is fixed at generation time and `revealed` only ever goes from false to true.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    revealed: bool,
}

impl Tile {
    pub const fn hidden(kind: TileKind) -> Self {
        Self {
            kind,
            revealed: false,
        }
    }

    pub const fn kind(self) -> TileKind {
        self.kind
    }

    pub const fn is_mine(self) -> bool {
        self.kind.is_mine()
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed
    }

    pub(crate) const fn into_revealed(self) -> Self {
        Self {
            kind: self.kind,
            revealed: true,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::hidden(TileKind::Gem)
    }
}
