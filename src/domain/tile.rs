/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TileKind {
    #[default]
    Sky,
    Dirt,   // Solid + Diggable
    Empty,  // Dug tunnel
    Wall,   // Solid only
    Border, // Solid only, bottom of the playfield
    Gem,    // Pickup
    Bonus,  // Pickup, 100 points
    Invalid, // Result of an out-of-range query, never stored
}

impl TileKind {
    /// Can an entity stand in this cell without digging?
    pub fn is_walkable(self) -> bool {
        matches!(self, TileKind::Sky | TileKind::Empty | TileKind::Gem | TileKind::Bonus)
    }

    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Dirt | TileKind::Wall | TileKind::Border)
    }

    pub fn is_diggable(self) -> bool {
        matches!(self, TileKind::Dirt)
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, TileKind::Gem | TileKind::Bonus)
    }
}
