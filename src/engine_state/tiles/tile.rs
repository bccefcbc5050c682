//! # Tile Types
//!
//! A tile is the smallest addressable piece of terrain. It has a `ground` (only used for
//! drawing) and a `kind` that decides whether the tile blocks movement and what mining it
//! yields:
//!
//! * `Empty` - walkable, nothing to mine, the only kind that accepts placement
//! * `Solid` - impassable rock that cannot be mined
//! * `Resource` - impassable until mined; mining yields its stored drop and leaves `Empty`

use num_derive::FromPrimitive;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Surface drawn under a tile.
///
/// The discriminants match the digits used by the chunk text format (`0` dirt, `1` grass).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Ground {
    Dirt = 0,
    Grass = 1,
    /// Ground of the out-of-range sentinel; never produced by generation.
    Void = 2,
}

/// An item type that can be collected into an inventory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Wood,
    Stone,
}

impl ResourceType {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Wood => "wood",
            ResourceType::Stone => "stone",
        }
    }
}

/// A quantity of one resource, produced by mining or consumed by placing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceDrop {
    pub resource: ResourceType,
    pub amount: u32,
}

impl ResourceDrop {
    pub const fn new(resource: ResourceType, amount: u32) -> Self {
        ResourceDrop { resource, amount }
    }
}

/// What a resource tile looks like.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Tree,
    Rock,
    /// Player-built wall. Mining it refunds its construction cost.
    Wall,
}

static MATERIALS_BY_NAME: phf::Map<&'static str, Material> = phf_map! {
    "tree" => Material::Tree,
    "rock" => Material::Rock,
    "wall" => Material::Wall,
};

/// Wood spent on one wall.
pub const WALL_COST: ResourceDrop = ResourceDrop::new(ResourceType::Wood, 2);

impl Material {
    /// Looks up a material by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        MATERIALS_BY_NAME.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Material::Tree => "tree",
            Material::Rock => "rock",
            Material::Wall => "wall",
        }
    }

    /// Resources spent to place this material, or `None` if it can only be generated.
    pub fn placement_cost(&self) -> Option<ResourceDrop> {
        match self {
            Material::Wall => Some(WALL_COST),
            Material::Tree | Material::Rock => None,
        }
    }

    /// The tile kind a freshly placed block of this material becomes.
    pub fn placed_kind(&self) -> Option<TileKind> {
        self.placement_cost().map(|cost| TileKind::Resource {
            material: *self,
            drop: cost,
        })
    }
}

/// Behaviour of a tile. Solidity is derived from the kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Empty,
    Solid,
    Resource { material: Material, drop: ResourceDrop },
}

impl TileKind {
    pub fn is_solid(&self) -> bool {
        !matches!(self, TileKind::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TileKind::Empty)
    }
}

/// A single terrain cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub ground: Ground,
    pub kind: TileKind,
}

impl Tile {
    /// Returned for lookups outside any generated chunk: empty and non-solid.
    pub const SENTINEL: Tile = Tile {
        ground: Ground::Void,
        kind: TileKind::Empty,
    };

    pub const fn new(ground: Ground, kind: TileKind) -> Self {
        Tile { ground, kind }
    }

    pub const fn open(ground: Ground) -> Self {
        Tile::new(ground, TileKind::Empty)
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Tile::SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solidity_follows_kind() {
        assert!(!Tile::SENTINEL.is_solid());
        assert!(Tile::new(Ground::Dirt, TileKind::Solid).is_solid());
        let tree = TileKind::Resource {
            material: Material::Tree,
            drop: ResourceDrop::new(ResourceType::Wood, 3),
        };
        assert!(Tile::new(Ground::Grass, tree).is_solid());
    }

    #[test]
    fn only_walls_are_placeable() {
        assert_eq!(Material::from_name("wall"), Some(Material::Wall));
        assert_eq!(Material::from_name("Wall"), None);
        assert_eq!(Material::Wall.placement_cost(), Some(WALL_COST));
        assert_eq!(Material::Tree.placed_kind(), None);
        assert!(matches!(
            Material::Wall.placed_kind(),
            Some(TileKind::Resource { material: Material::Wall, .. })
        ));
    }
}
