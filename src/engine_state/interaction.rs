//! # Interaction
//!
//! Mining and placing tiles with the pointer.
//!
//! Pointer presses arrive as a per-frame queue of [`PointerEvent`]s. The controller drains
//! that queue once per update, so each physical press is dispatched exactly once no matter
//! how long the button is held.
//!
//! Every action goes through the same pipeline:
//! 1. screen position → world position via the camera's inverse transform
//! 2. world position → tile via `floor(world / tile_size)`
//! 3. range gate: the player centre must be closer than the interaction radius
//! 4. the mine or place transaction
//!
//! Placing is a pay-on-success transaction: the inventory is checked before the world is
//! touched and only charged once the tile has actually been placed.

use std::collections::{HashMap, VecDeque};

use cgmath::{MetricSpace, Point2};
use log::debug;

use super::{
    camera_state::camera::Camera,
    tiles::{
        coords::TileCoord,
        tile::{Material, ResourceDrop, ResourceType},
        world::TileWorld,
    },
};
use crate::application_state::input_state::{PointerAction, PointerEvent};

/// Item storage owned by the host. The engine only asks and tells.
pub trait Inventory {
    fn has_item(&self, resource: ResourceType, count: u32) -> bool;
    fn add_item(&mut self, resource: ResourceType, count: u32);
    fn remove_item(&mut self, resource: ResourceType, count: u32);
}

/// A plain counting inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCounts {
    counts: HashMap<ResourceType, u32>,
}

impl ItemCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, resource: ResourceType) -> u32 {
        self.counts.get(&resource).copied().unwrap_or(0)
    }
}

impl Inventory for ItemCounts {
    fn has_item(&self, resource: ResourceType, count: u32) -> bool {
        self.count(resource) >= count
    }

    fn add_item(&mut self, resource: ResourceType, count: u32) {
        let entry = self.counts.entry(resource).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    fn remove_item(&mut self, resource: ResourceType, count: u32) {
        if let Some(entry) = self.counts.get_mut(&resource) {
            *entry = entry.saturating_sub(count);
        }
    }
}

/// What happened to one dispatched pointer action. Purely informational.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    Mined { tile: TileCoord, drop: ResourceDrop },
    NothingToMine { tile: TileCoord },
    Placed { tile: TileCoord, material: Material },
    /// The inventory could not pay for the placement.
    Unaffordable { tile: TileCoord, cost: ResourceDrop },
    /// The tile was occupied, not generated yet, or outside the world.
    PlacementRejected { tile: TileCoord },
    OutOfRange { tile: TileCoord },
}

pub struct InteractionController {
    radius: f32,
    place_material: Material,
    tile_size: f32,
    hovered: Option<TileCoord>,
}

impl InteractionController {
    /// # Arguments
    /// * `radius` - Maximum distance, in world units, from the player centre to a target
    /// * `place_material` - Material placed by the secondary action
    /// * `tile_size` - World units per tile edge
    pub fn new(radius: f32, place_material: Material, tile_size: f32) -> Self {
        InteractionController {
            radius,
            place_material,
            tile_size,
            hovered: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn place_material(&self) -> Material {
        self.place_material
    }

    /// The tile under the pointer after the last `update_hover`.
    pub fn hovered(&self) -> Option<TileCoord> {
        self.hovered
    }

    /// Tracks the tile under the pointer for the highlight overlay.
    pub fn update_hover(&mut self, pointer: Option<Point2<f32>>, camera: &Camera) {
        self.hovered = pointer
            .filter(|screen| screen.x.is_finite() && screen.y.is_finite())
            .map(|screen| TileCoord::from_world(camera.screen_to_world(screen), self.tile_size));
    }

    /// Drains and dispatches every queued pointer event.
    ///
    /// # Arguments
    /// * `events` - This frame's pointer presses; empty afterwards
    /// * `camera` - Used to map screen positions into the world
    /// * `player_centre` - Origin of the range check
    /// * `world` - The world to mine from and place into
    /// * `inventory` - Credited by mining, charged by placing
    pub fn dispatch(
        &mut self,
        events: &mut VecDeque<PointerEvent>,
        camera: &Camera,
        player_centre: Point2<f32>,
        world: &mut TileWorld,
        inventory: &mut dyn Inventory,
    ) -> Vec<InteractionOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events.drain(..) {
            if !(event.screen.x.is_finite() && event.screen.y.is_finite()) {
                continue;
            }
            let target = camera.screen_to_world(event.screen);
            let tile = TileCoord::from_world(target, self.tile_size);
            let outcome = if !self.in_range(player_centre, target) {
                debug!("{:?} at {:?} is out of range", event.action, tile);
                InteractionOutcome::OutOfRange { tile }
            } else {
                match event.action {
                    PointerAction::Primary => self.mine(tile, world, inventory),
                    PointerAction::Secondary => self.place(tile, world, inventory),
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Whether `target` is strictly closer than the interaction radius.
    pub fn in_range(&self, player_centre: Point2<f32>, target: Point2<f32>) -> bool {
        player_centre.distance(target) < self.radius
    }

    /// Mines `tile`, crediting any drop to the inventory.
    pub fn mine(
        &self,
        tile: TileCoord,
        world: &mut TileWorld,
        inventory: &mut dyn Inventory,
    ) -> InteractionOutcome {
        match world.mine_tile(tile) {
            Some(drop) => {
                inventory.add_item(drop.resource, drop.amount);
                debug!("Mined {:?} from {:?}", drop, tile);
                InteractionOutcome::Mined { tile, drop }
            }
            None => InteractionOutcome::NothingToMine { tile },
        }
    }

    /// Places the configured material on `tile` if the inventory can pay for it.
    ///
    /// Nothing is charged unless the placement succeeds.
    pub fn place(
        &self,
        tile: TileCoord,
        world: &mut TileWorld,
        inventory: &mut dyn Inventory,
    ) -> InteractionOutcome {
        let material = self.place_material;
        let (Some(kind), Some(cost)) = (material.placed_kind(), material.placement_cost()) else {
            return InteractionOutcome::PlacementRejected { tile };
        };

        if !inventory.has_item(cost.resource, cost.amount) {
            return InteractionOutcome::Unaffordable { tile, cost };
        }
        if !world.place_tile(tile, kind) {
            return InteractionOutcome::PlacementRejected { tile };
        }

        inventory.remove_item(cost.resource, cost.amount);
        debug!("Placed {} at {:?}", material.name(), tile);
        InteractionOutcome::Placed { tile, material }
    }
}
