//! Traits describing the host simulation environment.
//!
//! The encounter never touches the world directly. Each capability it needs
//! from the host is a small trait, and the [`Host`] aggregate bundles them so
//! the director can be driven by a real game engine or by the in-memory
//! [`SandboxWorld`] without code changes.
mod error;
mod kinds;
mod rng;
mod sandbox;

use std::time::Duration;

pub use error::HostError;
pub use kinds::{
    DamageKind, Enchant, EntityId, Lifetime, ObjectKind, SpellKind, VisualEffect, WallCell,
};
pub use rng::{PcgRng, RngOracle, shuffle};
pub use sandbox::{DamageRecord, EffectRecord, SandboxWorld, SpellRecord};

use crate::spatial::Point;

/// Entity lifecycle.
pub trait EntityHost {
    /// Creates an object of `kind` at `at`.
    ///
    /// # Errors
    ///
    /// Returns `HostError::SpawnFailed` if the host cannot instantiate it.
    fn spawn(&mut self, kind: ObjectKind, at: Point) -> Result<EntityId, HostError>;

    /// Deletes an entity. Unknown ids are ignored.
    fn delete(&mut self, id: EntityId);

    fn exists(&self, id: EntityId) -> bool;

    fn set_owner(&mut self, id: EntityId, owner: EntityId);

    fn owner(&self, id: EntityId) -> Option<EntityId>;

    /// Toggles visibility and collision.
    fn set_enabled(&mut self, id: EntityId, enabled: bool);
}

/// Read-only spatial queries.
pub trait SpatialOracle {
    fn position(&self, id: EntityId) -> Option<Point>;

    /// Returns every object of one of `kinds` within `radius` of `center`.
    fn objects_in_circle(&self, center: Point, radius: f32, kinds: &[ObjectKind])
    -> Vec<EntityId>;

    fn distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        Some(self.position(a)?.distance(self.position(b)?))
    }
}

/// Unit mutation and inspection.
pub trait UnitHost {
    fn set_position(&mut self, id: EntityId, at: Point);

    fn health(&self, id: EntityId) -> Option<i32>;

    fn set_health(&mut self, id: EntityId, value: i32);

    /// Sets the maximum health and refills the unit to it.
    fn set_max_health(&mut self, id: EntityId, value: i32);

    fn set_mass(&mut self, id: EntityId, mass: f32);

    fn set_base_speed(&mut self, id: EntityId, speed: f32);

    fn enchant(&mut self, id: EntityId, enchant: Enchant, lifetime: Lifetime);

    fn remove_enchant(&mut self, id: EntityId, enchant: Enchant);

    fn has_enchant(&self, id: EntityId, enchant: Enchant) -> bool;

    /// Applies typed damage, optionally attributed to `source`.
    fn damage(&mut self, target: EntityId, source: Option<EntityId>, amount: i32, kind: DamageKind);

    fn freeze(&mut self, id: EntityId, frozen: bool);

    /// Sets how eagerly the unit seeks out enemies; zero makes it hold still.
    fn set_aggression(&mut self, id: EntityId, level: f32);

    fn walk_to(&mut self, id: EntityId, to: Point);
}

/// Room-wide world control.
pub trait RoomHost {
    /// Enables (solid) or disables a wall segment.
    fn set_wall(&mut self, cell: WallCell, enabled: bool);

    fn play_effect(&mut self, effect: VisualEffect, from: Point, to: Point);

    fn cast_spell(&mut self, spell: SpellKind, from: Point, to: Point);
}

/// Party roster.
pub trait PartyOracle {
    /// Units controlled by the currently active players.
    fn player_units(&self) -> Vec<EntityId>;
}

/// Everything the encounter needs from its host.
pub trait Host: EntityHost + SpatialOracle + UnitHost + RoomHost + PartyOracle + RngOracle {}

impl<T> Host for T where
    T: EntityHost + SpatialOracle + UnitHost + RoomHost + PartyOracle + RngOracle + ?Sized
{
}

/// Optional end-of-frame notification for hosts that simulate time themselves.
///
/// Real engines expire buffs on their own; the sandbox needs to be told.
pub trait FrameHook {
    fn end_frame(&mut self, dt: Duration);
}
