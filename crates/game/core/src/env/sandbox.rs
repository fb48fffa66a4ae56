//! In-memory host used for headless simulation and tests.
//!
//! [`SandboxWorld`] implements every host trait with plain collections. It
//! keeps a log of effects, spells and damage so callers can assert on what the
//! encounter asked the world to do.

use std::collections::BTreeMap;
use std::time::Duration;

use bitflags::bitflags;

use super::{
    DamageKind, Enchant, EntityHost, EntityId, FrameHook, HostError, Lifetime, ObjectKind,
    PartyOracle, PcgRng, RngOracle, RoomHost, SpatialOracle, SpellKind, UnitHost, VisualEffect,
    WallCell,
};
use crate::spatial::Point;

/// Radius around the target point affected by a counterspell.
const COUNTERSPELL_RADIUS: f32 = 10.0;
/// Radius of fire hazards put out by a breaking water barrel.
const BARREL_SPLASH_RADIUS: f32 = 50.0;
/// Health of freshly spawned units.
const DEFAULT_UNIT_HEALTH: i32 = 100;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct EntityFlags: u8 {
        const ENABLED = 1;
        const FROZEN = 1 << 1;
    }
}

#[derive(Clone, Debug)]
struct SandboxEntity {
    kind: ObjectKind,
    pos: Point,
    owner: Option<EntityId>,
    flags: EntityFlags,
    health: i32,
    max_health: i32,
    mass: f32,
    base_speed: f32,
    aggression: f32,
    walk_target: Option<Point>,
    /// Active enchants with their remaining time (`None` = infinite).
    enchants: Vec<(Enchant, Option<Duration>)>,
}

impl SandboxEntity {
    fn new(kind: ObjectKind, pos: Point) -> Self {
        let health = if kind.is_unit() { DEFAULT_UNIT_HEALTH } else { 0 };
        Self {
            kind,
            pos,
            owner: None,
            flags: EntityFlags::ENABLED,
            health,
            max_health: health,
            mass: 1.0,
            base_speed: 1.0,
            aggression: 1.0,
            walk_target: None,
            enchants: Vec::new(),
        }
    }

    fn has_enchant(&self, enchant: Enchant) -> bool {
        self.enchants.iter().any(|(e, _)| *e == enchant)
    }
}

/// Visual effect played between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectRecord {
    pub effect: VisualEffect,
    pub from: Point,
    pub to: Point,
}

/// Spell cast between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpellRecord {
    pub spell: SpellKind,
    pub from: Point,
    pub to: Point,
}

/// Damage applied to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRecord {
    pub target: EntityId,
    pub source: Option<EntityId>,
    pub amount: i32,
    pub kind: DamageKind,
    /// False when the target was invulnerable and nothing happened.
    pub applied: bool,
}

/// Complete in-memory host.
#[derive(Clone, Debug)]
pub struct SandboxWorld {
    next_id: u32,
    entities: BTreeMap<EntityId, SandboxEntity>,
    players: Vec<EntityId>,
    walls: BTreeMap<WallCell, bool>,
    effects: Vec<EffectRecord>,
    spells: Vec<SpellRecord>,
    damage: Vec<DamageRecord>,
    failing: Vec<ObjectKind>,
    rng: PcgRng,
}

impl SandboxWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            players: Vec::new(),
            walls: BTreeMap::new(),
            effects: Vec::new(),
            spells: Vec::new(),
            damage: Vec::new(),
            failing: Vec::new(),
            rng: PcgRng::new(seed),
        }
    }

    fn insert(&mut self, kind: ObjectKind, at: Point) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, SandboxEntity::new(kind, at));
        id
    }

    /// Adds a player-controlled unit to the roster.
    pub fn add_player(&mut self, at: Point) -> EntityId {
        let id = self.insert(ObjectKind::Player, at);
        self.players.push(id);
        id
    }

    /// Removes a player from the roster and the world.
    pub fn remove_player(&mut self, id: EntityId) {
        self.players.retain(|p| *p != id);
        self.entities.remove(&id);
    }

    /// Makes every later spawn of `kind` fail.
    pub fn fail_spawns(&mut self, kind: ObjectKind) {
        if !self.failing.contains(&kind) {
            self.failing.push(kind);
        }
    }

    pub fn allow_spawns(&mut self) {
        self.failing.clear();
    }

    pub fn kind(&self, id: EntityId) -> Option<ObjectKind> {
        self.entities.get(&id).map(|e| e.kind)
    }

    pub fn is_enabled(&self, id: EntityId) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.flags.contains(EntityFlags::ENABLED))
    }

    pub fn is_frozen(&self, id: EntityId) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.flags.contains(EntityFlags::FROZEN))
    }

    pub fn max_health(&self, id: EntityId) -> Option<i32> {
        self.entities.get(&id).map(|e| e.max_health)
    }

    pub fn mass(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.mass)
    }

    pub fn base_speed(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.base_speed)
    }

    pub fn aggression(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.aggression)
    }

    pub fn walk_target(&self, id: EntityId) -> Option<Point> {
        self.entities.get(&id).and_then(|e| e.walk_target)
    }

    /// Whether the wall cell is currently solid, if it was ever toggled.
    pub fn wall_enabled(&self, cell: WallCell) -> Option<bool> {
        self.walls.get(&cell).copied()
    }

    /// All live entities of one kind, in creation order.
    pub fn entities_of(&self, kind: ObjectKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.entities.values().filter(|e| e.kind == kind).count()
    }

    pub fn effects(&self) -> &[EffectRecord] {
        &self.effects
    }

    pub fn spells(&self) -> &[SpellRecord] {
        &self.spells
    }

    pub fn damage_log(&self) -> &[DamageRecord] {
        &self.damage
    }

    pub fn clear_logs(&mut self) {
        self.effects.clear();
        self.spells.clear();
        self.damage.clear();
    }

    /// Spawns a fire hazard owned by `owner`, the way a player spell would.
    pub fn spawn_owned(&mut self, kind: ObjectKind, at: Point, owner: EntityId) -> EntityId {
        let id = self.insert(kind, at);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.owner = Some(owner);
        }
        id
    }

    fn counterspell(&mut self, at: Point) {
        for entity in self.entities.values_mut() {
            if entity.kind.is_unit() && entity.pos.distance(at) <= COUNTERSPELL_RADIUS {
                entity.enchants.retain(|(e, _)| !e.is_dispellable());
            }
        }
    }

    fn break_barrel(&mut self, barrel: EntityId) {
        let Some(entity) = self.entities.remove(&barrel) else {
            return;
        };
        let at = entity.pos;
        self.entities.retain(|_, e| {
            !(ObjectKind::FIRE_HAZARDS.contains(&e.kind)
                && e.pos.distance(at) <= BARREL_SPLASH_RADIUS)
        });
    }
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EntityHost for SandboxWorld {
    fn spawn(&mut self, kind: ObjectKind, at: Point) -> Result<EntityId, HostError> {
        if self.failing.contains(&kind) {
            return Err(HostError::SpawnFailed { kind });
        }
        Ok(self.insert(kind, at))
    }

    fn delete(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.players.retain(|p| *p != id);
    }

    fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn set_owner(&mut self, id: EntityId, owner: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.owner = Some(owner);
        }
    }

    fn owner(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(&id).and_then(|e| e.owner)
    }

    fn set_enabled(&mut self, id: EntityId, enabled: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.flags.set(EntityFlags::ENABLED, enabled);
        }
    }
}

impl SpatialOracle for SandboxWorld {
    fn position(&self, id: EntityId) -> Option<Point> {
        self.entities.get(&id).map(|e| e.pos)
    }

    fn objects_in_circle(
        &self,
        center: Point,
        radius: f32,
        kinds: &[ObjectKind],
    ) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| kinds.contains(&e.kind) && e.pos.distance(center) <= radius)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl UnitHost for SandboxWorld {
    fn set_position(&mut self, id: EntityId, at: Point) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.pos = at;
        }
    }

    fn health(&self, id: EntityId) -> Option<i32> {
        self.entities
            .get(&id)
            .filter(|e| e.kind.is_unit())
            .map(|e| e.health)
    }

    fn set_health(&mut self, id: EntityId, value: i32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.health = value.clamp(0, entity.max_health.max(0));
        }
    }

    fn set_max_health(&mut self, id: EntityId, value: i32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.max_health = value;
            entity.health = value;
        }
    }

    fn set_mass(&mut self, id: EntityId, mass: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.mass = mass;
        }
    }

    fn set_base_speed(&mut self, id: EntityId, speed: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.base_speed = speed;
        }
    }

    fn enchant(&mut self, id: EntityId, enchant: Enchant, lifetime: Lifetime) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let remaining = match lifetime {
            Lifetime::Infinite => None,
            Lifetime::For(duration) => Some(duration),
        };
        match entity.enchants.iter_mut().find(|(e, _)| *e == enchant) {
            Some(slot) => slot.1 = remaining,
            None => entity.enchants.push((enchant, remaining)),
        }
    }

    fn remove_enchant(&mut self, id: EntityId, enchant: Enchant) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.enchants.retain(|(e, _)| *e != enchant);
        }
    }

    fn has_enchant(&self, id: EntityId, enchant: Enchant) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.has_enchant(enchant))
    }

    fn damage(&mut self, target: EntityId, source: Option<EntityId>, amount: i32, kind: DamageKind) {
        let Some(entity) = self.entities.get_mut(&target) else {
            return;
        };
        let mut record = DamageRecord {
            target,
            source,
            amount,
            kind,
            applied: false,
        };
        if entity.kind == ObjectKind::WaterBarrel {
            record.applied = true;
            self.damage.push(record);
            self.break_barrel(target);
            return;
        }
        if entity.kind.is_unit() && !entity.has_enchant(Enchant::Invulnerable) {
            entity.health = (entity.health - amount).max(0);
            record.applied = true;
        }
        self.damage.push(record);
    }

    fn freeze(&mut self, id: EntityId, frozen: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.flags.set(EntityFlags::FROZEN, frozen);
        }
    }

    fn set_aggression(&mut self, id: EntityId, level: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.aggression = level;
        }
    }

    fn walk_to(&mut self, id: EntityId, to: Point) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.walk_target = Some(to);
        }
    }
}

impl RoomHost for SandboxWorld {
    fn set_wall(&mut self, cell: WallCell, enabled: bool) {
        self.walls.insert(cell, enabled);
    }

    fn play_effect(&mut self, effect: VisualEffect, from: Point, to: Point) {
        self.effects.push(EffectRecord { effect, from, to });
    }

    fn cast_spell(&mut self, spell: SpellKind, from: Point, to: Point) {
        self.spells.push(SpellRecord { spell, from, to });
        if spell == SpellKind::Counterspell {
            self.counterspell(to);
        }
    }
}

impl PartyOracle for SandboxWorld {
    fn player_units(&self) -> Vec<EntityId> {
        self.players.clone()
    }
}

impl RngOracle for SandboxWorld {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

impl FrameHook for SandboxWorld {
    fn end_frame(&mut self, dt: Duration) {
        for entity in self.entities.values_mut() {
            entity.enchants.retain_mut(|(_, remaining)| match remaining {
                None => true,
                // Ran out at the previous end of frame.
                Some(left) if left.is_zero() => false,
                Some(left) => {
                    *left = left.saturating_sub(dt);
                    true
                }
            });
        }
    }
}
