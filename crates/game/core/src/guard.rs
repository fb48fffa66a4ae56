//! A single stone guard.
//!
//! [`GuardAgent`] binds one host unit to its color, its ability engine, the
//! energy/shield mechanic and the anti-exploit checks. Health is owned by the
//! encounter; the agent only reports how much its unit changed since the last
//! tick.

use std::time::Duration;

use tracing::{debug, info};

use crate::ability::{AbilityEngine, SpellContext};
use crate::clock::Stopwatch;
use crate::config::{EncounterConfig, secs};
use crate::element::Element;
use crate::env::{
    DamageKind, Enchant, EntityId, Host, HostError, Lifetime, ObjectKind, SpellKind,
};
use crate::error::EncounterResult;
use crate::room::{RoomEffectCycler, players_in_room};
use crate::spatial::Point;

const ENERGY_STEP: Duration = Duration::from_secs(1);

/// Runtime state of one guard.
#[derive(Clone, Debug)]
pub struct GuardAgent {
    element: Element,
    unit: EntityId,
    ability: AbilityEngine,
    prev_health: i32,
    prev_pos: Point,
    /// Time since the fight started for this guard.
    clock: Stopwatch,
    /// Whether the previous tick already counted as a burst hit.
    burst_streak: bool,
    energy: u32,
    /// Paired time not yet converted into energy.
    energy_clock: Stopwatch,
    shield: Option<EntityId>,
}

impl GuardAgent {
    /// Spawns a frozen guard of `element` at `at`.
    ///
    /// # Errors
    ///
    /// Fails if the host cannot create the unit.
    pub fn spawn<H: Host + ?Sized>(
        host: &mut H,
        config: &EncounterConfig,
        element: Element,
        at: Point,
    ) -> EncounterResult<Self> {
        let boss = &config.boss;
        let unit = host.spawn(ObjectKind::Guard, at)?;
        host.set_max_health(unit, boss.max_health);
        host.enchant(unit, element.resistance(), Lifetime::Infinite);
        host.enchant(unit, Enchant::Freeze, Lifetime::Infinite);
        host.freeze(unit, true);
        host.set_aggression(unit, boss.aggression_level());
        host.set_base_speed(unit, boss.speed);
        host.set_mass(unit, boss.mass);
        debug!(%element, %unit, "guard spawned");

        Ok(Self {
            element,
            unit,
            ability: AbilityEngine::for_element(element),
            prev_health: host.health(unit).unwrap_or(boss.max_health),
            prev_pos: at,
            clock: Stopwatch::new(),
            burst_streak: false,
            energy: 0,
            energy_clock: Stopwatch::new(),
            shield: None,
        })
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn unit(&self) -> EntityId {
        self.unit
    }

    pub fn ability(&self) -> &AbilityEngine {
        &self.ability
    }

    pub fn shield(&self) -> Option<EntityId> {
        self.shield
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    /// Charge towards the next explosion in `[0, 1]`.
    pub fn energy_fraction(&self, config: &EncounterConfig) -> f32 {
        let charge = config.energy.charge.max(1);
        (self.energy as f32 / charge as f32).min(1.0)
    }

    /// Unfreezes the guard and strips anything cast on it while it waited.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.freeze(self.unit, false);
        host.remove_enchant(self.unit, Enchant::Freeze);
        self.cleanse(host);
    }

    /// Deletes the unit and everything the guard owns.
    pub fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.ability.delete(host);
        if let Some(shield) = self.shield.take() {
            host.delete(shield);
        }
        host.delete(self.unit);
    }

    /// Health gained (positive) or lost (negative) since the last snapshot.
    pub fn health_delta<H: Host + ?Sized>(&self, host: &H) -> i32 {
        host.health(self.unit)
            .map_or(0, |health| health - self.prev_health)
    }

    /// Forces the unit and the snapshot to the shared pool value.
    ///
    /// Fails with [`HostError::UnknownEntity`] when the unit no longer exists.
    pub fn sync_health<H: Host + ?Sized>(&mut self, host: &mut H, pool: i32) -> Result<(), HostError> {
        if !host.exists(self.unit) {
            return Err(HostError::UnknownEntity(self.unit));
        }
        host.set_health(self.unit, pool);
        self.prev_health = pool;
        Ok(())
    }

    /// Runs one tick: safeguards, energy, ability, then the snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the host cannot spawn a shield, barrel or spell decoration.
    pub fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        room: &mut RoomEffectCycler,
        guards: &[EntityId],
        config: &EncounterConfig,
        dt: Duration,
    ) -> EncounterResult<()> {
        self.anti_exploit(host, config)?;
        self.gather_energy_or_shield(host, room, guards, config, dt)?;

        let ctx = SpellContext {
            boss: self.unit,
            element: self.element,
            room_element: room.current(),
            guards,
            config,
            dt,
        };
        self.ability.update(host, &ctx)?;

        if let Some(pos) = host.position(self.unit) {
            self.prev_pos = pos;
        }
        if let Some(health) = host.health(self.unit) {
            self.prev_health = health;
        }
        self.clock.advance(dt);
        Ok(())
    }

    fn cleanse<H: Host + ?Sized>(&self, host: &mut H) {
        if let Some(pos) = host.position(self.unit) {
            host.cast_spell(SpellKind::Counterspell, pos, pos);
        }
    }

    fn anti_exploit<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &EncounterConfig,
    ) -> EncounterResult<()> {
        let boss = &config.boss;
        self.put_out_flames(host, config)?;

        // Two heavy hits in a row.
        let taken = -self.health_delta(host);
        if taken >= boss.burst_threshold {
            if self.burst_streak {
                debug!(unit = %self.unit, taken, "burst damage blocked");
                let lifetime = Lifetime::For(secs(boss.burst_invulnerable_secs));
                host.enchant(self.unit, Enchant::Invulnerable, lifetime);
                self.cleanse(host);
            } else {
                self.burst_streak = true;
            }
        } else {
            self.burst_streak = false;
        }

        if host.has_enchant(self.unit, Enchant::Charming) {
            debug!(unit = %self.unit, "charm removed");
            self.cleanse(host);
        }
        Ok(())
    }

    /// Breaks a water barrel under an immobile guard standing in player flames.
    fn put_out_flames<H: Host + ?Sized>(
        &self,
        host: &mut H,
        config: &EncounterConfig,
    ) -> EncounterResult<()> {
        let boss = &config.boss;
        let Some(pos) = host.position(self.unit) else {
            return Ok(());
        };
        if pos != self.prev_pos {
            return Ok(());
        }
        let players = host.player_units();
        let flames = host
            .objects_in_circle(pos, boss.flames_radius, &ObjectKind::FIRE_HAZARDS)
            .into_iter()
            .filter(|flame| host.owner(*flame).is_some_and(|o| players.contains(&o)))
            .count();
        if flames < boss.flames_count {
            return Ok(());
        }
        debug!(unit = %self.unit, flames, "putting out flames");
        let barrel = host.spawn(ObjectKind::WaterBarrel, pos)?;
        host.damage(barrel, Some(self.unit), boss.barrel_damage, DamageKind::Impact);
        Ok(())
    }

    fn gather_energy_or_shield<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        room: &mut RoomEffectCycler,
        guards: &[EntityId],
        config: &EncounterConfig,
        dt: Duration,
    ) -> EncounterResult<()> {
        let cfg = &config.energy;
        if !self.clock.has_reached(secs(cfg.delay_secs)) {
            return Ok(());
        }
        let Some(pos) = host.position(self.unit) else {
            return Ok(());
        };
        let paired = guards
            .iter()
            .filter(|other| **other != self.unit)
            .filter_map(|other| host.position(*other))
            .any(|other| other.distance(pos) < cfg.dist);

        if !paired {
            host.enchant(self.unit, Enchant::Invulnerable, Lifetime::For(dt));
            let shield = match self.shield {
                Some(shield) => shield,
                None => {
                    let shield = host.spawn(ObjectKind::EnergyShield, pos)?;
                    self.shield = Some(shield);
                    shield
                }
            };
            host.set_position(shield, pos);
            return Ok(());
        }

        if let Some(shield) = self.shield.take() {
            host.delete(shield);
        }
        self.energy_clock.advance(dt);
        while self.energy_clock.has_reached(ENERGY_STEP) {
            self.energy_clock.rewind(ENERGY_STEP);
            self.energy += 1;
        }
        if self.energy > cfg.charge {
            self.explode(host, room, config);
            self.energy = 0;
        }
        Ok(())
    }

    fn explode<H: Host + ?Sized>(
        &self,
        host: &mut H,
        room: &mut RoomEffectCycler,
        config: &EncounterConfig,
    ) {
        let weak = room.current() == Some(self.element);
        let amount = if weak {
            config.energy.damage_weak
        } else {
            config.energy.damage
        };
        info!(element = %self.element, amount, weak, "elemental explosion");
        if weak {
            room.advance(host);
        }
        let kind = self.element.damage_kind();
        for unit in players_in_room(host, &config.room) {
            host.damage(unit, None, amount, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnergyConfig;
    use crate::env::{EntityHost, SandboxWorld, SpatialOracle, UnitHost};

    const INSIDE: Point = Point::new(4500.0, 4500.0);

    fn config() -> EncounterConfig {
        EncounterConfig {
            tick_rate: 20,
            energy: EnergyConfig {
                delay_secs: 0.0,
                charge: 2,
                ..EnergyConfig::default()
            },
            ..EncounterConfig::default()
        }
    }

    fn spawn(world: &mut SandboxWorld, config: &EncounterConfig, element: Element, at: Point) -> GuardAgent {
        GuardAgent::spawn(world, config, element, at).unwrap()
    }

    #[test]
    fn spawns_frozen_with_resistance() {
        let config = config();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Blue, INSIDE);
        let unit = guard.unit();
        assert_eq!(world.health(unit), Some(1000));
        assert_eq!(world.mass(unit), Some(20.0));
        assert!(world.is_frozen(unit));
        assert!(world.has_enchant(unit, Enchant::Freeze));
        assert!(world.has_enchant(unit, Enchant::ProtectFromElectricity));
        assert_eq!(guard.health_delta(&world), 0);

        guard.start(&mut world);
        assert!(!world.is_frozen(unit));
        assert!(!world.has_enchant(unit, Enchant::Freeze));
        assert_eq!(world.spells()[0].spell, SpellKind::Counterspell);
    }

    #[test]
    fn passive_guards_have_no_aggression() {
        let mut config = config();
        config.boss.passive = true;
        let mut world = SandboxWorld::new(1);
        let guard = spawn(&mut world, &config, Element::Red, INSIDE);
        assert_eq!(world.aggression(guard.unit()), Some(0.0));
    }

    #[test]
    fn spawn_failure_is_reported() {
        let config = config();
        let mut world = SandboxWorld::new(1);
        world.fail_spawns(ObjectKind::Guard);
        assert!(GuardAgent::spawn(&mut world, &config, Element::Red, INSIDE).is_err());
    }

    #[test]
    fn isolated_guard_is_shielded_and_invulnerable() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Red, INSIDE);
        let guards = [guard.unit()];
        let mut room = RoomEffectCycler::new();
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert!(world.has_enchant(guard.unit(), Enchant::Invulnerable));
        let shield = guard.shield().unwrap();
        assert_eq!(world.position(shield), Some(INSIDE));
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert_eq!(guard.shield(), Some(shield));
        assert_eq!(world.count_of(ObjectKind::EnergyShield), 1);
    }

    #[test]
    fn paired_guards_explode_when_charge_is_exceeded() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let player = world.add_player(INSIDE + Point::new(300.0, 0.0));
        let mut a = spawn(&mut world, &config, Element::Red, INSIDE);
        let b = spawn(&mut world, &config, Element::Blue, INSIDE + Point::new(50.0, 0.0));
        let guards = [a.unit(), b.unit()];
        let mut room = RoomEffectCycler::new();

        for _ in 0..59 {
            a.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        }
        assert_eq!(a.energy(), 2);
        assert!(a.shield().is_none());
        assert!(world.damage_log().is_empty());

        a.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert_eq!(a.energy(), 0);
        assert_eq!(world.health(player), Some(80));
        assert_eq!(room.current(), None);
    }

    #[test]
    fn matching_explosion_is_weak_and_switches_the_room() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let player = world.add_player(INSIDE + Point::new(300.0, 0.0));
        let mut a = spawn(&mut world, &config, Element::Red, INSIDE);
        let b = spawn(&mut world, &config, Element::Blue, INSIDE + Point::new(50.0, 0.0));
        let guards = [a.unit(), b.unit()];
        let mut room = RoomEffectCycler::new();
        while room.current() != Some(Element::Red) {
            room.advance(&mut world);
        }
        for _ in 0..60 {
            a.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        }
        assert_eq!(world.health(player), Some(98));
        assert_ne!(room.current(), Some(Element::Red));
    }

    #[test]
    fn stacked_player_flames_are_put_out() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let player = world.add_player(INSIDE + Point::new(300.0, 0.0));
        let mut guard = spawn(&mut world, &config, Element::Red, INSIDE);
        let guards = [guard.unit()];
        let mut room = RoomEffectCycler::new();
        // One flame of the guard's own does not count.
        world.spawn_owned(ObjectKind::Flame, INSIDE, guard.unit());
        world.spawn_owned(ObjectKind::SmallFlame, INSIDE + Point::new(1.0, 0.0), player);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert_eq!(world.count_of(ObjectKind::SmallFlame), 1);

        world.spawn_owned(ObjectKind::LargeFlame, INSIDE, player);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert_eq!(world.count_of(ObjectKind::SmallFlame), 0);
        assert_eq!(world.count_of(ObjectKind::LargeFlame), 0);
        assert_eq!(world.count_of(ObjectKind::WaterBarrel), 0);
        assert!(world
            .damage_log()
            .iter()
            .any(|d| d.kind == DamageKind::Impact && d.source == Some(guard.unit())));
    }

    #[test]
    fn second_burst_in_a_row_triggers_protection() {
        let mut config = config();
        config.energy.delay_secs = 1000.0;
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Red, INSIDE);
        let unit = guard.unit();
        let guards = [unit];
        let mut room = RoomEffectCycler::new();

        world.set_health(unit, 985);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert!(!world.has_enchant(unit, Enchant::Invulnerable));

        world.set_health(unit, 970);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert!(world.has_enchant(unit, Enchant::Invulnerable));
        assert_eq!(world.spells().len(), 1);

        // A light tick breaks the streak.
        world.remove_enchant(unit, Enchant::Invulnerable);
        world.set_health(unit, 968);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        world.set_health(unit, 950);
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert!(!world.has_enchant(unit, Enchant::Invulnerable));
    }

    #[test]
    fn charm_is_dispelled() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Green, INSIDE);
        let unit = guard.unit();
        world.enchant(unit, Enchant::Charming, Lifetime::Infinite);
        let guards = [unit];
        let mut room = RoomEffectCycler::new();
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        assert!(!world.has_enchant(unit, Enchant::Charming));
    }

    #[test]
    fn delete_removes_unit_and_shield() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Red, INSIDE);
        let guards = [guard.unit()];
        let mut room = RoomEffectCycler::new();
        guard.update(&mut world, &mut room, &guards, &config, dt).unwrap();
        guard.delete(&mut world);
        assert!(!world.exists(guard.unit()));
        assert_eq!(world.count_of(ObjectKind::EnergyShield), 0);
    }

    #[test]
    fn sync_health_tracks_pool_and_reports_missing_unit() {
        let config = config();
        let mut world = SandboxWorld::new(1);
        let mut guard = spawn(&mut world, &config, Element::Green, INSIDE);
        let unit = guard.unit();

        guard.sync_health(&mut world, 640).unwrap();
        assert_eq!(world.health(unit), Some(640));
        assert_eq!(guard.health_delta(&world), 0);

        world.delete(unit);
        assert_eq!(guard.health_delta(&world), 0);
        assert_eq!(
            guard.sync_health(&mut world, 500),
            Err(HostError::UnknownEntity(unit))
        );
    }
}
