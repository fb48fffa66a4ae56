//! Blue ability: two rotating lightning rings dropped on a player's position.

use tracing::debug;

use super::{CastSchedule, Spell, SpellContext, release_all, spawn_owned, tick_spells};
use crate::clock::Stopwatch;
use crate::config::secs;
use crate::element::Element;
use crate::env::{Enchant, EntityId, Host, Lifetime, ObjectKind, VisualEffect};
use crate::error::EncounterResult;
use crate::room::players_in_room;
use crate::spatial::{Point, orbit_point};

/// A random outer orb arcs to the center every this many ticks.
const ARC_EVERY: u64 = 4;

/// Blue engine of one guard.
#[derive(Clone, Debug, Default)]
pub struct BlueEngine {
    schedule: CastSchedule,
    active: Vec<BlueSpell>,
}

impl BlueEngine {
    pub fn active(&self) -> &[BlueSpell] {
        &self.active
    }

    pub(super) fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        let cfg = &ctx.config.blue;
        if !self.schedule.warm(ctx.dt, secs(cfg.warmup_secs)) {
            return Ok(());
        }
        tick_spells(&mut self.active, host, ctx)?;

        if !self.schedule.ready(ctx.dt, secs(cfg.cooldown_secs)) {
            return Ok(());
        }
        let players = players_in_room(host, &ctx.config.room);
        let Some(index) = host.index(players.len()) else {
            return Ok(());
        };
        let Some(center) = host.position(players[index]) else {
            return Ok(());
        };
        debug!(boss = %ctx.boss, x = center.x, y = center.y, "blue cast");
        self.active.push(BlueSpell::new(center));
        self.schedule.mark_fired();
        Ok(())
    }

    pub(super) fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        release_all(&mut self.active, host);
    }
}

/// One Blue spell anchored on a fixed point.
#[derive(Clone, Debug)]
pub struct BlueSpell {
    center: Point,
    elapsed: Stopwatch,
    ticks: u64,
    marker: Option<EntityId>,
    outer: Vec<EntityId>,
    inner: Vec<EntityId>,
    stopped: bool,
}

impl BlueSpell {
    fn new(center: Point) -> Self {
        Self {
            center,
            elapsed: Stopwatch::new(),
            ticks: 0,
            marker: None,
            outer: Vec::new(),
            inner: Vec::new(),
            stopped: false,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn marker(&self) -> Option<EntityId> {
        self.marker
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn manifest<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        let cfg = &ctx.config.blue;
        self.marker = Some(spawn_owned(host, ObjectKind::DangerMarker, self.center, ctx.boss)?);
        while self.outer.len() < cfg.outer_count {
            self.outer
                .push(spawn_owned(host, ObjectKind::OuterOrb, self.center, ctx.boss)?);
        }
        while self.inner.len() < cfg.inner_count {
            self.inner
                .push(spawn_owned(host, ObjectKind::InnerOrb, self.center, ctx.boss)?);
        }
        Ok(())
    }
}

impl Spell for BlueSpell {
    fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        if self.stopped {
            return Ok(());
        }
        let cfg = &ctx.config.blue;
        self.elapsed.advance(ctx.dt);
        self.ticks += 1;
        if !self.elapsed.has_reached(secs(cfg.charge_secs)) {
            if let Some(boss) = host.position(ctx.boss) {
                host.play_effect(VisualEffect::Lightning, boss, self.center);
            }
            return Ok(());
        }
        if self.marker.is_none() {
            self.manifest(host, ctx)?;
        }

        let weak = ctx.matches_room();
        let damage = Element::Blue.damage_kind();
        let mut inner_hit = false;
        let mut outer_touched = false;
        for player in players_in_room(host, &ctx.config.room) {
            let Some(pos) = host.position(player) else {
                continue;
            };
            let dist = pos.distance(self.center);
            if !inner_hit && dist < cfg.inner_radius {
                inner_hit = true;
                let (amount, stun) = if weak {
                    (cfg.inner_damage_weak, cfg.inner_stun_weak_secs)
                } else {
                    (cfg.inner_damage, cfg.inner_stun_secs)
                };
                host.damage(player, None, amount, damage);
                host.enchant(player, Enchant::Held, Lifetime::For(secs(stun)));
            } else if dist < cfg.outer_radius {
                if !weak {
                    host.damage(player, None, cfg.outer_damage, damage);
                }
                host.play_effect(VisualEffect::Lightning, self.center, pos);
                outer_touched = true;
            }
        }
        if inner_hit {
            debug!(boss = %ctx.boss, "blue inner ring hit");
            self.stopped = true;
            return Ok(());
        }

        if let Some(marker) = self.marker {
            host.set_enabled(marker, !weak);
        }
        let spin = self.elapsed.elapsed().as_secs_f32();
        let arc = if !outer_touched && self.ticks % ARC_EVERY == 0 {
            host.index(self.outer.len())
        } else {
            None
        };
        let count = self.outer.len();
        for (i, orb) in self.outer.iter().enumerate() {
            let pos = orbit_point(self.center, cfg.outer_radius, i, count, spin * cfg.outer_speed);
            host.set_position(*orb, pos);
            if arc == Some(i) {
                host.play_effect(VisualEffect::Lightning, self.center, pos);
            }
        }
        let count = self.inner.len();
        for (i, orb) in self.inner.iter().enumerate() {
            let pos = orbit_point(self.center, cfg.inner_radius, i, count, spin * cfg.inner_speed);
            host.set_position(*orb, pos);
        }
        Ok(())
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn release<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self
            .marker
            .take()
            .into_iter()
            .chain(self.outer.drain(..))
            .chain(self.inner.drain(..))
        {
            host.delete(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::tests::{INSIDE, config, context};
    use crate::config::{BlueConfig, EncounterConfig};
    use crate::env::{EntityHost, SandboxWorld, SpatialOracle, UnitHost};

    fn fast_config() -> EncounterConfig {
        EncounterConfig {
            blue: BlueConfig {
                warmup_secs: 0.0,
                charge_secs: 0.0,
                cooldown_secs: 1000.0,
                ..BlueConfig::default()
            },
            ..config()
        }
    }

    #[test]
    fn snapshots_target_position_at_cast() {
        let config = fast_config();
        let mut world = SandboxWorld::new(4);
        let boss = world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let start = INSIDE + Point::new(120.0, 0.0);
        let player = world.add_player(start);
        let guards = [boss];
        let ctx = context(boss, Element::Blue, None, &guards, &config);
        let mut engine = BlueEngine::default();
        engine.update(&mut world, &ctx).unwrap();
        world.set_position(player, start + Point::new(0.0, 100.0));
        engine.update(&mut world, &ctx).unwrap();
        assert_eq!(engine.active()[0].center(), start);
        assert_eq!(world.count_of(ObjectKind::OuterOrb), 10);
        assert_eq!(world.count_of(ObjectKind::InnerOrb), 10);
    }

    #[test]
    fn inner_hit_stuns_one_player_and_stops() {
        let config = fast_config();
        let mut world = SandboxWorld::new(4);
        let boss = world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let spot = INSIDE + Point::new(120.0, 0.0);
        let first = world.add_player(spot);
        let guards = [boss];
        let ctx = context(boss, Element::Blue, Some(Element::Red), &guards, &config);
        let mut engine = BlueEngine::default();
        engine.update(&mut world, &ctx).unwrap();
        let second = world.add_player(spot + Point::new(5.0, 0.0));

        engine.update(&mut world, &ctx).unwrap();
        assert!(engine.active()[0].is_stopped());
        assert_eq!(world.health(first), Some(80));
        assert!(world.has_enchant(first, Enchant::Held));
        // Only the first player inside the inner ring is hit; the rest count as outer.
        assert_eq!(world.health(second), Some(98));
        assert!(!world.has_enchant(second, Enchant::Held));

        engine.update(&mut world, &ctx).unwrap();
        assert!(engine.active().is_empty());
        assert_eq!(world.count_of(ObjectKind::DangerMarker), 0);
    }

    #[test]
    fn weak_inner_hit_uses_weak_numbers() {
        let config = fast_config();
        let mut world = SandboxWorld::new(4);
        let boss = world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let player = world.add_player(INSIDE + Point::new(120.0, 0.0));
        let guards = [boss];
        let ctx = context(boss, Element::Blue, Some(Element::Blue), &guards, &config);
        let mut engine = BlueEngine::default();
        engine.update(&mut world, &ctx).unwrap();
        engine.update(&mut world, &ctx).unwrap();
        assert_eq!(world.health(player), Some(98));
    }

    #[test]
    fn outer_ring_burns_only_on_mismatch() {
        let config = fast_config();
        let mut world = SandboxWorld::new(4);
        let boss = world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let spot = INSIDE + Point::new(120.0, 0.0);
        let player = world.add_player(spot);
        let guards = [boss];
        let strong = context(boss, Element::Blue, Some(Element::Green), &guards, &config);
        let weak = context(boss, Element::Blue, Some(Element::Blue), &guards, &config);
        let mut engine = BlueEngine::default();
        engine.update(&mut world, &strong).unwrap();
        // Step out of the inner ring before the orbs appear.
        world.set_position(player, spot + Point::new(80.0, 0.0));

        engine.update(&mut world, &strong).unwrap();
        engine.update(&mut world, &strong).unwrap();
        assert_eq!(world.health(player), Some(96));
        let marker = engine.active()[0].marker().unwrap();
        assert!(world.is_enabled(marker));

        engine.update(&mut world, &weak).unwrap();
        assert_eq!(world.health(player), Some(96));
        assert!(!world.is_enabled(marker));
        assert!(!engine.active()[0].is_stopped());
        assert!(world.effects().iter().any(|e| e.effect == VisualEffect::Lightning
            && e.from == spot
            && e.to == world.position(player).unwrap()));
    }

    #[test]
    fn orbs_stay_on_their_rings() {
        let config = fast_config();
        let mut world = SandboxWorld::new(4);
        let boss = world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let spot = INSIDE + Point::new(120.0, 0.0);
        let player = world.add_player(spot);
        let guards = [boss];
        let ctx = context(boss, Element::Blue, None, &guards, &config);
        let mut engine = BlueEngine::default();
        engine.update(&mut world, &ctx).unwrap();
        world.set_position(player, spot + Point::new(500.0, 0.0));
        for _ in 0..10 {
            engine.update(&mut world, &ctx).unwrap();
        }
        for orb in world.entities_of(ObjectKind::OuterOrb) {
            let d = world.position(orb).unwrap().distance(spot);
            assert!((d - 138.0).abs() < 1e-2);
        }
        for orb in world.entities_of(ObjectKind::InnerOrb) {
            let d = world.position(orb).unwrap().distance(spot);
            assert!((d - 46.0).abs() < 1e-2);
        }
    }
}
