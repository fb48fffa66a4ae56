//! Antechamber preview scene shown before the real fight.
//!
//! A row of decoy guards and a decoy boss wait behind a shield. When a player
//! walks in, the room plays a random element's hazard with rising density,
//! then freezes the visitors while the decoy boss wakes up and dispels the
//! decoys.

use tracing::info;

use crate::clock::Stopwatch;
use crate::config::{EncounterConfig, secs};
use crate::element::Element;
use crate::env::{Enchant, EntityId, Host, Lifetime, ObjectKind, SpellKind};
use crate::error::EncounterResult;
use crate::room::{draw_hazard_band, emits};

/// Preview lifecycle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PreviewPhase {
    #[default]
    Waiting,
    /// Hazard bands are being drawn.
    Effect,
    /// Visitors are frozen and the decoy boss is waking up.
    Boss,
    End,
}

#[derive(Clone, Debug, Default)]
pub struct PreviewScene {
    phase: PreviewPhase,
    decoys: Vec<EntityId>,
    boss: Option<EntityId>,
    shield: Option<EntityId>,
    element: Option<Element>,
    clock: Stopwatch,
    ticks: u64,
}

impl PreviewScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    pub fn element(&self) -> Option<Element> {
        self.element
    }

    pub fn boss(&self) -> Option<EntityId> {
        self.boss
    }

    pub fn decoys(&self) -> &[EntityId] {
        &self.decoys
    }

    /// Deletes the scene and spawns a fresh one.
    ///
    /// # Errors
    ///
    /// Fails if the host cannot spawn a decoy or the shield.
    pub fn reset<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &EncounterConfig,
    ) -> EncounterResult<()> {
        self.delete(host);
        let demo = &config.demo;
        for at in &demo.decoy_spawns {
            let decoy = host.spawn(ObjectKind::Decoy, *at)?;
            self.decoys.push(decoy);
        }
        let boss = host.spawn(ObjectKind::Decoy, demo.boss_spawn)?;
        host.set_aggression(boss, 0.0);
        host.enchant(boss, Enchant::Invulnerable, Lifetime::Infinite);
        self.boss = Some(boss);
        let shield = host.spawn(ObjectKind::EnergyShield, demo.boss_spawn)?;
        host.freeze(shield, true);
        self.shield = Some(shield);
        Ok(())
    }

    /// Removes every object of the scene and returns to Waiting.
    pub fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self
            .decoys
            .drain(..)
            .chain(self.boss.take())
            .chain(self.shield.take())
        {
            host.delete(id);
        }
        self.phase = PreviewPhase::Waiting;
        self.element = None;
        self.clock.reset();
        self.ticks = 0;
    }

    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, config: &EncounterConfig) {
        let demo = &config.demo;
        let dt = config.tick();
        match self.phase {
            PreviewPhase::Waiting => {
                let visitor = host
                    .player_units()
                    .into_iter()
                    .filter_map(|unit| host.position(unit))
                    .any(|pos| pos.u() < demo.trigger_limit);
                if visitor {
                    self.start_effect(host);
                }
            }
            PreviewPhase::Effect => {
                if self.clock.elapsed() > secs(demo.effect_timeout_secs) {
                    self.start_boss(host, config);
                    return;
                }
                let power = self.clock.intervals(secs(demo.power_interval_secs));
                if let Some(element) = self.element.filter(|_| emits(power, self.ticks)) {
                    draw_hazard_band(host, element, &demo.hazard);
                }
                self.clock.advance(dt);
                self.ticks += 1;
            }
            PreviewPhase::Boss => {
                self.clock.advance(dt);
                if self.clock.elapsed() > secs(demo.boss_unfreeze_secs) {
                    self.finish(host, config);
                }
            }
            PreviewPhase::End => {}
        }
    }

    fn start_effect<H: Host + ?Sized>(&mut self, host: &mut H) {
        let element = Element::from_index(host.range(0, 2));
        if let Some(boss) = self.boss {
            host.enchant(boss, element.resistance(), Lifetime::Infinite);
        }
        info!(%element, "preview started");
        self.element = Some(element);
        self.clock.reset();
        self.ticks = 0;
        self.phase = PreviewPhase::Effect;
    }

    fn start_boss<H: Host + ?Sized>(&mut self, host: &mut H, config: &EncounterConfig) {
        let demo = &config.demo;
        let hold = Lifetime::For(secs(demo.players_freeze_secs));
        for unit in host.player_units() {
            let inside = host.position(unit).is_some_and(|pos| pos.u() <= demo.trigger_limit);
            if inside {
                host.enchant(unit, Enchant::Freeze, hold);
                host.enchant(unit, Enchant::Invulnerable, hold);
            }
        }
        if let Some(boss) = self.boss {
            host.freeze(boss, false);
        }
        self.clock.reset();
        self.phase = PreviewPhase::Boss;
    }

    fn finish<H: Host + ?Sized>(&mut self, host: &mut H, config: &EncounterConfig) {
        if let Some(boss) = self.boss {
            host.set_aggression(boss, config.boss.aggression);
            host.remove_enchant(boss, Enchant::Invulnerable);
            if let Some(at) = host.position(boss) {
                host.cast_spell(SpellKind::TurnUndead, at, at);
            }
        }
        if let Some(shield) = self.shield.take() {
            host.delete(shield);
        }
        info!("preview finished");
        self.phase = PreviewPhase::End;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::env::{SandboxWorld, SpatialOracle, UnitHost};
    use crate::spatial::Point;

    fn config() -> EncounterConfig {
        EncounterConfig {
            tick_rate: 20,
            demo: DemoConfig {
                effect_timeout_secs: 2.0,
                power_interval_secs: 1.0,
                boss_unfreeze_secs: 1.0,
                ..DemoConfig::default()
            },
            ..EncounterConfig::default()
        }
    }

    fn scene(world: &mut SandboxWorld, config: &EncounterConfig) -> PreviewScene {
        let mut scene = PreviewScene::new();
        scene.reset(world, config).unwrap();
        scene
    }

    #[test]
    fn reset_spawns_decoys_boss_and_frozen_shield() {
        let config = config();
        let mut world = SandboxWorld::new(2);
        let scene = scene(&mut world, &config);
        assert_eq!(scene.decoys().len(), 6);
        assert_eq!(world.count_of(ObjectKind::Decoy), 7);
        let boss = scene.boss().unwrap();
        assert_eq!(world.aggression(boss), Some(0.0));
        assert!(world.has_enchant(boss, Enchant::Invulnerable));
        let shield = world.entities_of(ObjectKind::EnergyShield)[0];
        assert!(world.is_frozen(shield));
    }

    #[test]
    fn reset_twice_does_not_leak() {
        let config = config();
        let mut world = SandboxWorld::new(2);
        let mut scene = scene(&mut world, &config);
        scene.reset(&mut world, &config).unwrap();
        assert_eq!(world.count_of(ObjectKind::Decoy), 7);
        assert_eq!(world.count_of(ObjectKind::EnergyShield), 1);
    }

    #[test]
    fn waits_for_a_visitor() {
        let config = config();
        let mut world = SandboxWorld::new(2);
        let mut scene = scene(&mut world, &config);
        world.add_player(Point::new(6000.0, 6000.0));
        scene.update(&mut world, &config);
        assert_eq!(scene.phase(), PreviewPhase::Waiting);

        world.add_player(Point::new(5100.0, 5100.0));
        scene.update(&mut world, &config);
        assert_eq!(scene.phase(), PreviewPhase::Effect);
        let element = scene.element().unwrap();
        assert!(world.has_enchant(scene.boss().unwrap(), element.resistance()));
    }

    #[test]
    fn full_sequence_ends_with_turn_undead() {
        let config = config();
        let mut world = SandboxWorld::new(2);
        let mut scene = scene(&mut world, &config);
        let visitor = world.add_player(Point::new(5100.0, 5100.0));
        let outside = world.add_player(Point::new(6000.0, 6000.0));
        scene.update(&mut world, &config);

        // 2 s of effect at 20 Hz, then the switch tick.
        for _ in 0..41 {
            scene.update(&mut world, &config);
        }
        assert_eq!(scene.phase(), PreviewPhase::Effect);
        let hazard = scene.element().unwrap().hazard();
        assert!(world.effects().iter().any(|e| e.effect == hazard));
        scene.update(&mut world, &config);
        assert_eq!(scene.phase(), PreviewPhase::Boss);
        assert!(world.has_enchant(visitor, Enchant::Freeze));
        assert!(world.has_enchant(visitor, Enchant::Invulnerable));
        assert!(!world.has_enchant(outside, Enchant::Freeze));

        for _ in 0..21 {
            scene.update(&mut world, &config);
        }
        assert_eq!(scene.phase(), PreviewPhase::End);
        let boss = scene.boss().unwrap();
        assert!(!world.has_enchant(boss, Enchant::Invulnerable));
        assert_eq!(world.count_of(ObjectKind::EnergyShield), 0);
        let at = world.position(boss).unwrap();
        assert!(world
            .spells()
            .iter()
            .any(|s| s.spell == SpellKind::TurnUndead && s.from == at));
    }

    #[test]
    fn hazard_density_rises() {
        let config = EncounterConfig {
            demo: DemoConfig {
                effect_timeout_secs: 100.0,
                ..config().demo
            },
            ..config()
        };
        let mut world = SandboxWorld::new(2);
        let mut scene = scene(&mut world, &config);
        world.add_player(Point::new(5100.0, 5100.0));
        scene.update(&mut world, &config);
        let hazard = scene.element().unwrap().hazard();
        let mut per_second = Vec::new();
        for _ in 0..3 {
            world.clear_logs();
            for _ in 0..20 {
                scene.update(&mut world, &config);
            }
            per_second.push(world.effects().iter().filter(|e| e.effect == hazard).count());
        }
        assert!(per_second[0] < per_second[1]);
        assert!(per_second[1] < per_second[2]);
    }
}
