//! Red ability: a flame line towards a player and a flame that hunts them.

use arrayvec::ArrayVec;
use tracing::debug;

use super::{CastSchedule, Spell, SpellContext, release_all, spawn_owned, tick_spells};
use crate::clock::Stopwatch;
use crate::config::secs;
use crate::env::{EntityId, Host, ObjectKind, VisualEffect};
use crate::error::EncounterResult;
use crate::room::players_in_room;
use crate::spatial::{Point, orbit_point};

/// Strong flame tiers, largest first.
const STRONG_TIERS: [ObjectKind; 4] = [
    ObjectKind::LargeFlame,
    ObjectKind::Flame,
    ObjectKind::MediumFlame,
    ObjectKind::SmallFlame,
];
const WEAK_RING: usize = 4;

/// Red engine of one guard.
#[derive(Clone, Debug, Default)]
pub struct RedEngine {
    schedule: CastSchedule,
    active: Vec<RedSpell>,
}

impl RedEngine {
    pub fn active(&self) -> &[RedSpell] {
        &self.active
    }

    /// Players currently targeted by one of this engine's instances.
    pub fn targets(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().map(|spell| spell.target)
    }

    fn has_target(&self, unit: EntityId) -> bool {
        self.targets().any(|t| t == unit)
    }

    pub(super) fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        let cfg = &ctx.config.red;
        if !self.schedule.warm(ctx.dt, secs(cfg.warmup_secs)) {
            return Ok(());
        }
        tick_spells(&mut self.active, host, ctx)?;

        if !self.schedule.ready(ctx.dt, secs(cfg.cooldown_secs)) {
            return Ok(());
        }
        let candidates: Vec<_> = players_in_room(host, &ctx.config.room)
            .into_iter()
            .filter(|unit| !self.has_target(*unit))
            .collect();
        let Some(index) = host.index(candidates.len()) else {
            return Ok(());
        };
        let target = candidates[index];
        debug!(boss = %ctx.boss, player = %target, "red cast");
        self.active.push(RedSpell::new(target));
        self.schedule.mark_fired();
        Ok(())
    }

    pub(super) fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        release_all(&mut self.active, host);
    }
}

/// One Red spell locked onto a player.
#[derive(Clone, Debug)]
pub struct RedSpell {
    target: EntityId,
    elapsed: Stopwatch,
    /// Time the target spent far enough away to wear the flame down.
    reduce: Stopwatch,
    line: Vec<EntityId>,
    strong: ArrayVec<EntityId, 4>,
    weak: ArrayVec<EntityId, WEAK_RING>,
    manifested: bool,
    stopped: bool,
}

impl RedSpell {
    fn new(target: EntityId) -> Self {
        Self {
            target,
            elapsed: Stopwatch::new(),
            reduce: Stopwatch::new(),
            line: Vec::new(),
            strong: ArrayVec::new(),
            weak: ArrayVec::new(),
            manifested: false,
            stopped: false,
        }
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Number of tiers or ring members already worn away.
    pub fn level(&self, ctx: &SpellContext<'_>) -> usize {
        self.reduce
            .intervals(secs(ctx.config.red.reduce_interval_secs)) as usize
    }

    fn manifest<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        boss: EntityId,
        at: Point,
        line_count: usize,
    ) -> EncounterResult<()> {
        // Each object is recorded as soon as it exists so a later failure still releases it.
        while self.line.len() < line_count {
            self.line
                .push(spawn_owned(host, ObjectKind::SmallFlame, at, boss)?);
        }
        for kind in &STRONG_TIERS[self.strong.len()..] {
            self.strong.push(spawn_owned(host, *kind, at, boss)?);
        }
        while !self.weak.is_full() {
            self.weak
                .push(spawn_owned(host, ObjectKind::SmallFlame, at, boss)?);
        }
        self.manifested = true;
        Ok(())
    }

    fn place_line<H: Host + ?Sized>(&self, host: &mut H, from: Point, dir: Point, dist: f32, min: f32) {
        if dist < min * 2.0 {
            for flame in &self.line {
                host.set_enabled(*flame, false);
            }
            return;
        }
        let span = dist - min * 2.0;
        let count = self.line.len() as f32;
        for (i, flame) in self.line.iter().enumerate() {
            let frac = (i + 1) as f32 / count;
            host.set_enabled(*flame, true);
            host.set_position(*flame, from + dir * (min + frac * span));
        }
    }
}

impl Spell for RedSpell {
    fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        if self.stopped {
            return Ok(());
        }
        let cfg = &ctx.config.red;
        self.elapsed.advance(ctx.dt);
        let (Some(from), Some(to)) = (host.position(ctx.boss), host.position(self.target)) else {
            debug!(player = %self.target, "red target vanished");
            self.stopped = true;
            return Ok(());
        };

        if !self.elapsed.has_reached(secs(cfg.charge_secs)) {
            host.play_effect(VisualEffect::GreaterHeal, from, to);
            host.play_effect(VisualEffect::GreaterHeal, to, from);
            return Ok(());
        }
        if !self.manifested {
            self.manifest(host, ctx.boss, from, cfg.line_count)?;
        }

        let offset = to - from;
        let dist = offset.len();
        let dir = offset.normalize().unwrap_or(Point::ZERO);
        self.place_line(host, from, dir, dist, cfg.line_min_dist);

        // The flame never sits closer to the boss than `target_max_dist`.
        let anchor = to + dir * (cfg.target_max_dist - dist).max(0.0);
        let level = self.level(ctx);

        if ctx.matches_room() {
            for flame in &self.strong {
                host.set_enabled(*flame, false);
                host.set_position(*flame, anchor);
            }
            if level >= self.weak.len() {
                debug!(player = %self.target, "red ring burnt out");
                self.stopped = true;
                return Ok(());
            }
            let phase = self.elapsed.elapsed().as_secs_f32() * cfg.weak_speed;
            let count = self.weak.len();
            for (i, flame) in self.weak.iter().enumerate() {
                let pos = orbit_point(anchor, cfg.weak_radius, i, count, phase);
                host.set_position(*flame, pos);
                host.set_enabled(*flame, i >= level);
            }
        } else {
            for flame in &self.weak {
                host.set_enabled(*flame, false);
                host.set_position(*flame, anchor);
            }
            if level >= self.strong.len() {
                debug!(player = %self.target, "red flame burnt out");
                self.stopped = true;
                return Ok(());
            }
            for (i, flame) in self.strong.iter().enumerate() {
                host.set_position(*flame, anchor);
                host.set_enabled(*flame, i == level);
            }
        }

        if dist > cfg.target_min_dist {
            self.reduce.advance(ctx.dt);
        }
        Ok(())
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn release<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self
            .line
            .drain(..)
            .chain(self.strong.drain(..))
            .chain(self.weak.drain(..))
        {
            host.delete(id);
        }
    }
}
