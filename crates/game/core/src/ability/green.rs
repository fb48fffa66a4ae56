//! Green ability: a projectile that bounces around the room and can be kicked.

use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use tracing::debug;

use super::{CastSchedule, Spell, SpellContext, release_all, spawn_owned, tick_spells};
use crate::clock::Stopwatch;
use crate::config::secs;
use crate::env::{EntityId, Host, ObjectKind, SpellKind};
use crate::error::EncounterResult;
use crate::room::players_in_room;
use crate::spatial::Point;

/// Green engine of one guard.
#[derive(Clone, Debug, Default)]
pub struct GreenEngine {
    schedule: CastSchedule,
    active: Vec<GreenSpell>,
    /// Boss aggression is held at zero while any telegraph is up.
    rooted: bool,
}

impl GreenEngine {
    pub fn active(&self) -> &[GreenSpell] {
        &self.active
    }

    pub(super) fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        let cfg = &ctx.config.green;
        if !self.schedule.warm(ctx.dt, secs(cfg.warmup_secs)) {
            return Ok(());
        }
        tick_spells(&mut self.active, host, ctx)?;
        if self.rooted && !self.active.iter().any(GreenSpell::is_charging) {
            host.set_aggression(ctx.boss, ctx.config.boss.aggression_level());
            self.rooted = false;
        }
        if self.active.len() >= cfg.max_active {
            return Ok(());
        }
        if !self.schedule.ready(ctx.dt, secs(cfg.cooldown_secs)) {
            return Ok(());
        }
        let Some(at) = host.position(ctx.boss) else {
            return Ok(());
        };
        // Hold still while charging.
        host.set_aggression(ctx.boss, 0.0);
        host.walk_to(ctx.boss, at);
        self.rooted = true;
        let telegraph = spawn_owned(host, ObjectKind::GreenTelegraph, at, ctx.boss)?;
        debug!(boss = %ctx.boss, "green cast");
        self.active.push(GreenSpell::new(telegraph));
        self.schedule.mark_fired();
        Ok(())
    }

    pub(super) fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        release_all(&mut self.active, host);
    }
}

/// One Green projectile from charge-up to toxic cloud.
#[derive(Clone, Debug)]
pub struct GreenSpell {
    telegraph: Option<EntityId>,
    projectile: Option<EntityId>,
    payload: Option<EntityId>,
    elapsed: Stopwatch,
    pos: Point,
    heading: Point,
    last_kick: Option<Duration>,
    stopped: bool,
}

impl GreenSpell {
    fn new(telegraph: EntityId) -> Self {
        Self {
            telegraph: Some(telegraph),
            projectile: None,
            payload: None,
            elapsed: Stopwatch::new(),
            pos: Point::ZERO,
            heading: Point::ZERO,
            last_kick: None,
            stopped: false,
        }
    }

    pub fn projectile(&self) -> Option<EntityId> {
        self.projectile
    }

    /// The death payload, once the projectile has converted.
    pub fn payload(&self) -> Option<EntityId> {
        self.payload
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn heading(&self) -> Point {
        self.heading
    }

    /// Still showing its telegraph.
    pub fn is_charging(&self) -> bool {
        self.telegraph.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Leaves a toxic cloud at the current position and ends the spell.
    fn burst<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.cast_spell(SpellKind::ToxicCloud, self.pos, self.pos);
        self.release(host);
        self.stopped = true;
        debug!(x = self.pos.x, y = self.pos.y, "green burst");
    }

    fn launch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<bool> {
        let players = players_in_room(host, &ctx.config.room);
        let target = host
            .index(players.len())
            .and_then(|i| host.position(players[i]));
        let (Some(target), Some(from)) = (target, host.position(ctx.boss)) else {
            return Ok(false);
        };
        self.pos = from;
        self.heading = (target - from)
            .normalize()
            .unwrap_or(Point::from_angle(FRAC_PI_4));
        self.projectile = Some(spawn_owned(host, ObjectKind::GreenProjectile, from, ctx.boss)?);
        Ok(true)
    }

    /// Redirects the projectile away from the nearest actor in reach.
    fn kick<H: Host + ?Sized>(&mut self, host: &H, ctx: &SpellContext<'_>) {
        let cfg = &ctx.config.green;
        let now = self.elapsed.elapsed();
        let interval = secs(cfg.kick_interval_secs);
        if self.last_kick.is_some_and(|t| now.saturating_sub(t) < interval) {
            return;
        }
        let actors = players_in_room(host, &ctx.config.room)
            .into_iter()
            .chain(ctx.guards.iter().copied());
        let nearest = actors
            .filter_map(|id| host.position(id))
            .map(|pos| (pos, pos.distance(self.pos)))
            .filter(|(_, dist)| *dist < cfg.kick_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((actor, _)) = nearest else {
            return;
        };
        if let Some(away) = (self.pos - actor).normalize() {
            self.heading = away;
            self.last_kick = Some(now);
        }
    }
}

impl Spell for GreenSpell {
    fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        if self.stopped {
            return Ok(());
        }
        let cfg = &ctx.config.green;
        self.elapsed.advance(ctx.dt);
        if !self.elapsed.has_reached(secs(cfg.charge_secs)) {
            return Ok(());
        }
        if let Some(telegraph) = self.telegraph.take() {
            host.delete(telegraph);
        }
        if self.payload.is_some_and(|payload| !host.exists(payload)) {
            // Destroyed by the host on collision.
            self.payload = None;
            self.burst(host);
            return Ok(());
        }
        if self.projectile.is_none() && !self.launch(host, ctx)? {
            debug!(boss = %ctx.boss, "green spell found no target");
            self.stopped = true;
            return Ok(());
        }

        let speed = if self.payload.is_some() {
            cfg.proj_speed_death
        } else {
            cfg.proj_speed
        };
        self.pos = self.pos + self.heading * (speed * ctx.dt.as_secs_f32());
        for id in self.projectile.into_iter().chain(self.payload) {
            host.set_position(id, self.pos);
        }

        let (heading, bounced) = ctx.config.room.reflect(self.pos, self.heading);
        self.heading = heading;
        self.kick(host, ctx);

        if !bounced {
            return Ok(());
        }
        if self.payload.is_some() || ctx.matches_room() {
            self.burst(host);
            return Ok(());
        }
        if let Some(projectile) = self.projectile {
            host.set_enabled(projectile, false);
        }
        self.payload = Some(spawn_owned(host, ObjectKind::DeathPayload, self.pos, ctx.boss)?);
        debug!(boss = %ctx.boss, "green projectile turned into death payload");
        Ok(())
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn release<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self
            .telegraph
            .take()
            .into_iter()
            .chain(self.projectile.take())
            .chain(self.payload.take())
        {
            host.delete(id);
        }
    }
}
