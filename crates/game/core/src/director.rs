//! Top-level encounter state machine.
//!
//! The [`Encounter`] owns the guards, the shared health pool and the room
//! cycler. The host calls [`Encounter::reset`] when the map loads and
//! [`Encounter::update`] once per tick; everything else happens inside.
//!
//! ```text
//! Waiting ──player close──▶ Fighting ──all guards down──▶ Dead
//!    ▲                          │
//!    └────── party wiped ───────┘
//! ```

use tracing::{info, warn};

use crate::clock::{Stopwatch, Tick};
use crate::config::EncounterConfig;
use crate::element::Element;
use crate::env::{EntityId, Host, shuffle};
use crate::error::{EncounterError, EncounterResult};
use crate::guard::GuardAgent;
use crate::room::{RoomEffectCycler, players_in_room, switch_entrance, teleport_players_to_room};

/// Encounter lifecycle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EncounterPhase {
    /// Guards are frozen, waiting for a player to come close.
    #[default]
    Waiting,
    Fighting,
    /// All guards are down. Only a reset leaves this phase.
    Dead,
}

/// Shared health of all guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthPool {
    pub current: i32,
    pub maximum: i32,
}

impl HealthPool {
    pub fn full(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Adds `delta`, keeping the pool within `[0, maximum]`.
    pub fn apply(&mut self, delta: i32) {
        self.current = self.current.saturating_add(delta).clamp(0, self.maximum.max(0));
    }

    pub fn fraction(&self) -> f32 {
        if self.maximum <= 0 {
            return 0.0;
        }
        self.current as f32 / self.maximum as f32
    }
}

/// The Stone Guard encounter.
#[derive(Clone, Debug)]
pub struct Encounter {
    config: EncounterConfig,
    phase: EncounterPhase,
    /// Ticks since the fight started.
    frame: Tick,
    /// Fight time, drives the first room element.
    clock: Stopwatch,
    pool: HealthPool,
    room: RoomEffectCycler,
    guards: Vec<GuardAgent>,
    ready: bool,
}

impl Encounter {
    pub fn new(config: EncounterConfig) -> Self {
        let pool = HealthPool::full(config.boss.max_health);
        Self {
            config,
            phase: EncounterPhase::Waiting,
            frame: Tick::ZERO,
            clock: Stopwatch::new(),
            pool,
            room: RoomEffectCycler::new(),
            guards: Vec::new(),
            ready: false,
        }
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    pub fn pool(&self) -> HealthPool {
        self.pool
    }

    pub fn room_element(&self) -> Option<Element> {
        self.room.current()
    }

    pub fn room(&self) -> &RoomEffectCycler {
        &self.room
    }

    pub fn guards(&self) -> &[GuardAgent] {
        &self.guards
    }

    pub fn frame(&self) -> Tick {
        self.frame
    }

    /// Deletes everything and respawns the guards in the Waiting phase.
    ///
    /// # Errors
    ///
    /// Fails if a guard cannot be spawned; nothing is left half-built.
    pub fn reset<H: Host + ?Sized>(&mut self, host: &mut H) -> EncounterResult<()> {
        self.ready = false;
        self.delete_guards(host);
        switch_entrance(host, &self.config.room, true);
        self.phase = EncounterPhase::Waiting;
        self.frame = Tick::ZERO;
        self.clock.reset();
        self.room.reset();
        self.pool = HealthPool::full(self.config.boss.max_health);

        let mut spawns = self.config.room.guard_spawns;
        shuffle(host, &mut spawns);
        for (element, at) in Element::ALL.into_iter().zip(spawns) {
            match GuardAgent::spawn(host, &self.config, element, at) {
                Ok(guard) => self.guards.push(guard),
                Err(err) => {
                    self.delete_guards(host);
                    return Err(err);
                }
            }
        }
        self.ready = true;
        info!(guards = self.guards.len(), "encounter reset");
        Ok(())
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::NotReady`] before the first successful reset
    /// and host errors from any spawn performed during the tick.
    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H) -> EncounterResult<()> {
        if !self.ready {
            return Err(EncounterError::NotReady);
        }
        match self.phase {
            EncounterPhase::Waiting => self.update_waiting(host),
            EncounterPhase::Fighting => self.update_fighting(host),
            EncounterPhase::Dead => Ok(()),
        }
    }

    fn update_waiting<H: Host + ?Sized>(&mut self, host: &mut H) -> EncounterResult<()> {
        let players = host.player_units();
        let captured = self.guards.iter().any(|guard| {
            host.owner(guard.unit())
                .is_some_and(|owner| players.contains(&owner))
        });
        if captured {
            info!("guard captured while waiting, resetting");
            return self.reset(host);
        }

        let live: Vec<_> = players
            .iter()
            .filter(|unit| host.health(**unit).is_some_and(|hp| hp > 0))
            .filter_map(|unit| host.position(*unit))
            .collect();
        let start = self.config.boss.start_fight_dist;
        let too_close = self.guards.iter().any(|guard| {
            let Some(at) = host.position(guard.unit()) else {
                return false;
            };
            live.iter()
                .map(|pos| pos.distance(at))
                .min_by(f32::total_cmp)
                .is_some_and(|nearest| nearest < start)
        });
        if too_close {
            self.start_fight(host);
        }
        Ok(())
    }

    fn start_fight<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.pool = HealthPool::full(self.config.boss.max_health);
        teleport_players_to_room(host, &self.config.room);
        for guard in &mut self.guards {
            guard.start(host);
            if let Err(err) = guard.sync_health(host, self.pool.current) {
                warn!(code = err.error_code(), %err, "guard missing at fight start");
            }
        }
        switch_entrance(host, &self.config.room, false);
        self.frame = Tick::ZERO;
        self.clock.reset();
        self.room.reset();
        self.phase = EncounterPhase::Fighting;
        info!("fight started");
    }

    fn update_fighting<H: Host + ?Sized>(&mut self, host: &mut H) -> EncounterResult<()> {
        if players_in_room(host, &self.config.room).is_empty() {
            info!("no players left in the room, resetting");
            return self.reset(host);
        }
        let alive = self
            .guards
            .iter()
            .any(|guard| host.health(guard.unit()).is_some_and(|hp| hp > 0));
        if !alive {
            self.finish(host);
            return Ok(());
        }

        let delta: i32 = self.guards.iter().map(|g| g.health_delta(host)).sum();
        self.pool.apply(delta);

        let dt = self.config.tick();
        let units: Vec<EntityId> = self.guards.iter().map(GuardAgent::unit).collect();
        let updated = self
            .guards
            .iter_mut()
            .try_for_each(|guard| guard.update(host, &mut self.room, &units, &self.config, dt));
        // Snapshots follow the pool even after a failed spawn, so no damage is counted twice.
        for guard in &mut self.guards {
            if let Err(err) = guard.sync_health(host, self.pool.current) {
                warn!(code = err.error_code(), %err, "guard vanished before health sync");
            }
        }
        updated?;
        self.room.update(host, &self.config, self.clock.elapsed(), dt);
        self.clock.advance(dt);
        self.frame = self.frame + 1;
        Ok(())
    }

    fn finish<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.delete_guards(host);
        self.phase = EncounterPhase::Dead;
        info!(frame = %self.frame, "guards defeated");
    }

    fn delete_guards<H: Host + ?Sized>(&mut self, host: &mut H) {
        for mut guard in self.guards.drain(..) {
            guard.delete(host);
        }
    }
}
