//! Per-color guard abilities.
//!
//! Each guard owns one [`AbilityEngine`] matching its [`Element`]. An engine
//! waits out its warm-up, then casts on a fixed cooldown and drives every
//! active spell instance once per tick:
//!
//! 1. drop stopped instances and release their decorations
//! 2. update the remaining instances
//! 3. charge towards the next cast (the first one fires right after warm-up)
//!
//! A cast without an eligible target is deferred; the engine keeps retrying
//! every tick until an instance is created.

mod blue;
mod green;
mod red;

use std::time::Duration;

pub use blue::{BlueEngine, BlueSpell};
pub use green::{GreenEngine, GreenSpell};
pub use red::{RedEngine, RedSpell};

use crate::clock::Stopwatch;
use crate::config::EncounterConfig;
use crate::element::Element;
use crate::env::{EntityId, Host, ObjectKind};
use crate::error::EncounterResult;
use crate::spatial::Point;

/// Read-only view of the caster passed into every ability update.
#[derive(Clone, Copy, Debug)]
pub struct SpellContext<'a> {
    /// Guard unit casting the spell.
    pub boss: EntityId,
    pub element: Element,
    /// Current room element, if one is active.
    pub room_element: Option<Element>,
    /// Units of every guard in the encounter, the caster included.
    pub guards: &'a [EntityId],
    pub config: &'a EncounterConfig,
    pub dt: Duration,
}

impl SpellContext<'_> {
    /// True when the room currently favours the caster's color (weak form).
    pub fn matches_room(&self) -> bool {
        self.room_element == Some(self.element)
    }
}

/// Warm-up and cooldown bookkeeping shared by all engines.
#[derive(Clone, Debug, Default)]
pub(crate) struct CastSchedule {
    warmup: Stopwatch,
    charge: Stopwatch,
    fired: bool,
}

impl CastSchedule {
    /// Advances the warm-up gate; true once `warmup` has elapsed.
    pub(crate) fn warm(&mut self, dt: Duration, warmup: Duration) -> bool {
        self.warmup.advance(dt);
        self.warmup.has_reached(warmup)
    }

    /// Charges towards the next cast. Returns true when a cast should be attempted.
    pub(crate) fn ready(&mut self, dt: Duration, cooldown: Duration) -> bool {
        self.charge.advance(dt);
        if self.fired && !self.charge.has_reached(cooldown) {
            return false;
        }
        self.charge.reset();
        true
    }

    /// Records that a cast produced an instance; later casts wait a full cooldown.
    pub(crate) fn mark_fired(&mut self) {
        self.fired = true;
    }
}

/// Behaviour shared by the spell instances of all colors.
trait Spell {
    fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()>;

    fn is_stopped(&self) -> bool;

    /// Deletes every object the instance owns.
    fn release<H: Host + ?Sized>(&mut self, host: &mut H);
}

/// Drops stopped instances, then updates the rest.
fn tick_spells<S, H>(spells: &mut Vec<S>, host: &mut H, ctx: &SpellContext<'_>) -> EncounterResult<()>
where
    S: Spell,
    H: Host + ?Sized,
{
    spells.retain_mut(|spell| {
        if spell.is_stopped() {
            spell.release(host);
            false
        } else {
            true
        }
    });
    for spell in spells.iter_mut() {
        spell.update(host, ctx)?;
    }
    Ok(())
}

fn release_all<S, H>(spells: &mut Vec<S>, host: &mut H)
where
    S: Spell,
    H: Host + ?Sized,
{
    for mut spell in spells.drain(..) {
        spell.release(host);
    }
}

/// Spawns a decoration owned by the casting guard.
pub(crate) fn spawn_owned<H: Host + ?Sized>(
    host: &mut H,
    kind: ObjectKind,
    at: Point,
    owner: EntityId,
) -> EncounterResult<EntityId> {
    let id = host.spawn(kind, at)?;
    host.set_owner(id, owner);
    Ok(id)
}

/// Ability state machine of one guard.
#[derive(Clone, Debug)]
pub enum AbilityEngine {
    Red(RedEngine),
    Green(GreenEngine),
    Blue(BlueEngine),
}

impl AbilityEngine {
    pub fn for_element(element: Element) -> Self {
        match element {
            Element::Red => Self::Red(RedEngine::default()),
            Element::Green => Self::Green(GreenEngine::default()),
            Element::Blue => Self::Blue(BlueEngine::default()),
        }
    }

    pub fn element(&self) -> Element {
        match self {
            Self::Red(_) => Element::Red,
            Self::Green(_) => Element::Green,
            Self::Blue(_) => Element::Blue,
        }
    }

    /// Runs one tick of the engine.
    ///
    /// # Errors
    ///
    /// Fails when the host cannot spawn a spell decoration.
    pub fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &SpellContext<'_>,
    ) -> EncounterResult<()> {
        match self {
            Self::Red(engine) => engine.update(host, ctx),
            Self::Green(engine) => engine.update(host, ctx),
            Self::Blue(engine) => engine.update(host, ctx),
        }
    }

    /// Releases every active instance.
    pub fn delete<H: Host + ?Sized>(&mut self, host: &mut H) {
        match self {
            Self::Red(engine) => engine.delete(host),
            Self::Green(engine) => engine.delete(host),
            Self::Blue(engine) => engine.delete(host),
        }
    }

    /// Number of live spell instances, stopped ones not yet pruned included.
    pub fn active_count(&self) -> usize {
        match self {
            Self::Red(engine) => engine.active().len(),
            Self::Green(engine) => engine.active().len(),
            Self::Blue(engine) => engine.active().len(),
        }
    }
}
