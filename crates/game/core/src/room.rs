//! Room control and the room-wide elemental hazard.
//!
//! [`RoomEffectCycler`] owns the active room [`Element`]. After an initial
//! delay it picks a color, draws hazard bands across the room with a density
//! that rises over time, and forces a switch (confusing everyone inside) when
//! a color has been active for too long.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Stopwatch;
use crate::config::{EncounterConfig, secs};
use crate::element::Element;
use crate::env::{Enchant, EntityId, Host, Lifetime, PartyOracle, RngOracle, SpatialOracle, UnitHost};
use crate::spatial::{HazardAxis, RoomLayout};

/// Upper bound on reject-and-resample draws before falling back to the next color.
const RESAMPLE_LIMIT: usize = 16;

/// Live player units inside the room, in roster order.
pub fn players_in_room<H>(host: &H, room: &RoomLayout) -> Vec<EntityId>
where
    H: PartyOracle + SpatialOracle + UnitHost + ?Sized,
{
    host.player_units()
        .into_iter()
        .filter(|unit| {
            host.position(*unit).is_some_and(|pos| room.contains(pos))
                && host.health(*unit).is_some_and(|hp| hp > 0)
        })
        .collect()
}

/// Opens or closes the entrance.
pub fn switch_entrance<H: Host + ?Sized>(host: &mut H, room: &RoomLayout, open: bool) {
    for cell in &room.entrance {
        host.set_wall(*cell, !open);
    }
}

/// Moves every player that is not yet inside the room to the player spawn.
pub fn teleport_players_to_room<H: Host + ?Sized>(host: &mut H, room: &RoomLayout) {
    for unit in host.player_units() {
        let outside = host.position(unit).is_some_and(|pos| !room.contains(pos));
        if outside {
            host.set_position(unit, room.player_spawn);
        }
    }
}

/// Whether a hazard band is drawn this tick.
///
/// Density rises with `power`: one of four ticks, one of three, one of two,
/// then every tick.
pub fn emits(power: u32, ticks: u64) -> bool {
    match power {
        0 => ticks % 4 == 0,
        1 => ticks % 3 == 0,
        2 => ticks % 2 == 0,
        _ => true,
    }
}

/// Plays the element's hazard across a random band of `axis`.
pub fn draw_hazard_band<H: Host + ?Sized>(host: &mut H, element: Element, axis: &HazardAxis) {
    let offset = host.range(0, axis.length);
    let (a, b) = axis.band(offset);
    let effect = element.hazard();
    host.play_effect(effect, a, b);
    if !element.hazard_is_bidirectional() {
        host.play_effect(effect, b, a);
    }
}

/// Draws a color different from `current`.
fn resample<R: RngOracle + ?Sized>(rng: &mut R, current: Option<Element>) -> Element {
    for _ in 0..RESAMPLE_LIMIT {
        let candidate = Element::from_index(rng.range(0, 2));
        if Some(candidate) != current {
            return candidate;
        }
    }
    let fallback = current.map_or(Element::Red, Element::next);
    warn!(%fallback, "room element resample fell back");
    fallback
}

/// Room-wide hazard state.
#[derive(Clone, Debug, Default)]
pub struct RoomEffectCycler {
    current: Option<Element>,
    since_switch: Stopwatch,
    ticks_since_switch: u64,
    /// Time until the next debug power report.
    report: Stopwatch,
    switches: u32,
}

impl RoomEffectCycler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Element> {
        self.current
    }

    /// Time the current element has been active.
    pub fn since_switch(&self) -> Duration {
        self.since_switch.elapsed()
    }

    /// Number of element changes since the last reset.
    pub fn switches(&self) -> u32 {
        self.switches
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Switches to a new element without confusing anyone.
    pub fn advance<H: Host + ?Sized>(&mut self, host: &mut H) -> Element {
        let next = resample(host, self.current);
        info!(from = ?self.current, to = %next, "room element switched");
        self.current = Some(next);
        self.since_switch.reset();
        self.ticks_since_switch = 0;
        self.switches += 1;
        next
    }

    /// Current hazard power for `interval`-long steps.
    pub fn power(&self, interval: Duration) -> u32 {
        self.since_switch.intervals(interval)
    }

    /// Runs one tick. `fight_elapsed` is the fight time before this tick.
    pub fn update<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &EncounterConfig,
        fight_elapsed: Duration,
        dt: Duration,
    ) {
        let cfg = &config.room_effect;
        let Some(element) = self.current_or_first(host, config, fight_elapsed) else {
            return;
        };

        if self.since_switch.elapsed() > secs(cfg.timeout_secs) {
            info!(%element, "room element timed out");
            self.advance(host);
            let confuse = Lifetime::For(secs(cfg.confuse_secs));
            for unit in players_in_room(host, &config.room) {
                host.enchant(unit, Enchant::Confused, confuse);
            }
            self.tick(dt);
            return;
        }

        let power = self.power(secs(cfg.power_interval_secs));
        if self.report.has_reached(secs(cfg.power_report_secs)) {
            debug!(%element, power, "room effect power");
            self.report.reset();
        }
        if emits(power, self.ticks_since_switch) {
            draw_hazard_band(host, element, &config.room.hazard);
        }
        self.tick(dt);
    }

    fn current_or_first<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &EncounterConfig,
        fight_elapsed: Duration,
    ) -> Option<Element> {
        if self.current.is_some() {
            return self.current;
        }
        if fight_elapsed < secs(config.room_effect.delay_secs) {
            return None;
        }
        Some(self.advance(host))
    }

    fn tick(&mut self, dt: Duration) {
        self.since_switch.advance(dt);
        self.report.advance(dt);
        self.ticks_since_switch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoomEffectConfig;
    use crate::env::{EntityHost, ObjectKind, PcgRng, SandboxWorld, VisualEffect};
    use crate::spatial::Point;

    const INSIDE: Point = Point::new(4500.0, 4500.0);

    fn config() -> EncounterConfig {
        EncounterConfig {
            tick_rate: 20,
            room_effect: RoomEffectConfig {
                delay_secs: 1.0,
                timeout_secs: 3.0,
                power_interval_secs: 1.0,
                ..RoomEffectConfig::default()
            },
            ..EncounterConfig::default()
        }
    }

    /// Rng that always returns the same value.
    struct Stuck(u32);

    impl RngOracle for Stuck {
        fn next_u32(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn emission_schedule_by_power() {
        let count = |power| (0..12).filter(|t| emits(power, *t)).count();
        assert_eq!(count(0), 3);
        assert_eq!(count(1), 4);
        assert_eq!(count(2), 6);
        assert_eq!(count(3), 12);
        assert_eq!(count(9), 12);
    }

    #[test]
    fn resample_never_repeats() {
        let mut rng = PcgRng::new(17);
        let mut current = None;
        for _ in 0..200 {
            let next = resample(&mut rng, current);
            assert_ne!(Some(next), current);
            current = Some(next);
        }
    }

    #[test]
    fn resample_falls_back_to_next_color() {
        assert_eq!(resample(&mut Stuck(0), Some(Element::Red)), Element::Green);
        assert_eq!(resample(&mut Stuck(0), None), Element::Red);
    }

    #[test]
    fn players_in_room_skips_dead_and_outside() {
        let mut world = SandboxWorld::new(1);
        let room = RoomLayout::default();
        let inside = world.add_player(INSIDE);
        let dead = world.add_player(INSIDE);
        world.set_health(dead, 0);
        world.add_player(Point::new(5000.0, 5000.0));
        assert_eq!(players_in_room(&world, &room), [inside]);
    }

    #[test]
    fn first_element_waits_for_delay() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(3);
        let mut cycler = RoomEffectCycler::new();
        let mut fight = Stopwatch::new();
        for _ in 0..20 {
            cycler.update(&mut world, &config, fight.elapsed(), dt);
            fight.advance(dt);
        }
        assert_eq!(cycler.current(), None);
        assert!(world.effects().is_empty());

        cycler.update(&mut world, &config, fight.elapsed(), dt);
        assert!(cycler.current().is_some());
        assert_eq!(cycler.switches(), 1);
        // Power 0 emits on the switch tick.
        assert!(!world.effects().is_empty());
    }

    #[test]
    fn timeout_switches_and_confuses_without_emitting() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(3);
        let player = world.add_player(INSIDE);
        let mut cycler = RoomEffectCycler::new();
        let elapsed = Duration::from_secs(5);
        cycler.update(&mut world, &config, elapsed, dt);
        let first = cycler.current().unwrap();

        // 3 s timeout at 20 Hz: the switch happens once more than 60 ticks have passed.
        for _ in 0..60 {
            cycler.update(&mut world, &config, elapsed, dt);
        }
        assert_eq!(cycler.current(), Some(first));
        world.clear_logs();
        cycler.update(&mut world, &config, elapsed, dt);
        let second = cycler.current().unwrap();
        assert_ne!(second, first);
        assert_eq!(cycler.switches(), 2);
        assert!(world.has_enchant(player, Enchant::Confused));
        assert!(world.effects().is_empty());
    }

    #[test]
    fn advance_switches_without_confusion() {
        let config = config();
        let mut world = SandboxWorld::new(3);
        let player = world.add_player(INSIDE);
        let mut cycler = RoomEffectCycler::new();
        cycler.update(&mut world, &config, Duration::from_secs(5), config.tick());
        let first = cycler.current();
        let next = cycler.advance(&mut world);
        assert_ne!(Some(next), first);
        assert_eq!(cycler.since_switch(), Duration::ZERO);
        assert!(!world.has_enchant(player, Enchant::Confused));
    }

    #[test]
    fn density_rises_with_power() {
        let config = config();
        let dt = config.tick();
        let mut world = SandboxWorld::new(3);
        world.spawn(ObjectKind::Guard, INSIDE).unwrap();
        let mut cycler = RoomEffectCycler::new();
        let elapsed = Duration::from_secs(5);
        let mut per_second = Vec::new();
        for _ in 0..3 {
            world.clear_logs();
            for _ in 0..20 {
                cycler.update(&mut world, &config, elapsed, dt);
            }
            per_second.push(world.effects().len());
        }
        assert!(per_second[0] < per_second[1]);
        assert!(per_second[1] < per_second[2]);
    }

    #[test]
    fn green_band_is_drawn_once_others_mirrored() {
        let mut world = SandboxWorld::new(3);
        let axis = RoomLayout::default().hazard;
        draw_hazard_band(&mut world, Element::Green, &axis);
        assert_eq!(world.effects().len(), 1);
        assert_eq!(world.effects()[0].effect, VisualEffect::Charm);
        world.clear_logs();
        draw_hazard_band(&mut world, Element::Red, &axis);
        let effects = world.effects();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].from, effects[1].to);
        assert_eq!(effects[0].to, effects[1].from);
    }
}
