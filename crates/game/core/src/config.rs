//! Balance configuration for the encounter.
//!
//! Every duration is configured in seconds and every speed per second, so the
//! same configuration works at any tick rate. Defaults reproduce the shipped
//! balance file.
use std::time::Duration;

use crate::clock::tick_duration;
use crate::spatial::{HazardAxis, Point, RoomLayout};

/// Converts configured seconds into a [`Duration`]; negative or invalid values become zero.
pub fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Complete encounter configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncounterConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    pub boss: BossConfig,
    pub energy: EnergyConfig,
    pub room_effect: RoomEffectConfig,
    pub red: RedConfig,
    pub blue: BlueConfig,
    pub green: GreenConfig,
    pub demo: DemoConfig,
    pub room: RoomLayout,
}

impl EncounterConfig {
    pub const DEFAULT_TICK_RATE: u32 = 30;

    /// Duration of a single simulation tick.
    pub fn tick(&self) -> Duration {
        tick_duration(self.tick_rate)
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            tick_rate: Self::DEFAULT_TICK_RATE,
            boss: BossConfig::default(),
            energy: EnergyConfig::default(),
            room_effect: RoomEffectConfig::default(),
            red: RedConfig::default(),
            blue: BlueConfig::default(),
            green: GreenConfig::default(),
            demo: DemoConfig::default(),
            room: RoomLayout::default(),
        }
    }
}

/// General guard tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossConfig {
    /// Size of the shared health pool.
    pub max_health: i32,
    pub mass: f32,
    pub speed: f32,
    pub aggression: f32,
    /// A player this close to any guard starts the fight.
    pub start_fight_dist: f32,
    /// Radius under a guard searched for stacked flames.
    pub flames_radius: f32,
    /// Number of player flames that triggers the water barrel.
    pub flames_count: usize,
    pub barrel_damage: i32,
    /// Per-tick damage that counts as a burst hit.
    pub burst_threshold: i32,
    pub burst_invulnerable_secs: f32,
    /// Keep guards passive for map testing.
    pub passive: bool,
}

impl BossConfig {
    /// Aggression a guard fights with; passive guards never seek players.
    pub fn aggression_level(&self) -> f32 {
        if self.passive { 0.0 } else { self.aggression }
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_health: 1000,
            mass: 20.0,
            speed: 1.0,
            aggression: 1.0,
            start_fight_dist: 138.0,
            flames_radius: 5.0,
            flames_count: 2,
            barrel_damage: 100,
            burst_threshold: 10,
            burst_invulnerable_secs: 1.0,
            passive: false,
        }
    }
}

/// Energy gathering and elemental explosions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnergyConfig {
    pub delay_secs: f32,
    /// Guards closer than this gather energy instead of shielding.
    pub dist: f32,
    /// Energy (whole seconds of pairing) needed to explode.
    pub charge: u32,
    pub damage: i32,
    pub damage_weak: i32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            delay_secs: 4.0,
            dist: 138.0,
            charge: 50,
            damage: 20,
            damage_weak: 2,
        }
    }
}

/// Room-wide hazard cycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoomEffectConfig {
    pub delay_secs: f32,
    pub timeout_secs: f32,
    pub confuse_secs: f32,
    pub power_interval_secs: f32,
    pub power_report_secs: f32,
}

impl Default for RoomEffectConfig {
    fn default() -> Self {
        Self {
            delay_secs: 2.0,
            timeout_secs: 60.0,
            confuse_secs: 10.0,
            power_interval_secs: 15.0,
            power_report_secs: 5.0,
        }
    }
}

/// Red ability: flame line and target flames.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RedConfig {
    pub cooldown_secs: f32,
    pub charge_secs: f32,
    pub warmup_secs: f32,
    pub line_count: usize,
    pub line_min_dist: f32,
    pub target_min_dist: f32,
    pub target_max_dist: f32,
    pub reduce_interval_secs: f32,
    pub weak_radius: f32,
    /// Ring spin in radians per second.
    pub weak_speed: f32,
}

impl Default for RedConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 48.0,
            charge_secs: 4.0,
            warmup_secs: 26.0,
            line_count: 3,
            line_min_dist: 34.0,
            target_min_dist: 184.0,
            target_max_dist: 210.0,
            reduce_interval_secs: 2.0,
            weak_radius: 42.0,
            weak_speed: 1.5,
        }
    }
}

/// Blue ability: orbiting lightning rings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlueConfig {
    pub cooldown_secs: f32,
    pub charge_secs: f32,
    pub warmup_secs: f32,
    pub outer_radius: f32,
    pub outer_count: usize,
    /// Damage per tick while inside the outer ring.
    pub outer_damage: i32,
    pub outer_speed: f32,
    pub inner_radius: f32,
    pub inner_count: usize,
    pub inner_damage: i32,
    pub inner_damage_weak: i32,
    pub inner_stun_secs: f32,
    pub inner_stun_weak_secs: f32,
    pub inner_speed: f32,
}

impl Default for BlueConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 48.0,
            charge_secs: 4.0,
            warmup_secs: 10.0,
            outer_radius: 138.0,
            outer_count: 10,
            outer_damage: 2,
            outer_speed: 1.5,
            inner_radius: 46.0,
            inner_count: 10,
            inner_damage: 20,
            inner_damage_weak: 2,
            inner_stun_secs: 20.0,
            inner_stun_weak_secs: 2.0,
            inner_speed: 1.5,
        }
    }
}

/// Green ability: bouncing projectile.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GreenConfig {
    pub cooldown_secs: f32,
    pub warmup_secs: f32,
    pub charge_secs: f32,
    /// Maximum number of simultaneously active projectiles per guard.
    pub max_active: usize,
    /// Units per second.
    pub proj_speed: f32,
    /// Units per second once converted into the death payload.
    pub proj_speed_death: f32,
    pub kick_interval_secs: f32,
    pub kick_dist: f32,
}

impl Default for GreenConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 48.0,
            warmup_secs: 42.0,
            charge_secs: 4.0,
            max_active: 4,
            proj_speed: 60.0,
            proj_speed_death: 30.0,
            kick_interval_secs: 1.0,
            kick_dist: 23.0,
        }
    }
}

/// Antechamber preview scene.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DemoConfig {
    /// Players with `u` below this have entered the antechamber.
    pub trigger_limit: f32,
    pub decoy_spawns: Vec<Point>,
    pub boss_spawn: Point,
    pub hazard: HazardAxis,
    pub effect_timeout_secs: f32,
    pub power_interval_secs: f32,
    pub players_freeze_secs: f32,
    pub boss_unfreeze_secs: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            trigger_limit: 10280.0,
            decoy_spawns: vec![
                Point::new(4887.0, 4979.0),
                Point::new(4979.0, 4887.0),
                Point::new(4841.0, 5025.0),
                Point::new(5025.0, 4841.0),
                Point::new(4795.0, 5071.0),
                Point::new(5071.0, 4795.0),
            ],
            boss_spawn: Point::new(4933.0, 4933.0),
            hazard: HazardAxis {
                start: Point::new(4910.0, 4910.0),
                length: 217,
                width: 368.0,
            },
            effect_timeout_secs: 20.0,
            power_interval_secs: 5.0,
            players_freeze_secs: 10.0,
            boss_unfreeze_secs: 8.0,
        }
    }
}
