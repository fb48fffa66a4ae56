//! Vocabulary shared with the host.
//!
//! The director never names concrete assets. It asks for *kinds* of objects,
//! buffs, visual effects and spells; the host maps each kind onto whatever its
//! engine provides.

use std::fmt;
use std::time::Duration;

/// Opaque handle of an entity owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid cell of a wall segment that can be toggled by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallCell {
    pub x: i32,
    pub y: i32,
}

impl WallCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Kinds of objects the encounter asks the host to create.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ObjectKind {
    /// Player-controlled unit. Only the host creates these.
    Player,
    /// Stone guard boss unit.
    Guard,
    /// Decoy unit used by the preview scene.
    Decoy,
    SmallFlame,
    MediumFlame,
    Flame,
    LargeFlame,
    /// Force field shown on an isolated guard.
    EnergyShield,
    /// Central marker of a Blue spell.
    DangerMarker,
    /// Orb of the outer Blue ring.
    OuterOrb,
    /// Orb of the inner Blue ring.
    InnerOrb,
    /// Stationary charge-up marker of a Green spell.
    GreenTelegraph,
    /// Bouncing Green projectile.
    GreenProjectile,
    /// Converted Green projectile payload.
    DeathPayload,
    /// Breakable barrel used to put out fire under a guard.
    WaterBarrel,
}

impl ObjectKind {
    /// Fire hazards players can stack under an immobile guard.
    pub const FIRE_HAZARDS: [ObjectKind; 4] = [
        ObjectKind::SmallFlame,
        ObjectKind::MediumFlame,
        ObjectKind::Flame,
        ObjectKind::LargeFlame,
    ];

    /// Returns true for kinds that behave as units (health, buffs, movement).
    pub const fn is_unit(self) -> bool {
        matches!(self, Self::Player | Self::Guard | Self::Decoy)
    }
}

/// Named timed buffs and debuffs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Enchant {
    ProtectFromFire,
    ProtectFromPoison,
    ProtectFromElectricity,
    Freeze,
    Invulnerable,
    Confused,
    Held,
    /// Charm or possession applied by a player.
    Charming,
}

impl Enchant {
    /// Effects removed by a counterspell.
    pub const fn is_dispellable(self) -> bool {
        matches!(
            self,
            Self::Freeze | Self::Confused | Self::Held | Self::Charming
        )
    }
}

/// Area visual effects drawn between two points.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VisualEffect {
    GreaterHeal,
    Charm,
    DrainMana,
    Lightning,
}

/// Spells the encounter casts through the host.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpellKind {
    /// Removes dispellable effects from units at the target point.
    Counterspell,
    /// Poison area hazard left by the Green projectile.
    ToxicCloud,
    /// Pushes nearby units away from the caster.
    TurnUndead,
}

/// Typed damage kinds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageKind {
    Fire,
    Poison,
    Electric,
    Impact,
}

/// How long an enchant stays on a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifetime {
    Infinite,
    For(Duration),
}
