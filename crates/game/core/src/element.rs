//! The three guard colors and what each one maps to.

use crate::env::{DamageKind, Enchant, VisualEffect};

/// Color of a guard and of the room-wide hazard.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    Red,
    Green,
    Blue,
}

impl Element {
    pub const ALL: [Element; 3] = [Element::Red, Element::Green, Element::Blue];

    /// Maps `0..3` onto the colors; larger values wrap around.
    pub const fn from_index(index: u32) -> Self {
        match index % 3 {
            0 => Self::Red,
            1 => Self::Green,
            _ => Self::Blue,
        }
    }

    pub const fn index(self) -> u32 {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }

    /// The following color in the fixed cycle.
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Resistance buff given to a guard of this color.
    pub const fn resistance(self) -> Enchant {
        match self {
            Self::Red => Enchant::ProtectFromFire,
            Self::Green => Enchant::ProtectFromPoison,
            Self::Blue => Enchant::ProtectFromElectricity,
        }
    }

    /// Visual played across the room while this color is active.
    pub const fn hazard(self) -> VisualEffect {
        match self {
            Self::Red => VisualEffect::GreaterHeal,
            Self::Green => VisualEffect::Charm,
            Self::Blue => VisualEffect::DrainMana,
        }
    }

    pub const fn damage_kind(self) -> DamageKind {
        match self {
            Self::Red => DamageKind::Fire,
            Self::Green => DamageKind::Poison,
            Self::Blue => DamageKind::Electric,
        }
    }

    /// The charm ray already renders in both directions; the others are mirrored.
    pub const fn hazard_is_bidirectional(self) -> bool {
        matches!(self, Self::Green)
    }
}
