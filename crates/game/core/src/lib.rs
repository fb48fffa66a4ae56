//! Deterministic director for the Stone Guard encounter.
//!
//! `encounter-core` holds the fight rules: three elemental guards sharing one
//! health pool, their abilities, the room-wide hazard and the antechamber
//! preview. It never owns the world; every effect goes through the traits in
//! [`env`], so the same code drives a game engine or the in-memory
//! [`SandboxWorld`]. The host calls [`Encounter::update`] once per tick.
pub mod ability;
pub mod clock;
pub mod config;
pub mod demo;
pub mod director;
pub mod element;
pub mod env;
pub mod error;
pub mod guard;
pub mod room;
pub mod spatial;

pub use ability::{AbilityEngine, SpellContext};
pub use clock::{Stopwatch, Tick, tick_duration};
pub use config::{
    BlueConfig, BossConfig, DemoConfig, EncounterConfig, EnergyConfig, GreenConfig, RedConfig,
    RoomEffectConfig,
};
pub use demo::{PreviewPhase, PreviewScene};
pub use director::{Encounter, EncounterPhase, HealthPool};
pub use element::Element;
pub use env::{
    DamageKind, Enchant, EntityHost, EntityId, FrameHook, Host, HostError, Lifetime, ObjectKind,
    PartyOracle, PcgRng, RngOracle, RoomHost, SandboxWorld, SpatialOracle, SpellKind, UnitHost,
    VisualEffect, WallCell,
};
pub use error::{EncounterError, EncounterResult, ErrorSeverity};
pub use guard::GuardAgent;
pub use room::RoomEffectCycler;
pub use spatial::{HazardAxis, Point, RoomLayout, Wall};
