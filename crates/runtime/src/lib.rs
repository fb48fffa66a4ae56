//! Runtime binding for the Stone Guard encounter.
//!
//! A host engine exposes two callbacks: one when the map has loaded and one
//! per simulation tick. [`Simulation`] forwards them to the encounter (and the
//! optional preview scene) and closes each frame on the host.
//!
//! Modules are organized by responsibility:
//! - [`simulation`] hosts the driver and its builder
//! - [`error`] holds the runtime error type
pub mod error;
pub mod simulation;

pub use error::{Result, RuntimeError};
pub use simulation::{Simulation, SimulationBuilder};
