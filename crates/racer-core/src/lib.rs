//! Session logic for the box racer.
//!
//! Everything in this crate is independent of the renderer and the physics
//! engine. The scene, the physics world and the user notification surface are
//! reached through the collaborator traits in [`backend`], so the whole game
//! loop can be single-stepped in tests against an in-memory world.

pub mod backend;
pub mod config;
mod error;
pub mod input;
pub mod mode;
pub mod race;
pub mod run_loop;
pub mod session;
pub mod track;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    BodyDesc, BodyKind, BoxVisual, GameWorld, Notifier, PhysicsBackend, Pose, RgbColor,
    SceneBackend,
};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use input::{ControlState, DriveCommand};
pub use mode::Mode;
pub use run_loop::{CancellationToken, FixedTimestep, RunLoop};
pub use session::{AiCar, Car, Session};
pub use track::{TrackLayout, TrackSegment};
