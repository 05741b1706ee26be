//! Collaborator traits for the scene, the physics world and user notifications.
//!
//! A session never touches a renderer or a physics engine directly. It issues
//! requests through these traits and keeps the returned handles. The Bevy
//! client implements them on top of an ECS `World`; tests use an in-memory
//! recording world.

use std::fmt;

use glam::{Quat, Vec3};
use serde::Deserialize;

/// Position and orientation of an object in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    /// Identity pose at the origin.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Pose at `translation` with no rotation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 24-bit sRGB colour, stored as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u32")]
pub struct RgbColor(pub u32);

impl RgbColor {
    pub const RED: Self = Self(0xff_00_00);
    pub const GREEN: Self = Self(0x00_ff_00);

    /// Build a colour from the low 24 bits of `hex`.
    pub fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    /// Split into `(r, g, b)` bytes.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }
}

impl TryFrom<u32> for RgbColor {
    type Error = String;

    fn try_from(hex: u32) -> std::result::Result<Self, Self::Error> {
        if hex > 0x00ff_ffff {
            return Err(format!("colour {hex:#x} does not fit in 24 bits"));
        }
        Ok(Self(hex))
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Request for a flat-shaded box in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxVisual {
    /// Full edge lengths (x, y, z).
    pub size: Vec3,
    pub color: RgbColor,
    pub pose: Pose,
}

/// How a physics body participates in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved by the solver; affected by gravity and velocities.
    Dynamic,
    /// Immovable, zero mass.
    Static,
}

/// Request for a box-shaped rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Mass in kg. Ignored for static bodies.
    pub mass: f32,
    /// Cuboid half-extents (x, y, z).
    pub half_extents: Vec3,
    pub pose: Pose,
}

/// The visual scene graph plus camera and output surface.
pub trait SceneBackend {
    /// Handle to a visual object owned by the scene.
    type Visual: Copy + Eq + fmt::Debug;

    /// Create a box and add it to the scene.
    fn spawn_box(&mut self, visual: BoxVisual) -> Self::Visual;

    /// Remove a visual from the scene. Unknown handles are ignored.
    fn despawn_visual(&mut self, visual: Self::Visual);

    fn set_visual_pose(&mut self, visual: Self::Visual, pose: Pose);

    fn set_camera_pose(&mut self, pose: Pose);

    /// Draw the scene from the current camera.
    fn render(&mut self);
}

/// Rigid-body simulation world.
pub trait PhysicsBackend {
    /// Handle to a body registered with the world.
    type Body: Copy + Eq + fmt::Debug;

    fn set_gravity(&mut self, gravity: Vec3);

    /// Create a body and add it to the world.
    fn add_body(&mut self, desc: BodyDesc) -> Self::Body;

    /// Detach a body from the world. Unknown handles are ignored.
    fn remove_body(&mut self, body: Self::Body);

    fn set_body_pose(&mut self, body: Self::Body, pose: Pose);

    fn set_linear_velocity(&mut self, body: Self::Body, velocity: Vec3);

    fn set_angular_velocity(&mut self, body: Self::Body, velocity: Vec3);

    fn linear_velocity(&self, body: Self::Body) -> Option<Vec3>;

    fn angular_velocity(&self, body: Self::Body) -> Option<Vec3>;

    /// Current pose of a body, or `None` if the handle is unknown.
    fn body_pose(&self, body: Self::Body) -> Option<Pose>;

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

/// User-facing notification surface.
pub trait Notifier {
    /// Show a blocking message to the user.
    fn notify(&mut self, message: &str);
}

/// Everything a session needs from its host.
pub trait GameWorld: SceneBackend + PhysicsBackend + Notifier {}

impl<T: SceneBackend + PhysicsBackend + Notifier> GameWorld for T {}
