//! Drive controls.
//!
//! Input is a snapshot of which logical controls are held, sampled once per
//! tick. The commanded velocities are a pure function of that snapshot:
//! releasing a key stops the corresponding motion on the next tick.

use glam::Vec3;

/// Which drive controls are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlState {
    /// Nothing held.
    pub const RELEASED: Self = Self {
        forward: false,
        backward: false,
        left: false,
        right: false,
    };

    /// Throttle axis: +1 forward, -1 backward, 0 when neither or both are held.
    pub fn throttle(self) -> f32 {
        axis(self.forward, self.backward)
    }

    /// Steering axis: +1 left, -1 right, 0 when neither or both are held.
    pub fn steer(self) -> f32 {
        axis(self.left, self.right)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Velocities to write onto the car body for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveCommand {
    /// Velocity along the depth axis (-Z is forward).
    pub linear_z: f32,
    /// Angular velocity about +Y (positive turns left).
    pub yaw_rate: f32,
}

impl DriveCommand {
    /// Map a control snapshot to body velocities.
    pub fn from_controls(controls: ControlState, speed: f32, turn_speed: f32) -> Self {
        Self {
            linear_z: -controls.throttle() * speed,
            yaw_rate: controls.steer() * turn_speed,
        }
    }

    /// Merge into the body's current linear velocity, keeping X and Y.
    pub fn apply_linear(self, current: Vec3) -> Vec3 {
        Vec3::new(current.x, current.y, self.linear_z)
    }

    /// Merge into the body's current angular velocity, keeping pitch and roll.
    pub fn apply_angular(self, current: Vec3) -> Vec3 {
        Vec3::new(current.x, self.yaw_rate, current.z)
    }
}
