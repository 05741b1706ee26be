//! Session configuration.
//!
//! Every tunable constant of the game lives here. All fields have defaults, so
//! a config file only needs to list the values it overrides:
//!
//! ```toml
//! segment_stride = 12.0
//! ai_car_count = 5
//! race_camera = [0.0, 8.0, 14.0]
//! ```

use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

use crate::{Error, Result, backend::RgbColor};

/// Standard gravity used by the prototype (m/s^2, slightly above 9.81).
pub const DEFAULT_GRAVITY: f32 = 9.82;

/// Physics timestep in seconds.
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

/// Depth-axis distance between consecutive track segments.
pub const DEFAULT_SEGMENT_STRIDE: f32 = 10.0;

/// Number of AI cars spawned per race start.
pub const DEFAULT_AI_CAR_COUNT: usize = 3;

/// Message shown when a race is started on an empty track.
pub const EMPTY_TRACK_MESSAGE: &str = "Please add some track segments before starting the race!";

/// Tunable parameters for a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Gravity vector applied to the physics world.
    pub gravity: Vec3,
    /// Fixed physics timestep in seconds.
    pub timestep: f32,
    /// Maximum physics steps run for a single frame before excess time is dropped.
    pub max_steps_per_frame: u32,

    /// Car spawn (and reset) position.
    pub car_spawn: Vec3,
    /// Car visual edge lengths.
    pub car_size: Vec3,
    /// Car body mass in kg.
    pub car_mass: f32,
    pub car_color: RgbColor,

    /// Track segment visual edge lengths.
    pub segment_size: Vec3,
    /// Track segment collider half-extents.
    pub segment_half_extents: Vec3,
    /// Depth-axis offset between consecutive segments.
    pub segment_stride: f32,
    pub segment_color: RgbColor,

    /// Linear speed set by the forward/backward controls.
    pub drive_speed: f32,
    /// Yaw rate set by the turn controls (rad/s).
    pub turn_speed: f32,

    /// AI cars created per race start.
    pub ai_car_count: usize,
    /// AI cars spawn in `[-h, h)` on X and Z.
    pub ai_spawn_half_extent: f32,
    /// AI car spawn height.
    pub ai_spawn_height: f32,

    /// Camera position at startup.
    pub initial_camera: Vec3,
    /// Camera position when entering the track designer.
    pub designer_camera: Vec3,
    /// Camera position when entering play mode or starting a race.
    pub race_camera: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let camera = Vec3::new(0.0, 5.0, 10.0);
        Self {
            gravity: Vec3::new(0.0, -DEFAULT_GRAVITY, 0.0),
            timestep: DEFAULT_TIMESTEP,
            max_steps_per_frame: 5,
            car_spawn: Vec3::new(0.0, 1.0, 0.0),
            car_size: Vec3::new(0.5, 0.5, 1.0),
            car_mass: 1.0,
            car_color: RgbColor::RED,
            segment_size: Vec3::new(1.0, 0.1, 10.0),
            segment_half_extents: Vec3::new(0.5, 0.1, 5.0),
            segment_stride: DEFAULT_SEGMENT_STRIDE,
            segment_color: RgbColor::GREEN,
            drive_speed: 0.1,
            turn_speed: 0.05,
            ai_car_count: DEFAULT_AI_CAR_COUNT,
            ai_spawn_half_extent: 2.5,
            ai_spawn_height: 0.5,
            initial_camera: camera,
            designer_camera: camera,
            race_camera: camera,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, detail: impl Into<String>) -> Error {
            Error::InvalidConfig {
                field,
                detail: detail.into(),
            }
        }

        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(invalid("timestep", format!("must be > 0, got {}", self.timestep)));
        }
        match Duration::try_from_secs_f32(self.timestep) {
            Ok(step) if !step.is_zero() => {}
            _ => {
                return Err(invalid(
                    "timestep",
                    format!("{} is not representable as a step duration", self.timestep),
                ));
            }
        }
        if self.max_steps_per_frame == 0 {
            return Err(invalid("max_steps_per_frame", "must be at least 1"));
        }
        if !(self.segment_stride.is_finite() && self.segment_stride > 0.0) {
            return Err(invalid(
                "segment_stride",
                format!("must be > 0, got {}", self.segment_stride),
            ));
        }
        if !(self.car_mass.is_finite() && self.car_mass > 0.0) {
            return Err(invalid("car_mass", format!("must be > 0, got {}", self.car_mass)));
        }
        for (field, extents) in [
            ("car_size", self.car_size),
            ("segment_size", self.segment_size),
            ("segment_half_extents", self.segment_half_extents),
        ] {
            if !(extents.is_finite() && extents.min_element() > 0.0) {
                return Err(invalid(field, format!("all components must be > 0, got {extents}")));
            }
        }
        if !(self.ai_spawn_half_extent.is_finite() && self.ai_spawn_half_extent >= 0.0) {
            return Err(invalid(
                "ai_spawn_half_extent",
                format!("must be >= 0, got {}", self.ai_spawn_half_extent),
            ));
        }
        if !self.drive_speed.is_finite() {
            return Err(invalid("drive_speed", format!("must be finite, got {}", self.drive_speed)));
        }
        if !self.turn_speed.is_finite() {
            return Err(invalid("turn_speed", format!("must be finite, got {}", self.turn_speed)));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid(
                "fov_degrees",
                format!("must be in (0, 180), got {}", self.fov_degrees),
            ));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(invalid(
                "far",
                format!("need 0 < near < far, got near={} far={}", self.near, self.far),
            ));
        }
        Ok(())
    }

    /// Car body half-extents, derived from the visual size.
    pub fn car_half_extents(&self) -> Vec3 {
        self.car_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = SessionConfig::from_toml_str(
            r#"
            segment_stride = 12.5
            ai_car_count = 5
            race_camera = [0.0, 8.0, 14.0]
            segment_color = 0x3366ff
            "#,
        )
        .unwrap();

        assert_eq!(config.segment_stride, 12.5);
        assert_eq!(config.ai_car_count, 5);
        assert_eq!(config.race_camera, Vec3::new(0.0, 8.0, 14.0));
        assert_eq!(config.segment_color, RgbColor(0x33_66_ff));
        // Untouched fields keep their defaults.
        assert_eq!(config.designer_camera, Vec3::new(0.0, 5.0, 10.0));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SessionConfig::from_toml_str("segment_strid = 3.0").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_non_positive_stride_rejected() {
        let err = SessionConfig::from_toml_str("segment_stride = 0.0").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "segment_stride",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let config = SessionConfig {
            timestep: 0.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "timestep",
                ..
            })
        ));
    }

    #[test]
    fn test_unrepresentable_timestep_rejected() {
        for timestep in ["1e-10", "1e30"] {
            let err = SessionConfig::from_toml_str(&format!("timestep = {timestep}")).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::InvalidConfig {
                        field: "timestep",
                        ..
                    }
                ),
                "timestep {timestep} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_turn_speed_names_field() {
        let config = SessionConfig {
            turn_speed: f32::NAN,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "turn_speed",
                ..
            })
        ));
    }

    #[test]
    fn test_fov_out_of_range_rejected() {
        for fov in ["0.0", "180.0", "-30.0"] {
            let err = SessionConfig::from_toml_str(&format!("fov_degrees = {fov}")).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidConfig {
                    field: "fov_degrees",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_colour_wider_than_24_bits_rejected() {
        let err = SessionConfig::from_toml_str("segment_color = 0xff00ff00").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_car_half_extents() {
        let config = SessionConfig::default();
        assert_eq!(config.car_half_extents(), Vec3::new(0.25, 0.25, 0.5));
    }
}
