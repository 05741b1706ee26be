//! The game session.
//!
//! A [`Session`] owns every piece of game state: the car, the track, the AI
//! cars, the current mode and the random source. It owns no engine objects,
//! only the handles returned by the collaborator traits, so each operation
//! takes the host world as an argument.

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Error, Result,
    backend::{BodyDesc, BodyKind, BoxVisual, GameWorld, Pose, RgbColor},
    config::{EMPTY_TRACK_MESSAGE, SessionConfig},
    input::{ControlState, DriveCommand},
    mode::Mode,
    race::SpawnRegion,
    track::{TrackLayout, TrackSegment},
};

/// The player's car: a visual box driven by a dynamic body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Car<V, B> {
    pub visual: V,
    pub body: B,
}

/// A decorative opponent. AI cars have no physics body and never move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiCar<V> {
    pub visual: V,
    pub position: glam::Vec3,
    pub color: RgbColor,
}

/// All game state for one play session.
///
/// `V` and `B` are the visual and body handle types of the host world.
pub struct Session<V, B> {
    config: SessionConfig,
    mode: Mode,
    car: Option<Car<V, B>>,
    track: TrackLayout<V, B>,
    ai_cars: Vec<AiCar<V>>,
    rng: StdRng,
}

impl<V: Copy, B: Copy> Session<V, B> {
    /// Create an empty session with a deterministic random source.
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Create an empty session seeded from the operating system.
    pub fn from_entropy(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        let track = TrackLayout::new(config.segment_stride);
        Self {
            config,
            mode: Mode::default(),
            car: None,
            track,
            ai_cars: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn car(&self) -> Option<&Car<V, B>> {
        self.car.as_ref()
    }

    pub fn track(&self) -> &TrackLayout<V, B> {
        &self.track
    }

    pub fn ai_cars(&self) -> &[AiCar<V>] {
        &self.ai_cars
    }

    /// Prepare the world: gravity, the car and the initial camera.
    pub fn init<W>(&mut self, world: &mut W)
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        world.set_gravity(self.config.gravity);
        self.create_car(world);
        world.set_camera_pose(Pose::from_translation(self.config.initial_camera));
        tracing::info!(
            "Session initialised (gravity {}, timestep {:.4}s)",
            self.config.gravity,
            self.config.timestep
        );
    }

    /// Start in the given mode without running a transition.
    ///
    /// Only meaningful before the first toggle, e.g. from a launch flag.
    pub fn set_initial_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Spawn the player's car, or return the existing one.
    pub fn create_car<W>(&mut self, world: &mut W) -> Car<V, B>
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        if let Some(car) = self.car {
            tracing::warn!("Car already exists, not spawning another");
            return car;
        }

        let pose = Pose::from_translation(self.config.car_spawn);
        let visual = world.spawn_box(BoxVisual {
            size: self.config.car_size,
            color: self.config.car_color,
            pose,
        });
        let body = world.add_body(BodyDesc {
            kind: BodyKind::Dynamic,
            mass: self.config.car_mass,
            half_extents: self.config.car_half_extents(),
            pose,
        });

        let car = Car { visual, body };
        self.car = Some(car);
        car
    }

    /// Append a track tile after the last one and return its position.
    pub fn add_track_segment<W>(&mut self, world: &mut W) -> glam::Vec3
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        let position = self.track.next_position();
        let pose = Pose::from_translation(position);

        let visual = world.spawn_box(BoxVisual {
            size: self.config.segment_size,
            color: self.config.segment_color,
            pose,
        });
        let body = world.add_body(BodyDesc {
            kind: BodyKind::Static,
            mass: 0.0,
            half_extents: self.config.segment_half_extents,
            pose,
        });

        self.track.push(TrackSegment {
            visual,
            body,
            position,
        });
        tracing::info!("Added track segment {} at {}", self.track.len(), position);
        position
    }

    /// Remove the most recently added tile, both from the scene and from the
    /// physics world. Returns its position, or `None` if the track is empty.
    pub fn remove_track_segment<W>(&mut self, world: &mut W) -> Option<glam::Vec3>
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        let segment = self.track.pop()?;
        world.despawn_visual(segment.visual);
        world.remove_body(segment.body);
        tracing::info!(
            "Removed track segment at {} ({} left)",
            segment.position,
            self.track.len()
        );
        Some(segment.position)
    }

    /// Spawn one batch of visual-only AI cars in the spawn region.
    pub fn create_ai_cars<W>(&mut self, world: &mut W) -> usize
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        let region = SpawnRegion {
            half_extent: self.config.ai_spawn_half_extent,
            height: self.config.ai_spawn_height,
        };
        let spawns = region.sample_batch(&mut self.rng, self.config.ai_car_count);

        for spawn in &spawns {
            let visual = world.spawn_box(BoxVisual {
                size: self.config.car_size,
                color: spawn.color,
                pose: Pose::from_translation(spawn.position),
            });
            self.ai_cars.push(AiCar {
                visual,
                position: spawn.position,
                color: spawn.color,
            });
        }
        spawns.len()
    }

    /// Switch between designer and play mode, resetting the car and camera.
    pub fn toggle_track_designer<W>(&mut self, world: &mut W) -> Mode
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        self.mode = self.mode.toggled();

        let camera = match self.mode {
            Mode::Designing => self.config.designer_camera,
            Mode::Racing => self.config.race_camera,
        };
        self.reset_car(world);
        world.set_camera_pose(Pose::from_translation(camera));

        match self.mode {
            Mode::Designing => tracing::info!("Track designer active"),
            Mode::Racing => tracing::info!("Play mode active"),
        }
        self.mode
    }

    /// Put the car back on its spawn point, at rest.
    fn reset_car<W>(&mut self, world: &mut W)
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        let Some(car) = self.car else {
            return;
        };
        let pose = Pose::from_translation(self.config.car_spawn);
        world.set_body_pose(car.body, pose);
        world.set_linear_velocity(car.body, glam::Vec3::ZERO);
        world.set_angular_velocity(car.body, glam::Vec3::ZERO);
        world.set_visual_pose(car.visual, pose);
    }

    /// Start a race: spawn the AI cars and move to the race viewpoint.
    ///
    /// With no track placed, the user is notified once, nothing else happens,
    /// and [`Error::EmptyTrack`] is returned.
    pub fn start_race<W>(&mut self, world: &mut W) -> Result<usize>
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        if self.track.is_empty() {
            world.notify(EMPTY_TRACK_MESSAGE);
            return Err(Error::EmptyTrack);
        }

        let spawned = self.create_ai_cars(world);
        world.set_camera_pose(Pose::from_translation(self.config.race_camera));
        tracing::info!(
            "Race started with {} AI cars on {} segments",
            spawned,
            self.track.len()
        );
        Ok(spawned)
    }

    /// Write the velocities for this tick's controls onto the car body.
    ///
    /// Does nothing while designing.
    pub fn apply_controls<W>(&mut self, world: &mut W, controls: ControlState)
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        if !self.mode.accepts_drive_input() {
            return;
        }
        let Some(car) = self.car else {
            return;
        };

        let command =
            DriveCommand::from_controls(controls, self.config.drive_speed, self.config.turn_speed);
        let linear = world.linear_velocity(car.body).unwrap_or_default();
        let angular = world.angular_velocity(car.body).unwrap_or_default();
        world.set_linear_velocity(car.body, command.apply_linear(linear));
        world.set_angular_velocity(car.body, command.apply_angular(angular));
    }

    /// Advance one frame: controls, physics, car sync, render.
    pub fn tick<W>(&mut self, world: &mut W, dt: f32, controls: ControlState)
    where
        W: GameWorld<Visual = V, Body = B>,
    {
        self.apply_controls(world, controls);
        world.step(dt);

        if let Some(car) = self.car {
            if let Some(pose) = world.body_pose(car.body) {
                world.set_visual_pose(car.visual, pose);
            } else {
                tracing::warn!("Car body missing from physics world");
            }
        }

        world.render();
    }
}
