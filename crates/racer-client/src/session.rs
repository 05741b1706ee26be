//! Session integration.
//!
//! Owns the [`RaceSession`] and its [`AnimationDriver`] as resources and runs
//! them from exclusive systems, so every session operation sees the ECS world
//! through [`EcsWorld`]. UI buttons and key bindings never touch the session
//! directly; they queue [`SessionCommand`]s that are applied once per frame
//! before the driver ticks.

use avian3d::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use racer_core::{ControlState, Mode, RunLoop, Session, SessionConfig};

use crate::{
    backend::{EcsWorld, PendingAlert, PhysicsStep, RaceCamera},
    input::{DriveAction, default_drive_input_map, default_session_input_map, sample_controls},
};

/// Session whose visuals and bodies are ECS entities.
pub type GameSession = Session<Entity, Entity>;

/// The running game session.
#[derive(Resource)]
pub struct RaceSession(pub GameSession);

/// Fixed-step driver for the session.
#[derive(Resource)]
pub struct AnimationDriver(pub RunLoop);

impl AnimationDriver {
    /// Stop ticking and shut the app down at the end of the frame.
    pub fn cancel(&self) {
        self.0.token().cancel();
    }
}

/// A request to run one session operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleDesigner,
    AddSegment,
    RemoveSegment,
    StartRace,
}

/// Commands queued this frame, applied in order.
#[derive(Resource, Default)]
pub struct SessionCommands(Vec<SessionCommand>);

impl SessionCommands {
    pub fn push(&mut self, command: SessionCommand) {
        self.0.push(command);
    }

    pub(crate) fn take(&mut self) -> Vec<SessionCommand> {
        std::mem::take(&mut self.0)
    }
}

/// Plugin that creates the session and drives it every frame.
pub struct SessionPlugin {
    pub config: SessionConfig,
    /// Seed for AI placement; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub initial_mode: Mode,
}

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        let mut session = match self.seed {
            Some(seed) => GameSession::new(self.config.clone(), seed),
            None => GameSession::from_entropy(self.config.clone()),
        };
        session.set_initial_mode(self.initial_mode);
        let driver = RunLoop::new(&self.config);

        // Avian only advances when the session steps it.
        app.add_plugins(PhysicsPlugins::new(PhysicsStep))
            .insert_resource(RaceSession(session))
            .insert_resource(AnimationDriver(driver))
            .init_resource::<SessionCommands>()
            .init_resource::<PendingAlert>()
            .add_systems(Startup, init_session)
            .add_systems(
                Update,
                (
                    apply_session_commands,
                    drive_session.run_if(alert_closed),
                    exit_when_cancelled,
                )
                    .chain(),
            );
    }
}

/// Run condition: no blocking alert is on screen.
fn alert_closed(alert: Res<PendingAlert>) -> bool {
    !alert.is_open()
}

/// Spawn the camera and let the session populate the world.
fn init_session(world: &mut World) {
    let config = world.resource::<RaceSession>().0.config().clone();

    world.spawn((
        RaceCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..Default::default()
        }),
        Transform::from_translation(config.initial_camera),
        default_drive_input_map(),
        default_session_input_map(),
    ));

    world.resource_scope(|world, mut session: Mut<RaceSession>| {
        session.0.init(&mut EcsWorld::new(world));
    });

    tracing::info!("Scene setup complete - arrow keys drive, T toggles the track designer");
}

/// Apply queued session commands.
///
/// Commands queued while an alert is open are discarded.
fn apply_session_commands(world: &mut World) {
    let commands = world.resource_mut::<SessionCommands>().take();
    if commands.is_empty() {
        return;
    }
    if world.resource::<PendingAlert>().is_open() {
        tracing::debug!("Discarding {} session commands behind an alert", commands.len());
        return;
    }

    world.resource_scope(|world, mut session: Mut<RaceSession>| {
        let mut ecs = EcsWorld::new(world);
        let game = &mut session.0;
        for command in commands {
            match command {
                SessionCommand::ToggleDesigner => {
                    game.toggle_track_designer(&mut ecs);
                }
                SessionCommand::AddSegment => {
                    game.add_track_segment(&mut ecs);
                }
                SessionCommand::RemoveSegment => {
                    game.remove_track_segment(&mut ecs);
                }
                SessionCommand::StartRace => {
                    // The user has already been alerted on failure.
                    if let Err(e) = game.start_race(&mut ecs) {
                        tracing::debug!("Race not started: {e}");
                    }
                }
            }
        }
    });
}

/// Advance the session by this frame's elapsed time.
fn drive_session(world: &mut World) {
    let elapsed = world.resource::<Time>().delta();

    let mut action_query = world.query::<&ActionState<DriveAction>>();
    let controls = action_query
        .single(world)
        .map(sample_controls)
        .unwrap_or(ControlState::RELEASED);

    world.resource_scope(|world, mut driver: Mut<AnimationDriver>| {
        world.resource_scope(|world, mut session: Mut<RaceSession>| {
            let mut ecs = EcsWorld::new(world);
            if let Err(e) = driver.0.advance(&mut session.0, &mut ecs, elapsed, controls) {
                tracing::debug!("Animation driver stopped: {e}");
            }
        });
    });
}

/// Close the app once the driver has been cancelled.
fn exit_when_cancelled(driver: Res<AnimationDriver>, mut exit: MessageWriter<AppExit>) {
    if driver.0.is_cancelled() {
        tracing::info!("Shutting down after {} ticks", driver.0.ticks());
        exit.write(AppExit::Success);
    }
}
