//! Headless apps for exercising the ECS backend and session systems.

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{
    asset::AssetPlugin, prelude::*, scene::ScenePlugin, time::TimeUpdateStrategy,
    transform::TransformPlugin,
};
use racer_core::{Mode, SessionConfig};

use crate::{
    backend::{PendingAlert, PhysicsStep},
    session::SessionPlugin,
};

/// Window-less app with the assets the scene backend writes to.
fn base_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        AssetPlugin::default(),
        ScenePlugin,
        TransformPlugin,
    ))
    .init_asset::<Mesh>()
    .init_asset::<StandardMaterial>();
    app
}

/// Base app plus Avian in the manually stepped schedule.
pub(crate) fn physics_app() -> App {
    let mut app = base_app();
    app.add_plugins(PhysicsPlugins::new(PhysicsStep))
        .init_resource::<PendingAlert>();
    app.finish();
    app.cleanup();
    app
}

/// Base app running the full session plugin. Every update advances the
/// clock by `frame`.
pub(crate) fn session_app(frame: Duration) -> App {
    let mut app = base_app();
    app.add_plugins(SessionPlugin {
        config: SessionConfig::default(),
        seed: Some(7),
        initial_mode: Mode::Racing,
    })
    .insert_resource(TimeUpdateStrategy::ManualDuration(frame));
    app.finish();
    app.cleanup();
    app
}
