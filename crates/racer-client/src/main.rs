//! 3D box racer using Bevy and Avian.
//!
//! Drive a physics-backed car with the arrow keys, lay out a straight track in
//! the designer and start a race against decorative AI cars.

mod backend;
mod input;
mod launch_params;
mod session;
#[cfg(test)]
mod testing;
mod ui;

use bevy::prelude::*;
use input::InputPlugin;
use session::SessionPlugin;
use ui::UiPlugin;

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    tracing::debug!("Launch parameters: {params:?}");

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "racer".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.add_plugins((
        InputPlugin,
        SessionPlugin {
            config: params.config,
            seed: params.seed,
            initial_mode: params.initial_mode,
        },
        UiPlugin,
    ))
    .run();
}
