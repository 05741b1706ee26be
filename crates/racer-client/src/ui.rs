//! Control panel and alert overlay.
//!
//! The panel shows the session state and offers buttons for the session
//! operations. Buttons queue [`SessionCommand`]s like the key bindings do.

use avian3d::prelude::LinearVelocity;
use bevy::{ecs::system::SystemParam, prelude::*};
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

use crate::{
    backend::PendingAlert,
    session::{AnimationDriver, RaceSession, SessionCommand, SessionCommands},
};

/// Plugin for the control panel and alert overlay.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, (control_panel_system, alert_system));
    }
}

/// Resources for the control panel.
#[derive(SystemParam)]
struct PanelParams<'w> {
    session: Res<'w, RaceSession>,
    driver: Res<'w, AnimationDriver>,
    commands: ResMut<'w, SessionCommands>,
    alert: Res<'w, PendingAlert>,
}

fn control_panel_system(
    mut contexts: EguiContexts,
    mut params: PanelParams,
    velocities: Query<&LinearVelocity>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let session = &params.session.0;
    let car_speed = session
        .car()
        .and_then(|car| velocities.get(car.body).ok())
        .map(|v| v.0.length());

    egui::Window::new("Racer")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Mode: {}", session.mode()));
            ui.label(format!("Track segments: {}", session.track().len()));
            ui.label(format!("AI cars: {}", session.ai_cars().len()));
            ui.label(format!("Ticks: {}", params.driver.0.ticks()));
            if let Some(speed) = car_speed {
                ui.label(format!("Car speed: {speed:.2} m/s"));
            }

            ui.separator();

            // Everything is disabled while an alert waits for acknowledgement.
            ui.add_enabled_ui(!params.alert.is_open(), |ui| {
                let buttons = [
                    ("Toggle designer (T)", SessionCommand::ToggleDesigner),
                    ("Add segment (+)", SessionCommand::AddSegment),
                    ("Remove segment (-)", SessionCommand::RemoveSegment),
                    ("Start race (Enter)", SessionCommand::StartRace),
                ];
                for (label, command) in buttons {
                    if ui.button(label).clicked() {
                        params.commands.push(command);
                    }
                }
            });

            ui.separator();
            ui.label("Arrow keys drive in play mode.");
        });

    Ok(())
}

/// Show the pending alert until the user dismisses it.
fn alert_system(mut contexts: EguiContexts, mut alert: ResMut<PendingAlert>) -> Result {
    let Some(message) = alert.message.clone() else {
        return Ok(());
    };
    let ctx = contexts.ctx_mut()?;

    let mut dismissed = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(&message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        alert.dismiss();
    }
    Ok(())
}
