//! Centralized input action definitions and management.
//!
//! Defines all gameplay actions using `leafwing-input-manager` for declarative,
//! rebindable input mapping. Drive actions are sampled into a
//! [`ControlState`] snapshot once per frame; session actions are turned into
//! queued session commands.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};
use racer_core::ControlState;

use crate::{
    backend::PendingAlert,
    session::{AnimationDriver, SessionCommand, SessionCommands},
};

// ============================================================================
// Action enums
// ============================================================================

/// Actions that drive the car.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Move forward (Up arrow).
    Forward,
    /// Move backward (Down arrow).
    Backward,
    /// Turn left (Left arrow).
    TurnLeft,
    /// Turn right (Right arrow).
    TurnRight,
}

/// Actions that operate on the session itself.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum SessionAction {
    /// Switch between designer and play mode (T).
    ToggleDesigner,
    /// Append a track segment (= or numpad +).
    AddSegment,
    /// Remove the last track segment (- or Backspace).
    RemoveSegment,
    /// Start the race (Enter).
    StartRace,
    /// Quit (Escape).
    Quit,
}

// ============================================================================
// Input maps
// ============================================================================

/// Create the default input map for drive actions.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Forward, KeyCode::ArrowUp)
        .with(DriveAction::Backward, KeyCode::ArrowDown)
        .with(DriveAction::TurnLeft, KeyCode::ArrowLeft)
        .with(DriveAction::TurnRight, KeyCode::ArrowRight)
}

/// Create the default input map for session actions.
pub fn default_session_input_map() -> InputMap<SessionAction> {
    InputMap::default()
        .with(SessionAction::ToggleDesigner, KeyCode::KeyT)
        .with(SessionAction::AddSegment, KeyCode::Equal)
        .with(SessionAction::AddSegment, KeyCode::NumpadAdd)
        .with(SessionAction::RemoveSegment, KeyCode::Minus)
        .with(SessionAction::RemoveSegment, KeyCode::NumpadSubtract)
        .with(SessionAction::RemoveSegment, KeyCode::Backspace)
        .with(SessionAction::StartRace, KeyCode::Enter)
        .with(SessionAction::Quit, KeyCode::Escape)
}

/// Build the per-frame control snapshot from the drive action state.
pub fn sample_controls(action_state: &ActionState<DriveAction>) -> ControlState {
    ControlState {
        forward: action_state.pressed(&DriveAction::Forward),
        backward: action_state.pressed(&DriveAction::Backward),
        left: action_state.pressed(&DriveAction::TurnLeft),
        right: action_state.pressed(&DriveAction::TurnRight),
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers input action types and the input systems.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .add_plugins(InputManagerPlugin::<SessionAction>::default())
            .add_systems(
                PreUpdate,
                manage_input_focus.after(InputManagerSystem::Update),
            )
            .add_systems(Update, queue_session_actions);
    }
}

// ============================================================================
// Session actions
// ============================================================================

/// Turn session key presses into queued commands.
///
/// While an alert is open only Quit is honoured.
fn queue_session_actions(
    action_query: Query<&ActionState<SessionAction>>,
    mut commands: ResMut<SessionCommands>,
    driver: Res<AnimationDriver>,
    alert: Res<PendingAlert>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&SessionAction::Quit) {
        tracing::info!("Quit requested");
        driver.cancel();
        return;
    }
    if alert.is_open() {
        return;
    }

    let bindings = [
        (SessionAction::ToggleDesigner, SessionCommand::ToggleDesigner),
        (SessionAction::AddSegment, SessionCommand::AddSegment),
        (SessionAction::RemoveSegment, SessionCommand::RemoveSegment),
        (SessionAction::StartRace, SessionCommand::StartRace),
    ];
    for (action, command) in bindings {
        if action_state.just_pressed(&action) {
            commands.push(command);
        }
    }
}

// ============================================================================
// Input focus management
// ============================================================================

/// Disable keyboard actions while egui is using the keyboard.
///
/// Quit stays available so Escape always works.
fn manage_input_focus(
    mut drive_query: Query<&mut ActionState<DriveAction>>,
    mut session_query: Query<&mut ActionState<SessionAction>>,
    mut contexts: EguiContexts,
) {
    let egui_wants_kb = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.wants_keyboard_input());

    for mut action_state in &mut drive_query {
        if egui_wants_kb {
            action_state.disable_all_actions();
        } else {
            action_state.enable_all_actions();
        }
    }

    for mut action_state in &mut session_query {
        if egui_wants_kb {
            action_state.disable_all_actions();
            action_state.enable_action(&SessionAction::Quit);
        } else {
            action_state.enable_all_actions();
        }
    }
}
