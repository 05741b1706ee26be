//! Designer / play mode switch.

use std::fmt;

/// What the user is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Placing and removing track segments; car controls are ignored.
    Designing,
    /// Driving the car.
    #[default]
    Racing,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Mode::Designing => Mode::Racing,
            Mode::Racing => Mode::Designing,
        }
    }

    /// Whether keyboard input drives the car in this mode.
    pub fn accepts_drive_input(self) -> bool {
        self == Mode::Racing
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Designing => write!(f, "Track designer"),
            Mode::Racing => write!(f, "Play"),
        }
    }
}
