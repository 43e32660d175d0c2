//! # Input State
//!
//! Edit intent handed to the terrain engine by whoever reads the devices.
//! Keyboard, touch and gamepad handling live outside the crate; they only set
//! the aim ray, the edit mode and the state of the dig button here.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::block_type::BlockType;

/// Represents the state of a button across two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Button is not pressed
    #[default]
    NotPressed,
    /// Button was just pressed this frame
    Pressed,
    /// Button has been held down for multiple frames
    Held,
    /// Button was just released this frame
    Released,
}

impl ButtonState {
    /// Determines if the button is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Held)
    }

    pub fn is_just_pressed(&self) -> bool {
        matches!(self, ButtonState::Pressed)
    }

    /// Derives the state from the previous and current raw button values
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => ButtonState::Pressed,
            (true, true) => ButtonState::Held,
            (true, false) => ButtonState::Released,
            (false, false) => ButtonState::NotPressed,
        }
    }
}

/// What the primary action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Building,
    Destroying,
}

impl EditMode {
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Building => EditMode::Destroying,
            EditMode::Destroying => EditMode::Building,
        }
    }
}

/// Ray along which the player is looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// The player's current edit intent.
#[derive(Debug, Clone, PartialEq)]
pub struct EditInput {
    pub mode: EditMode,
    pub dig_button: ButtonState,
    pub aim: Option<Aim>,
    /// Type placed by a build action.
    pub selected_block: BlockType,
}

impl Default for EditInput {
    fn default() -> Self {
        EditInput {
            mode: EditMode::default(),
            dig_button: ButtonState::default(),
            aim: None,
            selected_block: BlockType::Dirt,
        }
    }
}

impl EditInput {
    /// Whether a dig in progress may continue.
    pub fn is_digging(&self) -> bool {
        self.mode == EditMode::Destroying && self.dig_button.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_transitions() {
        assert_eq!(ButtonState::from_raw_states(false, true), ButtonState::Pressed);
        assert_eq!(ButtonState::from_raw_states(true, true), ButtonState::Held);
        assert_eq!(ButtonState::from_raw_states(true, false), ButtonState::Released);
        assert!(!ButtonState::Released.is_active());
    }

    #[test]
    fn digging_needs_destroying_mode() {
        let mut input = EditInput {
            dig_button: ButtonState::Held,
            ..EditInput::default()
        };
        assert!(!input.is_digging());
        input.mode = input.mode.toggled();
        assert!(input.is_digging());
    }
}
