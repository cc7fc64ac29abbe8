//! Keyboard command source.
//!
//! The chord is Meta+Alt (Command+Option on macOS) plus one key. Matched
//! chords are reserved: the caller must prevent the default action and
//! stop propagation.

use serde::{Deserialize, Serialize};

use crate::domain::SPEED_STEP;
use crate::services::{SpeedController, SpeedOrigin, SpeedOutcome};

/// A key press with modifier state, using DOM `KeyboardEvent.code` names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyChord {
    pub meta: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub code: String,
}

impl KeyChord {
    /// Meta+Alt with `code`.
    pub fn meta_alt(code: &str) -> Self {
        Self {
            meta: true,
            alt: true,
            code: code.to_string(),
            ..Self::default()
        }
    }
}

/// Command a chord maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Increase,
    Decrease,
    Reset,
}

impl KeyCommand {
    /// Map a chord to a command. `None` means the chord is not ours.
    pub fn from_chord(chord: &KeyChord) -> Option<Self> {
        if !(chord.meta && chord.alt) {
            return None;
        }
        match chord.code.as_str() {
            "Equal" | "NumpadAdd" | "Plus" => Some(Self::Increase),
            "Minus" | "NumpadSubtract" => Some(Self::Decrease),
            "Delete" | "Backspace" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// What the caller should do with the key event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyDisposition {
    /// Reserved chord: prevent default and stop propagation.
    Consumed(KeyCommand, SpeedOutcome),
    /// Let the event through untouched.
    Ignored,
}

impl KeyDisposition {
    /// Whether the event must be swallowed.
    pub const fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed(..))
    }
}

/// Run a key event against `controller`.
pub fn dispatch_key(controller: &SpeedController, chord: &KeyChord) -> KeyDisposition {
    let Some(command) = KeyCommand::from_chord(chord) else {
        return KeyDisposition::Ignored;
    };
    let outcome = match command {
        KeyCommand::Increase => controller.adjust_speed(SPEED_STEP, SpeedOrigin::Keyboard),
        KeyCommand::Decrease => controller.adjust_speed(-SPEED_STEP, SpeedOrigin::Keyboard),
        KeyCommand::Reset => controller.reset(SpeedOrigin::Keyboard),
    };
    KeyDisposition::Consumed(command, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_mapping() {
        for code in ["Equal", "NumpadAdd", "Plus"] {
            assert_eq!(
                KeyCommand::from_chord(&KeyChord::meta_alt(code)),
                Some(KeyCommand::Increase)
            );
        }
        for code in ["Minus", "NumpadSubtract"] {
            assert_eq!(
                KeyCommand::from_chord(&KeyChord::meta_alt(code)),
                Some(KeyCommand::Decrease)
            );
        }
        for code in ["Delete", "Backspace"] {
            assert_eq!(
                KeyCommand::from_chord(&KeyChord::meta_alt(code)),
                Some(KeyCommand::Reset)
            );
        }
    }

    #[test]
    fn test_requires_both_modifiers() {
        let meta_only = KeyChord {
            meta: true,
            code: "Equal".to_string(),
            ..KeyChord::default()
        };
        assert!(KeyCommand::from_chord(&meta_only).is_none());

        let ctrl_alt = KeyChord {
            ctrl: true,
            alt: true,
            code: "Equal".to_string(),
            ..KeyChord::default()
        };
        assert!(KeyCommand::from_chord(&ctrl_alt).is_none());
    }

    #[test]
    fn test_unrelated_key_is_not_reserved() {
        assert!(KeyCommand::from_chord(&KeyChord::meta_alt("KeyA")).is_none());
    }
}
