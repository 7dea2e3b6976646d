// src/input/mod.rs

//! Answer input channels.
//!
//! Every way of typing into an answer (physical keyboard, the on-screen
//! virtual keyboard, the webcam gesture keyboard) ends up as a key activation
//! on an [`AnswerInputChannel`].

pub mod gesture;

use std::{fmt, str::FromStr};

pub use gesture::{GestureKeyboard, HandFrame, KeyRegion, Point, Rect};

/// Letter rows of the virtual keyboard, top to bottom.
pub const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Labels of the editing keys on the last keyboard row.
pub const SPECIAL_KEYS: [&str; 3] = ["SPACE", "BACKSPACE", "CLEAR"];

/// A single activation of a virtual key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Backspace,
    Clear,
}

impl Key {
    /// The answer text after this key is applied to `current`.
    pub fn apply(self, current: &str) -> String {
        match self {
            Key::Char(c) => {
                let mut next = current.to_string();
                next.push(c);
                next
            }
            Key::Space => format!("{current} "),
            Key::Backspace => {
                let mut next = current.to_string();
                next.pop();
                next
            }
            Key::Clear => String::new(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Space => f.write_str("SPACE"),
            Key::Backspace => f.write_str("BACKSPACE"),
            Key::Clear => f.write_str("CLEAR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key label '{0}'")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        match label.to_ascii_uppercase().as_str() {
            "SPACE" => return Ok(Key::Space),
            "BACKSPACE" | "⌫" => return Ok(Key::Backspace),
            "CLEAR" => return Ok(Key::Clear),
            _ => {}
        }

        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Ok(Key::Char(c)),
            _ => Err(UnknownKey(label.to_string())),
        }
    }
}

/// Receives key activations from an input adapter.
pub trait AnswerInputChannel {
    /// Applies the key named `label` to the answer currently being edited.
    /// Returns whether the activation changed anything.
    fn activate_key(&self, label: &str) -> bool;
}

/// The camera or hand-landmark detector could not be used.
/// Input degrades to the keyboard; submission is never blocked by it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Gesture keyboard disabled: {0}")]
pub struct InputDeviceFailure(pub String);
