//! Input events consumed by the runtime.
//!
//! Input devices are outside the runtime. A presentation layer translates
//! device input into this discrete stream, one [`InputEvent`] per step.

use adventure_rules::{Point, SceneId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// One input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Quit,
    Key(KeyCommand),
    Click(Point),
}

/// Keys the runtime reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    RequestHint,
    /// Presentation-only overlay, but the toggle itself is runtime state.
    ToggleDebugOverlay,
    /// Jump to a scene; `None` means the configured jump scene.
    SceneJump(Option<SceneId>),
}

impl KeyCommand {
    /// Map a key identifier to a command. Unknown identifiers yield `None`.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "request-hint" => Some(KeyCommand::RequestHint),
            "toggle-debug-overlay" => Some(KeyCommand::ToggleDebugOverlay),
            "scene-jump" => Some(KeyCommand::SceneJump(None)),
            other => other
                .strip_prefix("scene-jump:")
                .filter(|scene| !scene.is_empty())
                .map(|scene| KeyCommand::SceneJump(Some(SceneId::new(scene)))),
        }
    }
}

/// A script line did not describe an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("empty event")]
    Empty,
    #[error("unknown event kind '{0}'")]
    UnknownKind(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("click needs two integer coordinates, got '{0}'")]
    BadCoordinates(String),
}

/// Script syntax: `quit`, `key <identifier>`, `click <x> <y>`.
impl FromStr for InputEvent {
    type Err = EventParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let kind = parts.next().ok_or(EventParseError::Empty)?;

        match kind {
            "quit" => Ok(InputEvent::Quit),
            "key" => {
                let identifier = parts.next().unwrap_or_default();
                KeyCommand::from_identifier(identifier)
                    .map(InputEvent::Key)
                    .ok_or_else(|| EventParseError::UnknownKey(identifier.to_string()))
            }
            "click" => {
                let rest: Vec<&str> = parts.collect();
                match rest.as_slice() {
                    [x, y] => match (x.parse(), y.parse()) {
                        (Ok(x), Ok(y)) => Ok(InputEvent::Click(Point::new(x, y))),
                        _ => Err(EventParseError::BadCoordinates(rest.join(" "))),
                    },
                    _ => Err(EventParseError::BadCoordinates(rest.join(" "))),
                }
            }
            other => Err(EventParseError::UnknownKind(other.to_string())),
        }
    }
}
