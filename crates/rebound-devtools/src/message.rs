use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Message type of commands issued from the extension's UI.
pub const DISPATCH: &str = "DISPATCH";

/// A message sent by the debugging extension.
///
/// ```json
/// { "type": "DISPATCH", "payload": { "type": "JUMP_TO_STATE" }, "state": "42" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Payload,
    /// JSON text of the state to travel to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Commands that move the inspected state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayCommand {
    JumpToAction,
    JumpToState,
}

impl ReplayCommand {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "JUMP_TO_ACTION" => Some(Self::JumpToAction),
            "JUMP_TO_STATE" => Some(Self::JumpToState),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::JumpToAction => "JUMP_TO_ACTION",
            Self::JumpToState => "JUMP_TO_STATE",
        }
    }
}

impl Message {
    /// A `DISPATCH` message with the given payload type.
    pub fn dispatch(command: impl Into<String>, state: Option<String>) -> Self {
        Self {
            kind: DISPATCH.into(),
            payload: Payload {
                kind: command.into(),
            },
            state,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn replay_command(&self) -> Option<ReplayCommand> {
        if self.kind != DISPATCH {
            return None;
        }
        ReplayCommand::parse(&self.payload.kind)
    }

    /// Whether the message asks the inspected component to change state.
    pub fn is_relevant(&self) -> bool {
        self.replay_command().is_some()
    }

    pub fn replay_state<S: DeserializeOwned>(&self) -> Result<S, BridgeError> {
        let text = self.state.as_deref().ok_or(BridgeError::MissingState)?;
        Ok(serde_json::from_str(text)?)
    }
}
