use std::rc::Rc;

use rebound_core::Dispose;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{BridgeError, ConnectConfig, DevToolsConnection, DevToolsExtension, Message};

/// Label of outgoing state snapshots.
pub const UPDATE: &str = "update";

/// A live connection between one component instance and the extension.
pub struct Session {
    label: String,
    extension: Rc<dyn DevToolsExtension>,
    connection: Rc<dyn DevToolsConnection>,
    listener: Dispose,
}

impl Session {
    /// Connects under `label` and forwards every message to `on_message`.
    pub fn open(
        extension: Rc<dyn DevToolsExtension>,
        label: impl Into<String>,
        on_message: impl Fn(&Message) + 'static,
    ) -> Self {
        let label = label.into();
        let connection = extension.connect(ConnectConfig {
            name: Some(label.clone()),
        });
        let listener = connection.subscribe(Rc::new(on_message));
        log::debug!("devtools connected as {label}");
        Self {
            label,
            extension,
            connection,
            listener,
        }
    }

    /// Like [`Session::open`], but only hands over the decoded state of
    /// replay commands. Other messages are dropped.
    pub fn open_replay<S: DeserializeOwned + 'static>(
        extension: Rc<dyn DevToolsExtension>,
        label: impl Into<String>,
        on_replay: impl Fn(Result<S, BridgeError>) + 'static,
    ) -> Self {
        Self::open(extension, label, move |message| {
            if message.is_relevant() {
                on_replay(message.replay_state());
            }
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sender(&self) -> Sender {
        Sender {
            connection: self.connection.clone(),
        }
    }

    /// Stops listening and disconnects from the extension.
    pub fn close(self) {
        self.listener.run();
        self.extension.disconnect();
        log::debug!("devtools disconnected from {}", self.label);
    }
}

/// Outgoing half of a [`Session`].
#[derive(Clone)]
pub struct Sender {
    connection: Rc<dyn DevToolsConnection>,
}

impl Sender {
    pub fn send_update<S: Serialize>(&self, state: &S) -> Result<(), BridgeError> {
        let payload = serde_json::to_value(state)?;
        self.connection.send(UPDATE, payload);
        Ok(())
    }
}
