use std::cell::RefCell;
use std::rc::Rc;

use rebound_core::{Config, Dispose};

use crate::Message;

pub type Handler = Rc<dyn Fn(&Message)>;

/// Options passed to [`DevToolsExtension::connect`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Instance label shown by the extension.
    pub name: Option<String>,
}

/// One connection to the extension.
pub trait DevToolsConnection {
    /// Listens for messages from the extension until the returned cleanup runs.
    fn subscribe(&self, handler: Handler) -> Dispose;

    fn send(&self, label: &str, payload: serde_json::Value);
}

pub trait DevToolsExtension {
    fn connect(&self, config: ConnectConfig) -> Rc<dyn DevToolsConnection>;

    fn disconnect(&self);
}

thread_local! {
    static INSTALLED: RefCell<Option<Rc<dyn DevToolsExtension>>> = const { RefCell::new(None) };
}

/// Makes `extension` discoverable through [`probe`]. Returns the one it replaces.
pub fn install(extension: Rc<dyn DevToolsExtension>) -> Option<Rc<dyn DevToolsExtension>> {
    INSTALLED.with(|slot| slot.borrow_mut().replace(extension))
}

pub fn uninstall() -> Option<Rc<dyn DevToolsExtension>> {
    INSTALLED.with(|slot| slot.borrow_mut().take())
}

/// The installed extension, if any, in development mode only.
pub fn probe(config: &Config) -> Option<Rc<dyn DevToolsExtension>> {
    if !config.is_dev() {
        return None;
    }
    INSTALLED.with(|slot| slot.borrow().clone())
}
