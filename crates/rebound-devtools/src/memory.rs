use std::cell::RefCell;
use std::rc::Rc;

use rebound_core::Dispose;
use slotmap::{SlotMap, new_key_type};

use crate::{ConnectConfig, DevToolsConnection, DevToolsExtension, Handler, Message};

new_key_type! {
    struct HandlerKey;
}

#[derive(Default)]
struct Inner {
    labels: Vec<Option<String>>,
    handlers: SlotMap<HandlerKey, Handler>,
    sent: Vec<(String, serde_json::Value)>,
    disconnects: usize,
}

/// An extension that lives in memory: records what it is sent and lets the
/// caller play the part of the extension's UI with [`MemoryExtension::dispatch`].
#[derive(Clone, Default)]
pub struct MemoryExtension {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `message` to every listening connection.
    pub fn dispatch(&self, message: &Message) {
        let handlers: Vec<Handler> = self.inner.borrow().handlers.values().cloned().collect();
        for h in handlers {
            h(message);
        }
    }

    /// Names passed to each `connect`, in order.
    pub fn labels(&self) -> Vec<Option<String>> {
        self.inner.borrow().labels.clone()
    }

    pub fn sent(&self) -> Vec<(String, serde_json::Value)> {
        self.inner.borrow().sent.clone()
    }

    pub fn listeners(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    pub fn disconnects(&self) -> usize {
        self.inner.borrow().disconnects
    }

    pub fn as_extension(&self) -> Rc<dyn DevToolsExtension> {
        Rc::new(self.clone())
    }
}

impl DevToolsExtension for MemoryExtension {
    fn connect(&self, config: ConnectConfig) -> Rc<dyn DevToolsConnection> {
        self.inner.borrow_mut().labels.push(config.name);
        Rc::new(MemoryConnection {
            inner: self.inner.clone(),
        })
    }

    fn disconnect(&self) {
        self.inner.borrow_mut().disconnects += 1;
    }
}

struct MemoryConnection {
    inner: Rc<RefCell<Inner>>,
}

impl DevToolsConnection for MemoryConnection {
    fn subscribe(&self, handler: Handler) -> Dispose {
        let key = self.inner.borrow_mut().handlers.insert(handler);
        let inner = self.inner.clone();
        Dispose::new(move || {
            inner.borrow_mut().handlers.remove(key);
        })
    }

    fn send(&self, label: &str, payload: serde_json::Value) {
        self.inner
            .borrow_mut()
            .sent
            .push((label.to_string(), payload));
    }
}
