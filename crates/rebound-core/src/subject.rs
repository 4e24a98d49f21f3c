use std::cell::RefCell;
use std::rc::Rc;

use rxrust::observable::Observable;
use rxrust::observer::Observer;
use rxrust::subject::Subject as Hub;

use crate::stream::{Sink, Terminal};
use crate::{Stream, StreamError, Subscription};

/// Hub shared by hot streams; closed subscribers are pruned before each
/// emission.
pub(crate) type SubjectHub<T> = Hub<'static, T, StreamError>;

#[derive(Default)]
struct State {
    live: usize,
    terminal: Option<Terminal>,
}

/// A hot stream fed by hand.
///
/// Values pushed with [`Subject::next`] reach whoever is subscribed at that
/// moment; nothing is buffered for later subscribers. A subscriber that
/// arrives after [`Subject::error`] or [`Subject::complete`] is handed the
/// terminal notification straight away.
pub struct Subject<T> {
    hub: SubjectHub<T>,
    state: Rc<RefCell<State>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            hub: Hub::default(),
            state: Rc::default(),
        }
    }

    pub fn next(&self, value: T) {
        if self.state.borrow().terminal.is_some() {
            return;
        }
        let mut hub = self.hub.clone();
        hub.retain();
        hub.next(value);
    }

    pub fn error(&self, err: StreamError) {
        if self.terminate(Terminal::Error(err.clone())) {
            self.hub.clone().error(err);
        }
    }

    pub fn complete(&self) {
        if self.terminate(Terminal::Complete) {
            self.hub.clone().complete();
        }
    }

    fn terminate(&self, terminal: Terminal) -> bool {
        let mut state = self.state.borrow_mut();
        if state.terminal.is_some() {
            return false;
        }
        state.terminal = Some(terminal);
        state.live = 0;
        true
    }

    /// Subscribers that are still listening.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().live
    }

    pub fn as_stream(&self) -> Stream<T> {
        let hub = self.hub.clone();
        let state = self.state.clone();
        Stream::new(move |sub| {
            let terminal = state.borrow().terminal.clone();
            if let Some(terminal) = terminal {
                terminal.deliver(&sub);
                return Subscription::empty();
            }
            state.borrow_mut().live += 1;
            let _ = hub.clone().actual_subscribe(Sink(sub.clone()));
            let state = state.clone();
            Subscription::new(move || {
                // the closed sink is dropped by the hub's next prune
                sub.close();
                let mut state = state.borrow_mut();
                state.live = state.live.saturating_sub(1);
            })
        })
    }
}

impl<T: Clone + 'static> From<&Subject<T>> for Stream<T> {
    fn from(subject: &Subject<T>) -> Self {
        subject.as_stream()
    }
}
