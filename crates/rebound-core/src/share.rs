use std::cell::RefCell;
use std::rc::Rc;

use rxrust::observable::Observable;
use rxrust::observer::Observer;

use crate::stream::{Sink, Terminal};
use crate::subject::SubjectHub;
use crate::{Stream, Subscriber, Subscription};

struct Shared<T> {
    source: Stream<T>,
    /// Present while connected; a fresh hub is made for every connection.
    hub: Option<SubjectHub<T>>,
    refs: usize,
    latest: Option<T>,
    terminal: Option<Terminal>,
    upstream: Option<Subscription>,
}

type SharedRef<T> = Rc<RefCell<Shared<T>>>;

impl<T: Clone + 'static> Stream<T> {
    /// Shares one upstream subscription between all subscribers and replays
    /// the latest value to each newcomer.
    ///
    /// The first subscriber connects upstream. When the last one leaves, the
    /// upstream is torn down and the buffer cleared, so the next subscriber
    /// starts from scratch. Once upstream terminates it is released at once;
    /// late subscribers get the buffered value followed by the terminal
    /// notification.
    pub fn share_replay(&self) -> Stream<T> {
        let shared: SharedRef<T> = Rc::new(RefCell::new(Shared {
            source: self.clone(),
            hub: None,
            refs: 0,
            latest: None,
            terminal: None,
            upstream: None,
        }));
        Stream::new(move |sub| subscribe(&shared, sub))
    }
}

fn subscribe<T: Clone + 'static>(shared: &SharedRef<T>, sub: Subscriber<T>) -> Subscription {
    let (latest, terminal) = {
        let s = shared.borrow();
        (s.latest.clone(), s.terminal.clone())
    };
    if let Some(terminal) = terminal {
        if let Some(v) = latest {
            sub.next(v);
        }
        terminal.deliver(&sub);
        return Subscription::empty();
    }

    let (hub, fresh) = {
        let mut s = shared.borrow_mut();
        s.refs += 1;
        match &s.hub {
            Some(hub) => (hub.clone(), false),
            None => {
                let hub = SubjectHub::<T>::default();
                s.hub = Some(hub.clone());
                (hub, true)
            }
        }
    };
    let _ = hub.actual_subscribe(Sink(sub.clone()));
    if let Some(v) = latest {
        sub.next(v);
    }
    if fresh {
        connect(shared);
    }

    let shared = shared.clone();
    Subscription::new(move || {
        sub.close();
        release(&shared);
    })
}

fn connect<T: Clone + 'static>(shared: &SharedRef<T>) {
    let source = shared.borrow().source.clone();
    let (on_next, on_error, on_complete) = (shared.clone(), shared.clone(), shared.clone());
    let upstream = source.subscribe_with(Subscriber::new(
        move |v: &T| emit(&on_next, v),
        move |e| terminate(&on_error, Terminal::Error(e.clone())),
        move || terminate(&on_complete, Terminal::Complete),
    ));

    let orphaned = {
        let mut s = shared.borrow_mut();
        if s.terminal.is_some() {
            // terminated while connecting
            Some(upstream)
        } else if s.refs == 0 {
            // everyone left while the upstream was still connecting
            s.latest = None;
            s.hub = None;
            Some(upstream)
        } else {
            s.upstream = Some(upstream);
            None
        }
    };
    if let Some(upstream) = orphaned {
        upstream.unsubscribe();
    }
}

fn emit<T: Clone + 'static>(shared: &SharedRef<T>, value: &T) {
    let hub = {
        let mut s = shared.borrow_mut();
        s.latest = Some(value.clone());
        s.hub.clone()
    };
    if let Some(mut hub) = hub {
        hub.retain();
        hub.next(value.clone());
    }
}

fn terminate<T: Clone + 'static>(shared: &SharedRef<T>, terminal: Terminal) {
    let (hub, upstream) = {
        let mut s = shared.borrow_mut();
        if s.terminal.is_some() {
            return;
        }
        s.terminal = Some(terminal.clone());
        (s.hub.take(), s.upstream.take())
    };
    if let Some(upstream) = upstream {
        upstream.unsubscribe();
    }
    if let Some(hub) = hub {
        match terminal {
            Terminal::Complete => hub.complete(),
            Terminal::Error(e) => hub.error(e),
        }
    }
}

fn release<T: 'static>(shared: &SharedRef<T>) {
    let upstream = {
        let mut s = shared.borrow_mut();
        s.refs = s.refs.saturating_sub(1);
        if s.refs > 0 || s.terminal.is_some() {
            return;
        }
        s.latest = None;
        s.hub = None;
        s.upstream.take()
    };
    if let Some(upstream) = upstream {
        log::trace!("last subscriber left; disconnecting shared stream");
        upstream.unsubscribe();
    }
}
