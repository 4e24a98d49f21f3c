//! # Injecting streams into components
//!
//! [`inject`] binds a source of values to a presenter. The resulting
//! [`Container`] subscribes when mounted, re-renders the presenter with
//! properties derived from the latest value, and unsubscribes when unmounted.
//!
//! ```rust
//! use rebound_core::*;
//! use rebound_ui::*;
//!
//! fn number(props: &i32) -> View {
//!     View::new("span").attr("number", props)
//! }
//!
//! let counter = inject(Stream::of([0, 1, 2]), PropsRule::derive(|v: &i32, _: &()| *v))
//!     .wrap(component(number));
//! let root = Root::mount(counter, ());
//! assert_eq!(root.output().unwrap().get("number"), Some("2"));
//! root.unmount();
//! ```
//!
//! The source is resolved once per mount. A [`Source::Deferred`] factory sees
//! the external properties given at mount time; later property changes reach
//! the mapping rule but never re-resolve the source.

use std::cell::RefCell;
use std::rc::Rc;

use rebound_core::{
    Component, Config, Error, Invalidate, Result, Stream, StreamError, Subscriber, Subscription,
    View,
};
use rebound_devtools::{BridgeError, DevToolsExtension, Session, probe};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::presenter::{Presenter, display_name};

/// Values a container can hold: cloned into the render state, sent to the
/// debugging extension and decoded back from it.
pub trait StoreValue: Clone + Serialize + DeserializeOwned + 'static {}

impl<T> StoreValue for T where T: Clone + Serialize + DeserializeOwned + 'static {}

type Factory<S, U> = Rc<dyn Fn(&U) -> Result<Stream<S>>>;

/// Where a container's values come from.
pub enum Source<S, U> {
    Direct(Stream<S>),
    /// Built from the external properties when the container mounts.
    Deferred(Factory<S, U>),
}

impl<S: 'static, U> Clone for Source<S, U> {
    fn clone(&self) -> Self {
        match self {
            Source::Direct(s) => Source::Direct(s.clone()),
            Source::Deferred(f) => Source::Deferred(f.clone()),
        }
    }
}

impl<S: 'static, U: 'static> Source<S, U> {
    pub fn deferred(f: impl Fn(&U) -> Stream<S> + 'static) -> Self {
        Source::Deferred(Rc::new(move |props: &U| Ok(f(props))))
    }

    pub fn try_deferred(f: impl Fn(&U) -> Result<Stream<S>> + 'static) -> Self {
        Source::Deferred(Rc::new(f))
    }

    pub fn resolve(&self, props: &U) -> Result<Stream<S>> {
        match self {
            Source::Direct(stream) => Ok(stream.clone()),
            Source::Deferred(factory) => factory(props),
        }
    }
}

impl<S: 'static, U> From<Stream<S>> for Source<S, U> {
    fn from(stream: Stream<S>) -> Self {
        Source::Direct(stream)
    }
}

type Derive<S, U, P> = Rc<dyn Fn(&S, &U) -> P>;

/// How the presenter's properties are computed.
pub enum PropsRule<S, U, P> {
    /// Same properties whatever the source emits.
    Static(Rc<P>),
    /// Computed from the latest value and the current external properties.
    Derive(Derive<S, U, P>),
}

impl<S, U, P> Clone for PropsRule<S, U, P> {
    fn clone(&self) -> Self {
        match self {
            PropsRule::Static(p) => PropsRule::Static(p.clone()),
            PropsRule::Derive(f) => PropsRule::Derive(f.clone()),
        }
    }
}

impl<S: 'static, U: 'static, P: 'static> PropsRule<S, U, P> {
    pub fn fixed(props: P) -> Self {
        PropsRule::Static(Rc::new(props))
    }

    pub fn derive(f: impl Fn(&S, &U) -> P + 'static) -> Self {
        PropsRule::Derive(Rc::new(f))
    }

    fn render_with<C: Presenter<P>>(&self, presenter: &C, value: &S, props: &U) -> View {
        match self {
            PropsRule::Static(p) => presenter.present(p),
            PropsRule::Derive(f) => presenter.present(&f(value, props)),
        }
    }
}

/// Which debugging extension a container talks to.
#[derive(Clone, Default)]
pub enum DevTools {
    /// Whatever [`probe`] finds (development mode only).
    #[default]
    Probe,
    Use(Rc<dyn DevToolsExtension>),
    Off,
}

impl DevTools {
    fn resolve(&self, config: &Config) -> Option<Rc<dyn DevToolsExtension>> {
        match self {
            DevTools::Probe => probe(config),
            DevTools::Use(ext) => Some(ext.clone()),
            DevTools::Off => None,
        }
    }
}

/// Factory for containers sharing one source and mapping rule.
pub struct Injector<S, U, P> {
    source: Source<S, U>,
    rule: PropsRule<S, U, P>,
    devtools: DevTools,
    config: Config,
}

impl<S: 'static, U, P> Clone for Injector<S, U, P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            rule: self.rule.clone(),
            devtools: self.devtools.clone(),
            config: self.config,
        }
    }
}

pub fn inject<S, U, P>(
    source: impl Into<Source<S, U>>,
    rule: PropsRule<S, U, P>,
) -> Injector<S, U, P>
where
    S: StoreValue,
{
    Injector {
        source: source.into(),
        rule,
        devtools: DevTools::default(),
        config: Config::default(),
    }
}

impl<S, U, P> Injector<S, U, P>
where
    S: StoreValue,
    U: 'static,
    P: 'static,
{
    /// Talk to `extension` instead of probing for one.
    pub fn devtools(mut self, extension: Rc<dyn DevToolsExtension>) -> Self {
        self.devtools = DevTools::Use(extension);
        self
    }

    pub fn without_devtools(mut self) -> Self {
        self.devtools = DevTools::Off;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn wrap<C: Presenter<P>>(&self, presenter: C) -> Container<C, S, U, P> {
        let label = format!("{}Container", display_name(&presenter));
        Container {
            presenter,
            injector: self.clone(),
            label,
            slot: Rc::new(RefCell::new(Slot {
                latest: None,
                fault: None,
            })),
            resources: None,
            finished: false,
        }
    }
}

/// Where a container is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    /// Mounted, nothing received yet.
    Awaiting,
    Rendering,
    Finished,
}

struct Slot<S> {
    latest: Option<S>,
    fault: Option<Error>,
}

/// What a mounted container holds on to.
#[derive(Default)]
struct Resources {
    subscription: Option<Subscription>,
    session: Option<Session>,
}

pub struct Container<C, S, U, P> {
    presenter: C,
    injector: Injector<S, U, P>,
    label: String,
    slot: Rc<RefCell<Slot<S>>>,
    resources: Option<Resources>,
    finished: bool,
}

impl<C, S, U, P> Container<C, S, U, P>
where
    S: StoreValue,
{
    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.resources.is_none() {
            Phase::Unmounted
        } else if self.slot.borrow().latest.is_none() {
            Phase::Awaiting
        } else {
            Phase::Rendering
        }
    }

    /// Label used for the debugging session.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn latest(&self) -> Option<S> {
        self.slot.borrow().latest.clone()
    }

    fn open_session(
        &self,
        extension: Rc<dyn DevToolsExtension>,
        invalidate: &Invalidate,
    ) -> Session {
        let slot = self.slot.clone();
        let invalidate = invalidate.clone();
        let label = self.label.clone();
        Session::open_replay(extension, &self.label, move |replayed: Result<S, BridgeError>| {
            match replayed {
                Ok(state) => {
                    log::debug!("{label}: replaying state from devtools");
                    slot.borrow_mut().latest = Some(state);
                }
                Err(e) => slot.borrow_mut().fault = Some(Error::Replay(e.to_string())),
            }
            invalidate.request();
        })
    }

    fn subscriber(&self, session: Option<&Session>, invalidate: &Invalidate) -> Subscriber<S> {
        let sender = session.map(Session::sender);
        let (on_next, on_error) = (self.slot.clone(), self.slot.clone());
        let (next_invalidate, error_invalidate) = (invalidate.clone(), invalidate.clone());
        let label = self.label.clone();
        Subscriber::new(
            move |value: &S| {
                if let Some(sender) = &sender
                    && let Err(e) = sender.send_update(value)
                {
                    log::warn!("{label}: could not send update to devtools: {e}");
                }
                on_next.borrow_mut().latest = Some(value.clone());
                next_invalidate.request();
            },
            move |e: &StreamError| {
                on_error.borrow_mut().fault = Some(Error::Stream(e.clone()));
                error_invalidate.request();
            },
            || {},
        )
    }
}

impl<C, S, U, P> Component for Container<C, S, U, P>
where
    C: Presenter<P>,
    S: StoreValue,
    U: 'static,
    P: 'static,
{
    type Props = U;

    fn display_name(&self) -> String {
        self.label.clone()
    }

    fn mount(&mut self, props: &U, invalidate: &Invalidate) -> Result<()> {
        let mut resources = Resources::default();
        if let Some(extension) = self.injector.devtools.resolve(&self.injector.config) {
            resources.session = Some(self.open_session(extension, invalidate));
        }
        let subscriber = self.subscriber(resources.session.as_ref(), invalidate);
        // held from here on so unmount can release the session even if
        // resolving the source fails
        self.resources = Some(resources);

        let stream = self.injector.source.resolve(props)?;
        let subscription = stream.subscribe_with(subscriber);
        if let Some(resources) = self.resources.as_mut() {
            resources.subscription = Some(subscription);
        }
        log::trace!("{} subscribed", self.label);
        Ok(())
    }

    fn update(&mut self, _props: &U) {
        log::trace!("{}: props changed, source stays bound", self.label);
    }

    fn render(&self, props: &U) -> Result<Option<View>> {
        let slot = self.slot.borrow();
        if let Some(fault) = &slot.fault {
            return Err(fault.clone());
        }
        let Some(value) = slot.latest.as_ref() else {
            return Ok(None);
        };
        Ok(Some(
            self.injector.rule.render_with(&self.presenter, value, props),
        ))
    }

    fn unmount(&mut self) {
        let Some(resources) = self.resources.take() else {
            return;
        };
        if let Some(subscription) = resources.subscription {
            subscription.unsubscribe();
        }
        if let Some(session) = resources.session {
            session.close();
        }
        self.finished = true;
        log::trace!("{} released", self.label);
    }
}
