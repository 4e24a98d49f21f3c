//! # Hosting components
//!
//! [`Root`] owns one mounted [`Component`], the external properties it was
//! given and the last [`View`] it rendered. Components ask for a re-render
//! through the [`Invalidate`] handle they receive on mount.
//!
//! Requests raised while the host is already inside one of the component's
//! lifecycle calls (typically a stream emitting synchronously during `mount`)
//! are deferred and flushed as a single render once that call returns. All
//! other requests render immediately, in the order they arrive.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{Result, View};

/// A unit of UI with a mount/update/unmount lifecycle.
pub trait Component: 'static {
    type Props: 'static;

    fn display_name(&self) -> String;

    fn mount(&mut self, _props: &Self::Props, _invalidate: &Invalidate) -> Result<()> {
        Ok(())
    }

    /// External properties changed. A render follows.
    fn update(&mut self, _props: &Self::Props) {}

    /// `Ok(None)` renders nothing.
    fn render(&self, props: &Self::Props) -> Result<Option<View>>;

    fn unmount(&mut self) {}
}

/// Re-render request handle. Does nothing once the host is gone or unmounted.
#[derive(Clone)]
pub struct Invalidate(Rc<dyn Fn()>);

impl Invalidate {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn request(&self) {
        (self.0)()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Mounted,
    Unmounted,
}

struct RootInner<C: Component> {
    name: String,
    component: RefCell<C>,
    props: RefCell<C::Props>,
    output: RefCell<Option<View>>,
    fault: RefCell<Option<crate::Error>>,
    lifecycle: Cell<Lifecycle>,
    busy: Cell<bool>,
    dirty: Cell<bool>,
    frames: Cell<u64>,
}

impl<C: Component> RootInner<C> {
    fn invalidate(&self) {
        if self.lifecycle.get() == Lifecycle::Unmounted {
            return;
        }
        self.dirty.set(true);
        if !self.busy.get() {
            self.flush();
        }
    }

    fn flush(&self) {
        while self.dirty.replace(false) {
            if self.fault.borrow().is_some() {
                return;
            }
            self.busy.set(true);
            let result = self.component.borrow().render(&self.props.borrow());
            self.busy.set(false);
            self.frames.set(self.frames.get() + 1);
            match result {
                Ok(view) => *self.output.borrow_mut() = view,
                Err(e) => self.record_fault(e),
            }
        }
    }

    fn record_fault(&self, e: crate::Error) {
        log::warn!("{} stopped rendering: {e}", self.name);
        *self.output.borrow_mut() = None;
        *self.fault.borrow_mut() = Some(e);
    }
}

/// A mounted component tree of one.
pub struct Root<C: Component> {
    inner: Rc<RootInner<C>>,
}

impl<C: Component> Root<C> {
    /// Mounts `component` with `props` and renders it once.
    ///
    /// A failing `mount` is recorded as the root's fault rather than
    /// returned, so the component can still be unmounted.
    pub fn mount(component: C, props: C::Props) -> Self {
        let name = component.display_name();
        let inner = Rc::new(RootInner {
            name,
            component: RefCell::new(component),
            props: RefCell::new(props),
            output: RefCell::new(None),
            fault: RefCell::new(None),
            lifecycle: Cell::new(Lifecycle::Mounted),
            busy: Cell::new(true),
            dirty: Cell::new(true),
            frames: Cell::new(0),
        });
        let weak = Rc::downgrade(&inner);
        let invalidate = Invalidate::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.invalidate();
            }
        });

        log::debug!("mounting {}", inner.name);
        let mounted = inner
            .component
            .borrow_mut()
            .mount(&inner.props.borrow(), &invalidate);
        inner.busy.set(false);
        match mounted {
            Ok(()) => inner.flush(),
            Err(e) => inner.record_fault(e),
        }
        Root { inner }
    }

    /// Replaces the external properties and re-renders.
    pub fn set_props(&self, props: C::Props) {
        let inner = &self.inner;
        if inner.lifecycle.get() == Lifecycle::Unmounted {
            return;
        }
        *inner.props.borrow_mut() = props;
        inner.busy.set(true);
        inner.component.borrow_mut().update(&inner.props.borrow());
        inner.busy.set(false);
        inner.dirty.set(true);
        inner.flush();
    }

    /// Tears the component down. Later calls do nothing.
    pub fn unmount(&self) {
        let inner = &self.inner;
        if inner.lifecycle.replace(Lifecycle::Unmounted) == Lifecycle::Unmounted {
            return;
        }
        log::debug!("unmounting {}", inner.name);
        inner.busy.set(true);
        inner.component.borrow_mut().unmount();
        inner.busy.set(false);
        *inner.output.borrow_mut() = None;
    }

    pub fn output(&self) -> Option<View> {
        self.inner.output.borrow().clone()
    }

    pub fn fault(&self) -> Option<crate::Error> {
        self.inner.fault.borrow().clone()
    }

    /// Number of renders performed so far.
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Mounted
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn with_component<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.inner.component.borrow())
    }
}
