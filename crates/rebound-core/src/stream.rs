//! # Streams
//!
//! A `Stream<T>` is a cold, push-based sequence backed by an `rxrust`
//! observable: every call to `subscribe` runs the pipeline again for that
//! subscriber. Delivery happens on the caller's thread; there is no
//! scheduler.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use rebound_core::Stream;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! Stream::of([1, 2, 3])
//!     .map(|v| v * 10)
//!     .subscribe(move |v| sink.borrow_mut().push(*v));
//! assert_eq!(*seen.borrow(), vec![10, 20, 30]);
//! ```
//!
//! Hot sources are built with [`Subject`](crate::Subject); sharing a single
//! upstream between subscribers is [`Stream::share_replay`].

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use rxrust::observable::{self, Observable, ObservableExt};
use rxrust::observer::{BoxObserver, Observer};
use rxrust::ops::box_it::{BoxIt, CloneableBoxOp};
use rxrust::subscription::Subscription as RxSubscription;

use crate::{Dispose, StreamError};

type Rx<T> = CloneableBoxOp<'static, T, StreamError>;

struct Callbacks<N, E, C> {
    next: N,
    error: E,
    complete: C,
}

impl<T, N, E, C> Observer<T, StreamError> for Callbacks<N, E, C>
where
    N: Fn(&T),
    E: Fn(&StreamError),
    C: Fn(),
{
    fn next(&mut self, value: T) {
        (self.next)(&value)
    }

    fn error(self, err: StreamError) {
        (self.error)(&err)
    }

    fn complete(self) {
        (self.complete)()
    }

    fn is_finished(&self) -> bool {
        false
    }
}

struct Slot<T> {
    observer: RefCell<Option<BoxObserver<'static, T, StreamError>>>,
    closed: Cell<bool>,
}

/// The receiving end of a subscription.
///
/// Once closed (by a terminal notification or by unsubscribing) it ignores
/// everything it is handed and lets go of its callbacks.
pub struct Subscriber<T>(Rc<Slot<T>>);

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> Subscriber<T> {
    pub fn new(
        next: impl Fn(&T) + 'static,
        error: impl Fn(&StreamError) + 'static,
        complete: impl Fn() + 'static,
    ) -> Self {
        Self::from_observer(Callbacks {
            next,
            error,
            complete,
        })
    }

    fn from_observer(observer: impl Observer<T, StreamError> + 'static) -> Self {
        Self(Rc::new(Slot {
            observer: RefCell::new(Some(BoxObserver::new(observer))),
            closed: Cell::new(false),
        }))
    }

    pub fn next(&self, value: T) {
        if self.0.closed.get() {
            return;
        }
        // taken out for the call so the callback may close this subscriber
        let taken = self.0.observer.borrow_mut().take();
        if let Some(mut observer) = taken {
            observer.next(value);
            if !self.0.closed.get() {
                *self.0.observer.borrow_mut() = Some(observer);
            }
        }
    }

    pub fn error(&self, err: &StreamError) {
        if self.0.closed.replace(true) {
            return;
        }
        let taken = self.0.observer.borrow_mut().take();
        if let Some(observer) = taken {
            observer.error(err.clone());
        }
    }

    pub fn complete(&self) {
        if self.0.closed.replace(true) {
            return;
        }
        let taken = self.0.observer.borrow_mut().take();
        if let Some(observer) = taken {
            observer.complete();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.0.closed.get()
    }

    pub fn close(&self) {
        self.0.closed.set(true);
        let released = self.0.observer.borrow_mut().take();
        drop(released);
    }
}

/// Hands an rx pipeline's notifications to a [`Subscriber`].
pub(crate) struct Sink<T>(pub(crate) Subscriber<T>);

impl<T: 'static> Observer<T, StreamError> for Sink<T> {
    fn next(&mut self, value: T) {
        self.0.next(value)
    }

    fn error(self, err: StreamError) {
        self.0.error(&err)
    }

    fn complete(self) {
        self.0.complete()
    }

    fn is_finished(&self) -> bool {
        self.0.is_closed()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone, Debug)]
pub struct Subscription(Dispose);

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self(Dispose::new(teardown))
    }

    /// A subscription with nothing left to tear down.
    pub fn empty() -> Self {
        Self(Dispose::done())
    }

    /// Runs the teardown at most once.
    pub fn unsubscribe(&self) {
        self.0.run()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_done()
    }
}

/// A [`Subscription`] as rx sees it.
struct Teardown(Subscription);

impl RxSubscription for Teardown {
    fn unsubscribe(self) {
        self.0.unsubscribe()
    }

    fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// Terminal notification remembered by hot and shared streams.
#[derive(Clone, Debug)]
pub(crate) enum Terminal {
    Complete,
    Error(StreamError),
}

impl Terminal {
    pub(crate) fn deliver<T: 'static>(&self, sub: &Subscriber<T>) {
        match self {
            Terminal::Complete => sub.complete(),
            Terminal::Error(e) => sub.error(e),
        }
    }
}

type Produce<T> = Rc<dyn Fn(Subscriber<T>) -> Subscription>;

/// A hand-written source, run once per subscriber.
struct Producer<T>(Produce<T>);

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T, O> Observable<T, StreamError, O> for Producer<T>
where
    T: 'static,
    O: Observer<T, StreamError> + 'static,
{
    type Unsub = Teardown;

    fn actual_subscribe(self, observer: O) -> Teardown {
        let sub = Subscriber::from_observer(observer);
        let upstream = (self.0)(sub.clone());
        Teardown(Subscription::new(move || {
            sub.close();
            upstream.unsubscribe();
        }))
    }
}

fn never_fails(e: Infallible) -> StreamError {
    match e {}
}

/// One input of [`Stream::merge`].
struct MergeInput<T> {
    down: Subscriber<T>,
    remaining: Rc<Cell<usize>>,
    siblings: Subscription,
}

impl<T: 'static> Observer<T, StreamError> for MergeInput<T> {
    fn next(&mut self, value: T) {
        self.down.next(value)
    }

    fn error(self, err: StreamError) {
        self.siblings.unsubscribe();
        self.down.error(&err)
    }

    fn complete(self) {
        self.remaining.set(self.remaining.get() - 1);
        if self.remaining.get() == 0 {
            self.down.complete();
        }
    }

    fn is_finished(&self) -> bool {
        self.down.is_closed()
    }
}

pub struct Stream<T> {
    rx: Rx<T>,
}

impl<T: 'static> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T: 'static> Stream<T> {
    fn from_rx(rx: Rx<T>) -> Self {
        Self { rx }
    }

    /// Builds a stream from a producer that is run once per subscriber.
    pub fn new(producer: impl Fn(Subscriber<T>) -> Subscription + 'static) -> Self {
        let produce: Produce<T> = Rc::new(producer);
        Self::from_rx(Producer(produce).box_it())
    }

    pub fn empty() -> Self {
        Self::new(|sub| {
            sub.complete();
            Subscription::empty()
        })
    }

    /// Never emits and never terminates.
    pub fn never() -> Self {
        Self::new(|_| Subscription::empty())
    }

    /// Fails immediately with `err`.
    pub fn fail(err: StreamError) -> Self {
        Self::new(move |sub| {
            sub.error(&err);
            Subscription::empty()
        })
    }

    /// Subscribes with a value callback only. Errors are logged.
    pub fn subscribe(&self, next: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_with(Subscriber::new(
            next,
            |e| log::error!("unhandled stream error: {e}"),
            || {},
        ))
    }

    pub fn subscribe_with(&self, subscriber: Subscriber<T>) -> Subscription {
        let upstream = self.rx.clone().actual_subscribe(Sink(subscriber.clone()));
        Subscription::new(move || {
            subscriber.close();
            upstream.unsubscribe();
        })
    }

    /// Interleaves the values of every stream. Completes once all of them
    /// have completed. The first error releases every other input before it
    /// is passed on.
    pub fn merge(streams: impl IntoIterator<Item = Stream<T>>) -> Stream<T> {
        let streams: Rc<[Stream<T>]> = streams.into_iter().collect();
        Stream::new(move |sub: Subscriber<T>| {
            if streams.is_empty() {
                sub.complete();
                return Subscription::empty();
            }
            let inner: Rc<RefCell<Vec<Subscription>>> = Rc::default();
            let siblings = {
                let inner = inner.clone();
                Subscription::new(move || {
                    let subs = std::mem::take(&mut *inner.borrow_mut());
                    for s in subs {
                        s.unsubscribe();
                    }
                })
            };
            let remaining = Rc::new(Cell::new(streams.len()));
            for stream in streams.iter() {
                if sub.is_closed() {
                    break;
                }
                let input = stream.subscribe_with(Subscriber::from_observer(MergeInput {
                    down: sub.clone(),
                    remaining: remaining.clone(),
                    siblings: siblings.clone(),
                }));
                if siblings.is_closed() {
                    // a sibling failed while this input was subscribing
                    input.unsubscribe();
                } else {
                    inner.borrow_mut().push(input);
                }
            }
            siblings
        })
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Emits every value synchronously, then completes.
    pub fn of(values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        Self::from_rx(
            observable::from_iter(values)
                .on_error_map(never_fails)
                .box_it(),
        )
    }

    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Stream<U> {
        let f = Rc::new(f);
        Stream::from_rx(self.rx.clone().map(move |v: T| f(&v)).box_it())
    }

    /// Runs `f` for every value before passing it on unchanged.
    pub fn tap(&self, f: impl Fn(&T) + 'static) -> Stream<T> {
        let f = Rc::new(f);
        Stream::from_rx(self.rx.clone().tap(move |v: &T| f(v)).box_it())
    }

    /// Left fold emitting every intermediate accumulator. Each subscriber
    /// folds from its own copy of `seed`.
    pub fn scan<A>(&self, seed: A, f: impl Fn(&A, &T) -> A + 'static) -> Stream<A>
    where
        A: Clone + 'static,
    {
        let f = Rc::new(f);
        Stream::from_rx(
            self.rx
                .clone()
                .scan_initial(seed, move |acc: A, v: T| f(&acc, &v))
                .box_it(),
        )
    }

    /// Emits `first` before anything from this stream.
    pub fn start_with(&self, first: T) -> Stream<T> {
        Stream::from_rx(self.rx.clone().start_with(vec![first]).box_it())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone + 'static>(stream: &Stream<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = stream.subscribe(move |v: &T| sink.borrow_mut().push(v.clone()));
        (seen, sub)
    }

    #[test]
    fn of_emits_in_order_then_completes() {
        let done = Rc::new(Cell::new(false));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (d, s) = (done.clone(), seen.clone());
        let sub = Stream::of([1, 2, 3]).subscribe_with(Subscriber::new(
            move |v: &i32| s.borrow_mut().push(*v),
            |_| panic!("no error expected"),
            move || d.set(true),
        ));
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert!(done.get());
        sub.unsubscribe();
        assert!(sub.is_closed());
    }

    #[test]
    fn scan_folds_from_seed_per_subscriber() {
        let sums = Stream::of([1, 2, 3]).scan(10, |acc: &i32, v: &i32| acc + v);
        let (a, _) = collect(&sums);
        let (b, _) = collect(&sums);
        assert_eq!(*a.borrow(), vec![11, 13, 16]);
        assert_eq!(*b.borrow(), vec![11, 13, 16]);
    }

    #[test]
    fn start_with_prepends() {
        let (seen, _) = collect(&Stream::of([2, 3]).start_with(1));
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn tap_sees_values_without_changing_them() {
        let tapped = Rc::new(RefCell::new(Vec::new()));
        let t = tapped.clone();
        let (seen, _) =
            collect(&Stream::of(["a", "b"]).tap(move |v: &&str| t.borrow_mut().push(*v)));
        assert_eq!(*tapped.borrow(), vec!["a", "b"]);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn errors_reach_the_error_callback_once() {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = errors.clone();
        Stream::<i32>::fail(StreamError::new("boom"))
            .map(|v: &i32| v + 1)
            .subscribe_with(Subscriber::new(
                |_| {},
                move |err: &StreamError| e.borrow_mut().push(err.message().to_string()),
                || panic!("should not complete"),
            ));
        assert_eq!(*errors.borrow(), vec!["boom".to_string()]);
    }

    #[test]
    fn merge_completes_after_all_inputs() {
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        Stream::merge([Stream::of([1, 2]), Stream::of([3])]).subscribe_with(Subscriber::new(
            move |v: &i32| s.borrow_mut().push(*v),
            |_| {},
            move || d.set(true),
        ));
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert!(done.get());
    }

    #[test]
    fn merge_releases_earlier_inputs_when_a_later_one_fails() {
        let released = Rc::new(Cell::new(0));
        let r = released.clone();
        let held = Stream::<i32>::new(move |_| {
            let r = r.clone();
            Subscription::new(move || r.set(r.get() + 1))
        });
        let failed = Rc::new(Cell::new(false));
        let f = failed.clone();
        let sub = Stream::merge([held, Stream::fail(StreamError::new("late"))]).subscribe_with(
            Subscriber::new(|_| {}, move |_| f.set(true), || {}),
        );
        assert!(failed.get());
        assert_eq!(released.get(), 1);
        sub.unsubscribe();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn closing_a_subscriber_stops_synchronous_delivery() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let holder: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
        let h = holder.clone();
        let sub = Subscriber::new(
            move |v: &i32| {
                s.borrow_mut().push(*v);
                if *v == 2
                    && let Some(me) = h.borrow().as_ref()
                {
                    me.close();
                }
            },
            |_| {},
            || {},
        );
        *holder.borrow_mut() = Some(sub.clone());
        Stream::of([1, 2, 3, 4]).subscribe_with(sub);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
