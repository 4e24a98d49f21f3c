//! # Stores
//!
//! A store is the running left fold of a stream of reducers, shared between
//! all of its subscribers:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use rebound_core::*;
//!
//! let actions = create_action::<Reducer<i32>>();
//! let store = StoreBuilder::new("counter", actions.as_stream())
//!     .initial(1)
//!     .build();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let sub = store.subscribe(move |v| sink.borrow_mut().push(*v));
//! actions.next(reducer(|n: &i32| n + 1));
//! actions.next(reducer(|n: &i32| n * 10));
//! assert_eq!(*seen.borrow(), vec![1, 2, 20]);
//! sub.unsubscribe();
//! ```

use std::fmt::Debug;
use std::rc::Rc;

use crate::{Config, Stream};

/// A state transition.
pub type Reducer<T> = Rc<dyn Fn(&T) -> T>;

pub fn reducer<T>(f: impl Fn(&T) -> T + 'static) -> Reducer<T> {
    Rc::new(f)
}

/// Builder state before an initial value is chosen.
pub struct NoInitial;

/// Builder state holding the store's first value.
pub struct Initial<T>(T);

pub struct StoreBuilder<T, I = NoInitial> {
    name: String,
    reducers: Stream<Reducer<T>>,
    initial: I,
    keep_alive: bool,
    config: Config,
}

impl<T> StoreBuilder<T>
where
    T: Clone + Debug + 'static,
{
    pub fn new(name: impl Into<String>, reducers: Stream<Reducer<T>>) -> Self {
        Self {
            name: name.into(),
            reducers,
            initial: NoInitial,
            keep_alive: false,
            config: Config::default(),
        }
    }

    /// First value of the store.
    pub fn initial(self, state: T) -> StoreBuilder<T, Initial<T>> {
        StoreBuilder {
            name: self.name,
            reducers: self.reducers,
            initial: Initial(state),
            keep_alive: self.keep_alive,
            config: self.config,
        }
    }

    /// Builds a store starting from `T::default()`.
    pub fn build(self) -> Stream<T>
    where
        T: Default,
    {
        self.initial(T::default()).build()
    }
}

impl<T, I> StoreBuilder<T, I>
where
    T: Clone + Debug + 'static,
{
    /// Keep the store connected even while nobody subscribes.
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl<T> StoreBuilder<T, Initial<T>>
where
    T: Clone + Debug + 'static,
{
    pub fn build(self) -> Stream<T> {
        let StoreBuilder {
            name,
            reducers,
            initial: Initial(initial),
            keep_alive,
            config,
        } = self;

        let mut states = reducers
            .scan(initial.clone(), |state: &T, reducer: &Reducer<T>| reducer(state))
            .start_with(initial);
        if config.is_dev() {
            let name = name.clone();
            states = states.tap(move |state: &T| {
                log::info!(target: "rebound::store", "{name} {state:?}");
            });
        }
        let store = states.share_replay();

        if keep_alive {
            log::debug!("store {name} kept alive");
            // never unsubscribed
            let _ = store.subscribe(|_| {});
        }
        store
    }
}

/// Shorthand for [`StoreBuilder`]. Without `initial` the store starts from
/// `T::default()`.
pub fn create_store<T>(
    name: impl Into<String>,
    reducers: Stream<Reducer<T>>,
    initial: Option<T>,
    keep_alive: bool,
    config: &Config,
) -> Stream<T>
where
    T: Clone + Debug + Default + 'static,
{
    let builder = StoreBuilder::new(name, reducers)
        .keep_alive(keep_alive)
        .config(*config);
    match initial {
        Some(initial) => builder.initial(initial).build(),
        None => builder.build(),
    }
}
