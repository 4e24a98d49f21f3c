//! # Streams, Stores, and Components
//!
//! Rebound binds push streams to component rendering. This crate holds the
//! pieces everything else is built from:
//!
//! - `Stream<T>` / `Subject<T>`: push-based sequences and hand-fed sources,
//!   built on `rxrust` observables and subjects.
//! - `StoreBuilder` / `create_store`: reducer streams folded into shared,
//!   replay-one state.
//! - `Component` / `Root`: the lifecycle contract and a host that drives it.
//! - `View`: the element tree components render to.
//!
//! ## Stores
//!
//! ```rust
//! use rebound_core::*;
//!
//! let add = create_action::<Reducer<Vec<String>>>();
//! let todos = StoreBuilder::new("todos", add.as_stream())
//!     .keep_alive(true)
//!     .build();
//!
//! add.next(reducer(|items: &Vec<String>| {
//!     let mut items = items.clone();
//!     items.push("write docs".into());
//!     items
//! }));
//!
//! // late subscribers only see the most recent state
//! let latest = std::rc::Rc::new(std::cell::RefCell::new(None));
//! let sink = latest.clone();
//! todos.subscribe(move |items| *sink.borrow_mut() = Some(items.len()));
//! assert_eq!(*latest.borrow(), Some(1));
//! ```
//!
//! ## Mode
//!
//! [`Config`] carries the development flag. Store transition logging and the
//! debugging bridge only switch on in development mode; read the mode with
//! [`Config::from_env`] once, where the application starts, and pass it down.

pub mod action;
pub mod config;
pub mod effects;
pub mod error;
pub mod runtime;
pub mod share;
pub mod store;
pub mod stream;
pub mod subject;
pub mod view;

pub use action::*;
pub use config::*;
pub use effects::*;
pub use error::*;
pub use runtime::*;
pub use store::*;
pub use stream::*;
pub use subject::*;
pub use view::*;
