//! Presenters and the stream injector.

pub mod inject;
pub mod presenter;
pub mod tests;

pub use inject::{Container, DevTools, Injector, Phase, PropsRule, Source, StoreValue, inject};
pub use presenter::{FnComponent, Presenter, Wrapper, component, display_name, present};
