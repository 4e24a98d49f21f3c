use std::borrow::Cow;
use std::marker::PhantomData;

use rebound_core::{Component, Result, View};

/// A stateless component: properties in, view out.
pub trait Presenter<P>: 'static {
    fn present(&self, props: &P) -> View;

    /// Explicit display name, if one was given.
    fn display_name(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Type name used when there is no explicit display name.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Display name of `presenter`: the explicit one, else its type or function
/// name, else `"Unknown"`.
pub fn display_name<P>(presenter: &impl Presenter<P>) -> String {
    if let Some(name) = presenter.display_name() {
        return name.into_owned();
    }
    short_name(presenter.type_name())
        .unwrap_or("Unknown")
        .to_string()
}

/// Last path segment of a type name, without generics. Closures and fn
/// pointers have no name.
fn short_name(type_name: &str) -> Option<&str> {
    let fn_pointer = ["fn(", "unsafe fn(", "extern "]
        .iter()
        .any(|prefix| type_name.starts_with(prefix));
    if fn_pointer || type_name.contains("{{closure}}") {
        return None;
    }
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().filter(|s| !s.is_empty())
}

/// A presenter made from a function.
pub struct FnComponent<P, F> {
    name: Option<String>,
    render: F,
    _props: PhantomData<fn(&P)>,
}

/// Wraps `render` as a presenter. A named `fn` keeps its name as the display
/// name; closures need [`FnComponent::named`].
pub fn component<P, F>(render: F) -> FnComponent<P, F>
where
    F: Fn(&P) -> View + 'static,
{
    FnComponent {
        name: None,
        render,
        _props: PhantomData,
    }
}

impl<P, F> FnComponent<P, F> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<P: 'static, F> Presenter<P> for FnComponent<P, F>
where
    F: Fn(&P) -> View + 'static,
{
    fn present(&self, props: &P) -> View {
        (self.render)(props)
    }

    fn display_name(&self) -> Option<Cow<'_, str>> {
        self.name.as_deref().map(Cow::Borrowed)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// Renders `presenter` with `props` directly.
pub fn present<P>(presenter: &impl Presenter<P>, props: &P) -> View {
    presenter.present(props)
}

/// Mounts a presenter as a host component, named `"<name>Wrapper"`.
pub struct Wrapper<C, P> {
    presenter: C,
    name: String,
    _props: PhantomData<fn(&P)>,
}

impl<C, P> Wrapper<C, P>
where
    C: Presenter<P>,
    P: 'static,
{
    pub fn new(presenter: C) -> Self {
        let name = format!("{}Wrapper", display_name(&presenter));
        Self {
            presenter,
            name,
            _props: PhantomData,
        }
    }
}

impl<C, P> Component for Wrapper<C, P>
where
    C: Presenter<P>,
    P: 'static,
{
    type Props = P;

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn render(&self, props: &P) -> Result<Option<View>> {
        Ok(Some(self.presenter.present(props)))
    }
}
