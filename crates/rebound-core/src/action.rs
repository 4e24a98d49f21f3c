use std::collections::HashMap;

use crate::Subject;

/// A subject to push reducers (or any payload) into a store.
pub fn create_action<T: Clone + 'static>() -> Subject<T> {
    Subject::new()
}

/// One named action subject per name. Duplicate names collapse into one.
pub fn create_actions<T: Clone + 'static>(
    names: impl IntoIterator<Item = impl Into<String>>,
) -> HashMap<String, Subject<T>> {
    names
        .into_iter()
        .map(|name| (name.into(), Subject::new()))
        .collect()
}
