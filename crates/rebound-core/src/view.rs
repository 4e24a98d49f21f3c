use std::fmt::Display;

use smallvec::SmallVec;

/// Rendered element tree: a name, string attributes and children.
///
/// Text nodes carry their content in `text` and have no children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct View {
    pub name: String,
    pub attrs: SmallVec<[(String, String); 4]>,
    pub text: Option<String>,
    pub children: Vec<View>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn text(content: impl Display) -> Self {
        Self {
            name: "#text".into(),
            text: Some(content.to_string()),
            ..Default::default()
        }
    }

    /// Sets an attribute, replacing any previous value for `key`.
    pub fn attr(mut self, key: impl Into<String>, value: impl Display) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
        self
    }

    pub fn child(mut self, child: View) -> Self {
        self.children.push(child);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(t) = &self.text {
            out.push_str(t);
        }
        for c in &self.children {
            c.collect_text(out);
        }
    }

    /// Depth-first search for the first node named `name`.
    pub fn find(&self, name: &str) -> Option<&View> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}
