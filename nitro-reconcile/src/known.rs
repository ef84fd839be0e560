//! Containers declared during one reconcile pass.

use std::collections::HashSet;

/// Identifiers of containers that a provisioning phase returned this run.
///
/// Created empty at the start of [`Reconciler::reconcile`] and handed to the
/// sweep by reference; it never outlives the pass that built it.
///
/// [`Reconciler::reconcile`]: crate::Reconciler::reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownContainers {
    ids: HashSet<String>,
}

impl KnownContainers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declared container. Empty identifiers are ignored.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KnownContainers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut known = KnownContainers::new();
        for id in iter {
            known.insert(id);
        }
        known
    }
}
