//! Window group entity

use crate::domain::value_objects::{NodeId, WindowId};

/// A host window and the ordered roots of its tab forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGroup {
    pub(crate) id: WindowId,
    pub(crate) focused: bool,
    pub(crate) roots: Vec<NodeId>,
}

impl WindowGroup {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            focused: false,
            roots: Vec::new(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}
