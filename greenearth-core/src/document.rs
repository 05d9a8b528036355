//! In-memory [`Document`] used by the terminal front end and by tests.

use std::collections::HashMap;

use crate::model::{Bounds, ElementId, Style};
use crate::ports::Document;

#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: Bounds,
    style: Style,
}

#[derive(Debug, Default)]
/// Flat element store keyed by [`ElementId`].
pub struct MemoryDocument {
    nodes: HashMap<ElementId, Node>,
    next_id: u64,
}

impl MemoryDocument {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and attach an element with default style.
    pub fn create(&mut self, bounds: Bounds) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.attach(id, bounds);
        id
    }

    /// Attach (or re-attach) an element with default style.
    pub fn attach(&mut self, element: ElementId, bounds: Bounds) {
        self.nodes.insert(
            element,
            Node {
                bounds,
                style: Style::default(),
            },
        );
    }

    /// Remove an element. Returns `false` if it was not attached.
    pub fn detach(&mut self, element: ElementId) -> bool {
        self.nodes.remove(&element).is_some()
    }

    /// Move or resize an attached element.
    pub fn set_bounds(&mut self, element: ElementId, bounds: Bounds) -> bool {
        match self.nodes.get_mut(&element) {
            Some(node) => {
                node.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Whether the element is attached.
    #[must_use]
    pub fn is_attached(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    /// Number of attached elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no element is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bottom edge of the lowest element.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.nodes
            .values()
            .map(|node| node.bounds.bottom())
            .fold(0.0, f32::max)
    }
}

impl Document for MemoryDocument {
    fn bounds(&self, element: ElementId) -> Option<Bounds> {
        self.nodes.get(&element).map(|node| node.bounds)
    }

    fn style(&self, element: ElementId) -> Option<Style> {
        self.nodes.get(&element).map(|node| node.style)
    }

    fn apply(&mut self, element: ElementId, style: &Style) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.style = *style;
        }
    }
}
