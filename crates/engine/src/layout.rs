//! Per-frame bounds registry
//!
//! The render pass records every drawn node's bounds and hover flag here.
//! Callbacks read (and may adjust) other nodes' bounds through it, e.g. a
//! ball checking itself against a paddle.

use easel_render::Rect;
use rustc_hash::FxHashMap;

use crate::node::NodeId;

/// What the last render pass saw of one node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutEntry {
    pub parent: Option<NodeId>,
    /// Resolved bounds in the parent's frame
    pub bounds: Rect,
    /// Bounds in surface coordinates
    pub screen: Rect,
    /// Pointer was inside `screen` during the last render pass
    pub hovered: bool,
    /// Drawn during the last render pass
    pub visible: bool,
}

/// Bounds and hover flags keyed by node id
#[derive(Debug, Default)]
pub struct Layout {
    entries: FxHashMap<NodeId, LayoutEntry>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutEntry> {
        self.entries.get(&id)
    }

    /// Local bounds from the last render pass
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.entries.get(&id).map(|e| e.bounds)
    }

    /// Surface bounds from the last render pass
    pub fn screen_bounds(&self, id: NodeId) -> Option<Rect> {
        self.entries.get(&id).map(|e| e.screen)
    }

    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.hovered)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    /// Overwrite a node's bounds until the next render pass
    ///
    /// The screen rectangle moves by the same offset.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        let entry = self.entries.entry(id).or_default();
        let dx = bounds.x - entry.bounds.x;
        let dy = bounds.y - entry.bounds.y;
        entry.screen = Rect::new(entry.screen.x + dx, entry.screen.y + dy, bounds.width, bounds.height);
        entry.bounds = bounds;
    }

    pub(crate) fn record(&mut self, id: NodeId, entry: LayoutEntry) {
        self.entries.insert(id, entry);
    }

    /// Mark a node as not drawn: no hover, bounds kept from its last draw
    pub(crate) fn hide(&mut self, id: NodeId, parent: Option<NodeId>) {
        let entry = self.entries.entry(id).or_default();
        entry.parent = parent;
        entry.hovered = false;
        entry.visible = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
