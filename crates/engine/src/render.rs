//! Render pass
//!
//! Walks the tree once per frame: resolves each node, records its bounds and
//! hover flag in the layout, paints it, and recurses into its children in a
//! frame translated by the node's rounded position.

use std::sync::Arc;

use easel_render::{Point, Rect, RenderColor, Surface};
use log::trace;

use crate::instance::Instance;
use crate::layout::{Layout, LayoutEntry};
use crate::nine_patch::NinePatch;
use crate::node::{depth_order, DrawContext, Node, NodeId, Resolved};

/// Outline color for debug bounds
const DEBUG_OUTLINE: RenderColor = RenderColor::RED;

/// Paint a node's own visuals: background, image, text, stroke
///
/// Images that are not loaded yet are skipped; the request made here keeps
/// the load going for later frames.
pub fn paint_default<S>(resolved: &Resolved, cx: &mut DrawContext<'_, S>) {
    let bounds = resolved.bounds();

    if let Some(background) = resolved.background {
        cx.surface.fill_rect(bounds, background, resolved.radius);
    }

    if let Some(src) = resolved.image.as_deref() {
        if let Some(image) = cx.instance.image(src) {
            let source = resolved.source.unwrap_or_else(|| image.bounds());
            if !source.is_empty() && !bounds.is_empty() {
                cx.surface.draw_image(&image, source, bounds);
            }
        }
    }

    if let Some(text) = resolved.text.as_deref().filter(|t| !t.is_empty()) {
        cx.surface.fill_text(
            text,
            bounds.x + bounds.width / 2.0,
            bounds.y + bounds.height / 2.0,
            &resolved.text_style(),
        );
    }

    if let Some(stroke) = resolved.stroke {
        if resolved.line_width > 0.0 {
            cx.surface.stroke_rect(bounds, stroke, resolved.line_width, resolved.radius);
        }
    }
}

/// State of one render pass
pub(crate) struct RenderPass<'a, S> {
    pub state: &'a S,
    pub layout: &'a mut Layout,
    pub instance: &'a Instance,
    pub pointer: Point,
    pub debug: bool,
    /// Hover is only computed for nodes drawn to the real surface
    hit_test: bool,
    pub nodes_drawn: usize,
}

impl<'a, S> RenderPass<'a, S> {
    pub fn new(state: &'a S, layout: &'a mut Layout, instance: &'a Instance, pointer: Point, debug: bool) -> Self {
        Self {
            state,
            layout,
            instance,
            pointer,
            debug,
            hit_test: true,
            nodes_drawn: 0,
        }
    }

    /// Draw a sibling list in depth order
    ///
    /// `origin` is the surface position of the siblings' shared frame.
    /// Returns the depth order used, for the update pass to reuse.
    pub fn render_list(
        &mut self,
        nodes: &mut [Node<S>],
        parent: Option<NodeId>,
        surface: &mut dyn Surface,
        origin: Point,
    ) -> Vec<usize> {
        let mut resolved: Vec<Resolved> = nodes.iter().map(|n| n.element.resolve(self.state)).collect();
        let z: Vec<f32> = resolved.iter().map(|r| r.z).collect();
        let order = depth_order(&z);

        for &i in &order {
            let props = std::mem::take(&mut resolved[i]);
            self.render_node(&mut nodes[i], props, parent, surface, origin);
        }
        order
    }

    fn render_node(
        &mut self,
        node: &mut Node<S>,
        resolved: Resolved,
        parent: Option<NodeId>,
        surface: &mut dyn Surface,
        origin: Point,
    ) {
        if !resolved.visible {
            self.hide_subtree(node, parent);
            return;
        }

        let bounds = resolved.bounds();
        let screen = bounds.translate(origin.x, origin.y);
        let hovered = self.hit_test && screen.contains(self.pointer.x, self.pointer.y);
        self.layout.record(
            node.id(),
            LayoutEntry {
                parent,
                bounds,
                screen,
                hovered,
                visible: true,
            },
        );
        self.nodes_drawn += 1;

        surface.save();
        surface.multiply_alpha(resolved.opacity);

        match node.element.nine_patch(self.state) {
            Some(patch) => self.render_nine_patch(node, &resolved, patch, surface),
            None => {
                node.element.paint(
                    &resolved,
                    &mut DrawContext {
                        state: self.state,
                        instance: self.instance,
                        surface: &mut *surface,
                        node: node.id(),
                    },
                );
                let (dx, dy) = (bounds.x.round(), bounds.y.round());
                surface.save();
                surface.translate(dx, dy);
                let id = node.id();
                node.order = self.render_list(
                    &mut node.children,
                    Some(id),
                    surface,
                    Point::new(origin.x + dx, origin.y + dy),
                );
                surface.restore();
            }
        }

        if self.debug || node.element.debug() {
            surface.stroke_rect(bounds, DEBUG_OUTLINE, 1.0, 0.0);
        }
        surface.restore();
    }

    /// Draw the node and its children into its scratch canvas at the origin,
    /// then copy the nine regions to the node's bounds
    fn render_nine_patch(&mut self, node: &mut Node<S>, resolved: &Resolved, patch: NinePatch, surface: &mut dyn Surface) {
        let (width, height) = patch.source_size();
        let canvas = self.instance.get_canvas(&scratch_key(node.id()));

        let snapshot = {
            let mut raster = canvas.borrow_mut();
            raster.resize(width, height);

            let local = Resolved {
                x: 0.0,
                y: 0.0,
                width: width as f32,
                height: height as f32,
                ..resolved.clone()
            };
            node.element.paint(
                &local,
                &mut DrawContext {
                    state: self.state,
                    instance: self.instance,
                    surface: &mut *raster,
                    node: node.id(),
                },
            );

            // Offscreen content is never under the pointer.
            let hit_test = std::mem::replace(&mut self.hit_test, false);
            let id = node.id();
            node.order = self.render_list(&mut node.children, Some(id), &mut *raster, Point::default());
            self.hit_test = hit_test;

            Arc::new(raster.snapshot())
        };
        trace!("Nine-patch {} scratch {}x{}", node.id(), width, height);

        let bounds = resolved.bounds();
        for region in patch.regions(bounds.width, bounds.height) {
            let destination = region.destination.translate(bounds.x, bounds.y);
            if !region.source.is_empty() && !destination.is_empty() {
                surface.draw_image(&snapshot, region.source, destination);
            }
        }
    }

    /// Skip a hidden subtree, clearing hover so it receives no pointer signals
    fn hide_subtree(&mut self, node: &Node<S>, parent: Option<NodeId>) {
        self.layout.hide(node.id(), parent);
        for child in &node.children {
            self.hide_subtree(child, Some(node.id()));
        }
    }
}

/// Key of a node's scratch canvas
pub fn scratch_key(id: NodeId) -> String {
    format!("nine-patch:{}", id.get())
}

/// Whole-surface rectangle
pub(crate) fn surface_rect(width: u32, height: u32) -> Rect {
    Rect::new(0.0, 0.0, width as f32, height as f32)
}
