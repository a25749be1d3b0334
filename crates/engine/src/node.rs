//! Scene graph nodes
//!
//! A `Drawable<S, D>` is built with literal-or-computed properties, a typed
//! payload `D` and optional callbacks, then erased into a `Node<S>` so nodes
//! with different payloads can share one tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use easel_render::{FontSpec, Rect, RenderColor, Surface, TextAlign, TextBaseline, TextStyle};

use crate::instance::Instance;
use crate::layout::Layout;
use crate::nine_patch::NinePatch;
use crate::render::paint_default;
use crate::signal::Signal;
use crate::state::GameState;
use crate::value::Value;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every property of a node resolved for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub z: f32,
    pub visible: bool,
    pub opacity: f32,
    pub background: Option<RenderColor>,
    pub stroke: Option<RenderColor>,
    pub line_width: f32,
    pub radius: f32,
    pub text: Option<String>,
    pub font: FontSpec,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: RenderColor,
    pub image: Option<String>,
    /// Region of the image to draw, the whole image when `None`
    pub source: Option<Rect>,
}

impl Default for Resolved {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            z: 0.0,
            visible: true,
            opacity: 1.0,
            background: None,
            stroke: None,
            line_width: 1.0,
            radius: 0.0,
            text: None,
            font: FontSpec::default(),
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
            color: RenderColor::BLACK,
            image: None,
            source: None,
        }
    }
}

impl Resolved {
    /// Local bounds
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            color: self.color,
            font: self.font.clone(),
            align: self.align,
            baseline: self.baseline,
        }
    }
}

/// NaN positions become 0
fn finite(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// NaN and negative sizes become 0
fn clamp_size(v: f32) -> f32 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v
    }
}

/// Property slots of a drawable
pub struct Props<S, D> {
    pub x: Value<f32, S, D>,
    pub y: Value<f32, S, D>,
    pub width: Value<f32, S, D>,
    pub height: Value<f32, S, D>,
    pub z: Value<f32, S, D>,
    pub visible: Value<bool, S, D>,
    pub opacity: Value<f32, S, D>,
    pub background: Value<RenderColor, S, D>,
    pub stroke: Value<RenderColor, S, D>,
    pub line_width: Value<f32, S, D>,
    pub radius: Value<f32, S, D>,
    pub text: Value<String, S, D>,
    pub font: Value<FontSpec, S, D>,
    pub align: Value<TextAlign, S, D>,
    pub baseline: Value<TextBaseline, S, D>,
    pub color: Value<RenderColor, S, D>,
    pub image: Value<String, S, D>,
    pub source: Value<Rect, S, D>,
}

impl<S, D> Default for Props<S, D> {
    fn default() -> Self {
        Self {
            x: Value::Unset,
            y: Value::Unset,
            width: Value::Unset,
            height: Value::Unset,
            z: Value::Unset,
            visible: Value::Unset,
            opacity: Value::Unset,
            background: Value::Unset,
            stroke: Value::Unset,
            line_width: Value::Unset,
            radius: Value::Unset,
            text: Value::Unset,
            font: Value::Unset,
            align: Value::Unset,
            baseline: Value::Unset,
            color: Value::Unset,
            image: Value::Unset,
            source: Value::Unset,
        }
    }
}

impl<S, D> Props<S, D> {
    /// Resolve every slot once, applying per-property defaults
    pub fn resolve(&self, state: &S, data: &D) -> Resolved {
        let defaults = Resolved::default();
        Resolved {
            x: finite(self.x.resolve_or(state, data, defaults.x)),
            y: finite(self.y.resolve_or(state, data, defaults.y)),
            width: clamp_size(self.width.resolve_or(state, data, defaults.width)),
            height: clamp_size(self.height.resolve_or(state, data, defaults.height)),
            z: finite(self.z.resolve_or(state, data, defaults.z)),
            visible: self.visible.resolve_or(state, data, defaults.visible),
            opacity: {
                let opacity = self.opacity.resolve_or(state, data, defaults.opacity);
                if opacity.is_nan() {
                    1.0
                } else {
                    opacity.clamp(0.0, 1.0)
                }
            },
            background: self.background.resolve(state, data),
            stroke: self.stroke.resolve(state, data),
            line_width: clamp_size(self.line_width.resolve_or(state, data, defaults.line_width)),
            radius: clamp_size(self.radius.resolve_or(state, data, defaults.radius)),
            text: self.text.resolve(state, data),
            font: self.font.resolve_or(state, data, defaults.font),
            align: self.align.resolve_or(state, data, defaults.align),
            baseline: self.baseline.resolve_or(state, data, defaults.baseline),
            color: self.color.resolve_or(state, data, defaults.color),
            image: self.image.resolve(state, data).filter(|src| !src.is_empty()),
            source: self.source.resolve(state, data),
        }
    }
}

/// Everything an update or event callback can touch
pub struct Context<'a, S> {
    pub state: &'a mut S,
    /// Signals dispatched during this slice (empty after the first slice)
    pub signals: &'a [Signal],
    pub instance: &'a Instance,
    /// Bounds and hover flags from the last render pass
    pub layout: &'a mut Layout,
    /// The node the callback belongs to
    pub node: NodeId,
    /// Duration of the current update slice
    pub delta: Duration,
}

impl<S> Context<'_, S> {
    /// Slice duration in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// This node's bounds from the last render pass
    pub fn bounds(&self) -> Option<Rect> {
        self.layout.bounds(self.node)
    }

    pub fn is_hovered(&self) -> bool {
        self.layout.is_hovered(self.node)
    }
}

/// What a draw override gets to work with
pub struct DrawContext<'a, S> {
    pub state: &'a S,
    pub instance: &'a Instance,
    pub surface: &'a mut dyn Surface,
    pub node: NodeId,
}

pub type UpdateFn<S, D> = Box<dyn FnMut(&mut D, &mut Context<'_, S>)>;
pub type EventFn<S, D> = Box<dyn FnMut(&mut D, &mut Context<'_, S>, &Signal)>;
pub type DrawFn<S, D> = Box<dyn FnMut(&D, &Resolved, &mut DrawContext<'_, S>)>;

pub(crate) struct Handlers<S, D> {
    update: Option<UpdateFn<S, D>>,
    update_override: Option<UpdateFn<S, D>>,
    draw_override: Option<DrawFn<S, D>>,
    key_down: Option<EventFn<S, D>>,
    key_up: Option<EventFn<S, D>>,
    click: Option<EventFn<S, D>>,
    context: Option<EventFn<S, D>>,
    mouse_down: Option<EventFn<S, D>>,
    mouse_up: Option<EventFn<S, D>>,
}

impl<S, D> Default for Handlers<S, D> {
    fn default() -> Self {
        Self {
            update: None,
            update_override: None,
            draw_override: None,
            key_down: None,
            key_up: None,
            click: None,
            context: None,
            mouse_down: None,
            mouse_up: None,
        }
    }
}

impl<S, D> Handlers<S, D> {
    fn for_signal(&mut self, signal: &Signal) -> Option<&mut EventFn<S, D>> {
        match signal {
            Signal::Click { .. } => self.click.as_mut(),
            Signal::Context { .. } => self.context.as_mut(),
            Signal::MouseDown { .. } => self.mouse_down.as_mut(),
            Signal::MouseUp { .. } => self.mouse_up.as_mut(),
            Signal::KeyDown { .. } => self.key_down.as_mut(),
            Signal::KeyUp { .. } => self.key_up.as_mut(),
        }
    }
}

/// Type-erased node behavior
pub trait Element<S> {
    /// Resolve all properties for this frame
    fn resolve(&self, state: &S) -> Resolved;

    /// Nine-patch descriptor, when this node is drawn through one
    fn nine_patch(&self, state: &S) -> Option<NinePatch>;

    /// Paint the node's own visuals (not its children)
    fn paint(&mut self, resolved: &Resolved, cx: &mut DrawContext<'_, S>);

    /// Outline this node even when engine debugging is off
    fn debug(&self) -> bool;

    /// Run one update slice: the update callback, then signal dispatch.
    /// Returns how many signals were delivered.
    fn update(&mut self, cx: &mut Context<'_, S>) -> usize;
}

pub(crate) struct DrawableElement<S, D> {
    pub(crate) data: D,
    pub(crate) props: Props<S, D>,
    pub(crate) patch: Value<NinePatch, S, D>,
    pub(crate) handlers: Handlers<S, D>,
    pub(crate) debug: bool,
}

impl<S: GameState, D: 'static> Element<S> for DrawableElement<S, D> {
    fn resolve(&self, state: &S) -> Resolved {
        self.props.resolve(state, &self.data)
    }

    fn nine_patch(&self, state: &S) -> Option<NinePatch> {
        self.patch.resolve(state, &self.data)
    }

    fn paint(&mut self, resolved: &Resolved, cx: &mut DrawContext<'_, S>) {
        match self.handlers.draw_override.as_mut() {
            Some(draw) => draw(&self.data, resolved, cx),
            None => paint_default(resolved, cx),
        }
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn update(&mut self, cx: &mut Context<'_, S>) -> usize {
        // An override takes over the whole slice for this node, signals included.
        if let Some(update) = self.handlers.update_override.as_mut() {
            update(&mut self.data, cx);
            return 0;
        }
        if let Some(update) = self.handlers.update.as_mut() {
            update(&mut self.data, cx);
        }

        let signals = cx.signals;
        let mut delivered = 0;
        for signal in signals {
            if !signal.is_keyboard() && !cx.layout.is_hovered(cx.node) {
                continue;
            }
            if let Some(handler) = self.handlers.for_signal(signal) {
                handler(&mut self.data, cx, signal);
                delivered += 1;
            }
        }
        delivered
    }
}

/// Builder for a node with payload `D`
pub struct Drawable<S, D = ()> {
    pub(crate) id: NodeId,
    pub(crate) children: Vec<Node<S>>,
    pub(crate) element: DrawableElement<S, D>,
}

macro_rules! property {
    ($name:ident, $with:ident, $ty:ty) => {
        pub fn $name(mut self, value: impl Into<Value<$ty, S, D>>) -> Self {
            self.element.props.$name = value.into();
            self
        }

        pub fn $with(mut self, f: impl Fn(&S, &D) -> $ty + 'static) -> Self {
            self.element.props.$name = Value::computed(f);
            self
        }
    };
}

impl<S: GameState> Drawable<S, ()> {
    /// A drawable without payload
    pub fn empty() -> Self {
        Self::new(())
    }
}

impl<S: GameState, D: 'static> Drawable<S, D> {
    pub fn new(data: D) -> Self {
        Self {
            id: NodeId::next(),
            children: Vec::new(),
            element: DrawableElement {
                data,
                props: Props::default(),
                patch: Value::Unset,
                handlers: Handlers::default(),
                debug: false,
            },
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The payload handed to this node's callbacks
    pub fn data(&self) -> &D {
        &self.element.data
    }

    property!(x, x_with, f32);
    property!(y, y_with, f32);
    property!(width, width_with, f32);
    property!(height, height_with, f32);
    property!(z, z_with, f32);
    property!(visible, visible_with, bool);
    property!(opacity, opacity_with, f32);
    property!(background, background_with, RenderColor);
    property!(stroke, stroke_with, RenderColor);
    property!(line_width, line_width_with, f32);
    property!(radius, radius_with, f32);
    property!(text, text_with, String);
    property!(font, font_with, FontSpec);
    property!(align, align_with, TextAlign);
    property!(baseline, baseline_with, TextBaseline);
    property!(color, color_with, RenderColor);
    property!(image, image_with, String);
    property!(source, source_with, Rect);

    /// Set x, y, width and height from literals
    pub fn bounds(self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x(x).y(y).width(width).height(height)
    }

    /// Always outline this node's bounds
    pub fn debug(mut self, debug: bool) -> Self {
        self.element.debug = debug;
        self
    }

    pub fn child(mut self, child: impl Into<Node<S>>) -> Self {
        let mut child = child.into();
        child.parent = Some(self.id);
        self.children.push(child);
        self
    }

    pub fn children<N: Into<Node<S>>>(self, children: impl IntoIterator<Item = N>) -> Self {
        children.into_iter().fold(self, |parent, child| parent.child(child))
    }

    /// Called once per update slice
    pub fn on_update(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>) + 'static) -> Self {
        self.element.handlers.update = Some(Box::new(f));
        self
    }

    /// Replace the update slice for this node, signal dispatch included
    pub fn update_with(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>) + 'static) -> Self {
        self.element.handlers.update_override = Some(Box::new(f));
        self
    }

    /// Replace the painting of this node's own visuals
    pub fn draw_with(mut self, f: impl FnMut(&D, &Resolved, &mut DrawContext<'_, S>) + 'static) -> Self {
        self.element.handlers.draw_override = Some(Box::new(f));
        self
    }

    pub fn on_key_down(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.key_down = Some(Box::new(f));
        self
    }

    pub fn on_key_up(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.key_up = Some(Box::new(f));
        self
    }

    pub fn on_click(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.click = Some(Box::new(f));
        self
    }

    pub fn on_context(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.context = Some(Box::new(f));
        self
    }

    pub fn on_mouse_down(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.mouse_down = Some(Box::new(f));
        self
    }

    pub fn on_mouse_up(mut self, f: impl FnMut(&mut D, &mut Context<'_, S>, &Signal) + 'static) -> Self {
        self.element.handlers.mouse_up = Some(Box::new(f));
        self
    }

    pub fn into_node(self) -> Node<S> {
        Node {
            id: self.id,
            parent: None,
            element: Box::new(self.element),
            children: self.children,
            order: Vec::new(),
        }
    }
}

impl<S: GameState, D: 'static> From<Drawable<S, D>> for Node<S> {
    fn from(drawable: Drawable<S, D>) -> Self {
        drawable.into_node()
    }
}

/// A node in the scene graph
pub struct Node<S> {
    id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) element: Box<dyn Element<S>>,
    pub(crate) children: Vec<Node<S>>,
    /// Child indices in depth order, refreshed every render pass
    pub(crate) order: Vec<usize>,
}

impl<S> Node<S> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[Node<S>] {
        &self.children
    }

    /// Find a node in this subtree
    pub fn find(&self, id: NodeId) -> Option<&Node<S>> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Resolve this node's properties without drawing
    pub fn resolve(&self, state: &S) -> Resolved {
        self.element.resolve(state)
    }
}

impl<S> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

/// Child indices ordered by ascending z, ties in insertion order
pub(crate) fn depth_order(z: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..z.len()).collect();
    order.sort_by(|&a, &b| z[a].total_cmp(&z[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Globals;

    #[test]
    fn test_literal_bounds_resolve_to_literals() {
        let node: Node<Globals> = Drawable::<Globals>::empty().bounds(10.0, 20.0, 30.0, 40.0).into();
        let mut state = Globals::default();
        assert_eq!(node.resolve(&state).bounds(), Rect::new(10.0, 20.0, 30.0, 40.0));
        state.now = 99_999.0;
        state.mouse.location = easel_render::Point::new(15.0, 25.0);
        assert_eq!(node.resolve(&state).bounds(), Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_defaults() {
        let node: Node<Globals> = Drawable::<Globals>::empty().into();
        let resolved = node.resolve(&Globals::default());
        assert_eq!(resolved, Resolved::default());
        assert!(resolved.visible);
        assert_eq!(resolved.opacity, 1.0);
        assert_eq!(resolved.font.size, 24.0);
        assert_eq!(resolved.align, TextAlign::Left);
        assert_eq!(resolved.baseline, TextBaseline::Top);
    }

    #[test]
    fn test_invalid_sizes_clamped() {
        let node: Node<Globals> = Drawable::<Globals>::empty()
            .x(f32::NAN)
            .width(-5.0)
            .height(f32::NAN)
            .opacity(3.0)
            .into();
        let resolved = node.resolve(&Globals::default());
        assert_eq!(resolved.x, 0.0);
        assert_eq!(resolved.width, 0.0);
        assert_eq!(resolved.height, 0.0);
        assert_eq!(resolved.opacity, 1.0);
    }

    #[test]
    fn test_computed_uses_payload() {
        let node: Node<Globals> = Drawable::<Globals, u32>::new(7)
            .x_with(|state, column| *column as f32 * 10.0 + state.now as f32)
            .text_with(|_, column| format!("cell {}", column))
            .into();
        let state = Globals {
            now: 1.0,
            ..Default::default()
        };
        let resolved = node.resolve(&state);
        assert_eq!(resolved.x, 71.0);
        assert_eq!(resolved.text.as_deref(), Some("cell 7"));
    }

    #[test]
    fn test_children_record_parent() {
        let parent: Drawable<Globals> = Drawable::empty();
        let parent_id = parent.id();
        let node: Node<Globals> = parent
            .child(Drawable::<Globals>::empty())
            .children(vec![Drawable::<Globals, u8>::new(1), Drawable::<Globals, u8>::new(2)])
            .into();
        assert_eq!(node.children().len(), 3);
        assert!(node.children().iter().all(|c| c.parent() == Some(parent_id)));
        assert_eq!(node.subtree_len(), 4);
        let second = node.children()[1].id();
        assert_eq!(node.find(second).map(Node::id), Some(second));
    }

    #[test]
    fn test_ids_unique() {
        let a: Drawable<Globals> = Drawable::empty();
        let b: Drawable<Globals> = Drawable::empty();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_depth_order_is_stable() {
        assert_eq!(depth_order(&[0.0, -1.0, 0.0, 2.0, -1.0]), vec![1, 4, 0, 2, 3]);
        assert_eq!(depth_order(&[]), Vec::<usize>::new());
    }
}
