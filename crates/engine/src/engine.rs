//! Loop driver
//!
//! `Engine` owns the state, the node tree and the input queue. The shell
//! feeds it input events and calls `frame` once per display refresh: render
//! the current state, then simulate the elapsed time in fixed slices.

use std::time::Duration;

use easel_render::{Point, RenderColor, Surface};
use log::{info, trace};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::input::{InputEvent, InputTracker};
use crate::instance::Instance;
use crate::layout::Layout;
use crate::node::Node;
use crate::render::{surface_rect, RenderPass};
use crate::schedule::FixedStep;
use crate::signal::{Signal, SignalQueue};
use crate::state::GameState;
use crate::update::UpdatePass;

/// Everything needed to start an engine
pub struct StartConfig<S> {
    pub width: u32,
    pub height: u32,
    pub state: S,
    pub nodes: Vec<Node<S>>,
    /// Cleared to this color before every render pass
    pub background: Option<RenderColor>,
    pub config: EngineConfig,
    /// Services for callbacks; a headless instance when `None`
    pub instance: Option<Instance>,
}

impl<S: GameState> StartConfig<S> {
    pub fn new(width: u32, height: u32, state: S) -> Self {
        Self {
            width,
            height,
            state,
            nodes: Vec::new(),
            background: None,
            config: EngineConfig::default(),
            instance: None,
        }
    }

    pub fn node(mut self, node: impl Into<Node<S>>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn nodes<N: Into<Node<S>>>(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
        self.nodes.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn background(mut self, color: RenderColor) -> Self {
        self.background = Some(color);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }
}

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Wall time since the previous frame, before clamping
    pub elapsed: Duration,
    pub slices: u32,
    pub signals_delivered: usize,
    pub nodes_drawn: usize,
    pub assets_settled: usize,
}

/// A running scene
pub struct Engine<S> {
    width: u32,
    height: u32,
    state: S,
    roots: Vec<Node<S>>,
    root_order: Vec<usize>,
    background: Option<RenderColor>,
    config: EngineConfig,
    step: FixedStep,
    layout: Layout,
    queue: SignalQueue,
    input: InputTracker,
    instance: Instance,
    last_frame: Option<Duration>,
    frames: u64,
}

impl<S: GameState> Engine<S> {
    /// Validate the configuration and build the engine
    pub fn start(config: StartConfig<S>) -> EngineResult<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(EngineError::InvalidSize {
                width: config.width,
                height: config.height,
            });
        }
        config.config.validate()?;

        info!(
            "Starting engine: {}x{}, {} root nodes, step {:?}",
            config.width,
            config.height,
            config.nodes.len(),
            config.config.fixed_step
        );

        Ok(Self {
            width: config.width,
            height: config.height,
            state: config.state,
            roots: config.nodes,
            root_order: Vec::new(),
            background: config.background,
            step: FixedStep::new(config.config.fixed_step, config.config.max_frame_delta),
            config: config.config,
            layout: Layout::new(),
            queue: SignalQueue::new(),
            input: InputTracker::new(),
            instance: config.instance.unwrap_or_else(Instance::headless),
            last_frame: None,
            frames: 0,
        })
    }

    /// Apply a raw input event: pointer fields change now, signals wait for
    /// the next update slice
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input
            .handle(event, self.state.globals_mut(), &mut self.queue);
    }

    /// Run one frame at `timestamp` (monotonic, since the loop started)
    pub fn frame(&mut self, timestamp: Duration, surface: &mut dyn Surface) -> FrameStats {
        let elapsed = self
            .last_frame
            .map(|previous| timestamp.saturating_sub(previous))
            .unwrap_or_default();
        self.last_frame = Some(timestamp);
        self.state.globals_mut().now = timestamp.as_secs_f64() * 1000.0;

        let assets_settled = self.instance.poll_assets();
        let nodes_drawn = self.render(surface);
        let (slices, signals_delivered) = self.update(elapsed);
        self.frames += 1;

        let stats = FrameStats {
            elapsed,
            slices,
            signals_delivered,
            nodes_drawn,
            assets_settled,
        };
        trace!("Frame {}: {:?}", self.frames, stats);
        stats
    }

    /// Render pass only; returns the number of nodes drawn
    pub fn render(&mut self, surface: &mut dyn Surface) -> usize {
        if let Some(background) = self.background {
            surface.fill_rect(surface_rect(self.width, self.height), background, 0.0);
        }

        let pointer = self.state.globals().mouse.location;
        let mut pass = RenderPass::new(&self.state, &mut self.layout, &self.instance, pointer, self.config.debug);
        self.root_order = pass.render_list(&mut self.roots, None, surface, Point::default());
        pass.nodes_drawn
    }

    /// Update pass only; returns slices run and signals delivered
    ///
    /// The signal queue is drained by the first slice. With zero slices the
    /// queue is left alone for the next frame.
    pub fn update(&mut self, elapsed: Duration) -> (u32, usize) {
        let mut slices = 0;
        let mut delivered = 0;
        let mut batch = Vec::new();

        for delta in self.step.slices(elapsed) {
            if slices == 0 {
                batch = self.queue.drain();
            } else {
                batch.clear();
            }
            let mut pass = UpdatePass {
                state: &mut self.state,
                layout: &mut self.layout,
                instance: &self.instance,
                signals: &batch,
                delta,
                delivered: 0,
            };
            pass.run(&mut self.roots, &self.root_order);
            delivered += pass.delivered;
            slices += 1;
        }
        (slices, delivered)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn roots(&self) -> &[Node<S>] {
        &self.roots
    }

    pub fn pending_signals(&self) -> &[Signal] {
        self.queue.pending()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
