//! Easel Engine
//!
//! A retained-mode 2D scene graph driven by a fixed-step loop. A game is a
//! tree of [`Drawable`] nodes whose properties are literals or computed from
//! the game state. Each frame renders the tree onto a [`Surface`], records
//! layout and hover, then advances the simulation in fixed slices while
//! routing queued input signals to node handlers.
//!
//! [`Surface`]: easel_render::Surface

mod assets;
mod audio;
mod collision;
mod config;
mod engine;
mod error;
mod input;
mod instance;
mod layout;
mod nine_patch;
mod node;
mod render;
mod schedule;
mod signal;
mod spritesheet;
mod state;
mod update;
mod value;

pub use assets::{
    decode_image, AssetCache, AssetFetcher, AssetKind, AssetPayload, AssetReply, AssetRequest, AssetState,
    AudioClip, ImageHandle, MemoryFetcher, TokioFetcher,
};
pub use audio::AudioOutput;
pub use collision::{amend, collides, Amendment, Axis};
pub use config::{EngineConfig, DEFAULT_FIXED_STEP, DEFAULT_MAX_FRAME_DELTA};
pub use engine::{Engine, FrameStats, StartConfig};
pub use error::{AssetError, AudioError, EngineError, EngineResult};
pub use input::{InputEvent, InputTracker};
pub use instance::{Instance, InstanceOptions};
pub use layout::{Layout, LayoutEntry};
pub use nine_patch::{NinePatch, PatchRegion};
pub use node::{Context, DrawContext, Drawable, Element, Node, NodeId, Props, Resolved};
pub use render::{paint_default, scratch_key};
pub use schedule::{FixedStep, Slices};
pub use signal::{Key, MouseButton, Signal, SignalQueue};
pub use spritesheet::SpriteCell;
pub use state::{GameState, Globals, Mouse};
pub use value::Value;

pub use easel_render::{DisplayList, FontSpec, Point, Rect, RenderColor, Surface, TextAlign, TextBaseline};
