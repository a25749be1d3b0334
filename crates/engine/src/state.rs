//! Simulation state shared by every node

use easel_render::Point;
use serde::{Deserialize, Serialize};

/// Pointer state tracked outside the signal queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mouse {
    pub left_is_down: bool,
    pub right_is_down: bool,
    /// Last known pointer position, `(-1, -1)` before the first move
    pub location: Point,
}

impl Default for Mouse {
    fn default() -> Self {
        Self {
            left_is_down: false,
            right_is_down: false,
            location: Point::new(-1.0, -1.0),
        }
    }
}

/// Fields every game state carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Globals {
    /// Milliseconds since the engine's first frame
    pub now: f64,
    pub mouse: Mouse,
}

/// A game's simulation state
///
/// Implementors embed a `Globals` and hand it out so the engine can keep the
/// clock and pointer fields current.
pub trait GameState: 'static {
    fn globals(&self) -> &Globals;
    fn globals_mut(&mut self) -> &mut Globals;
}

impl GameState for Globals {
    fn globals(&self) -> &Globals {
        self
    }

    fn globals_mut(&mut self) -> &mut Globals {
        self
    }
}
