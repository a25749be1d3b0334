//! Input signals
//!
//! Discrete input events queued between frames and consumed by the first
//! update slice of the next frame.

use serde::{Deserialize, Serialize};

/// Mouse button carried by button edge signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// A keyboard key, named the way browsers name `KeyboardEvent.key`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Escape,
    Character(char),
    Other(String),
}

impl Key {
    /// Map a browser-style key name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            " " | "Space" => Key::Space,
            "Enter" | "Return" => Key::Enter,
            "Escape" => Key::Escape,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c.to_ascii_lowercase()),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }
}

/// A queued input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Signal {
    Click { x: f32, y: f32 },
    Context { x: f32, y: f32 },
    MouseDown { x: f32, y: f32, button: MouseButton },
    MouseUp { x: f32, y: f32, button: MouseButton },
    KeyDown { key: Key },
    KeyUp { key: Key },
}

impl Signal {
    /// Keyboard signals go to every node with a handler, pointer signals
    /// only to hovered nodes
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Signal::KeyDown { .. } | Signal::KeyUp { .. })
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            Signal::KeyDown { key } | Signal::KeyUp { key } => Some(key),
            _ => None,
        }
    }

    /// Pointer position for pointer signals
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Signal::Click { x, y }
            | Signal::Context { x, y }
            | Signal::MouseDown { x, y, .. }
            | Signal::MouseUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Signals waiting for the next update slice
#[derive(Debug, Clone, Default)]
pub struct SignalQueue {
    pending: Vec<Signal>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        self.pending.push(signal);
    }

    /// Take every queued signal, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Signal] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("A"), Key::Character('a'));
        assert_eq!(Key::from_name("F5"), Key::Other("F5".to_string()));
    }

    #[test]
    fn test_signal_kinds() {
        let click = Signal::Click { x: 1.0, y: 2.0 };
        let key = Signal::KeyDown { key: Key::Space };
        assert!(!click.is_keyboard());
        assert!(key.is_keyboard());
        assert_eq!(click.position(), Some((1.0, 2.0)));
        assert_eq!(key.key(), Some(&Key::Space));
        assert_eq!(key.position(), None);
    }

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = SignalQueue::new();
        queue.push(Signal::Click { x: 0.0, y: 0.0 });
        queue.push(Signal::KeyUp { key: Key::Enter });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_signal_serializes_with_name_tag() {
        let json = serde_json::to_string(&Signal::Context { x: 3.0, y: 4.0 }).unwrap();
        assert_eq!(json, r#"{"name":"context","x":3.0,"y":4.0}"#);
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Signal::Context { x: 3.0, y: 4.0 });
    }
}
