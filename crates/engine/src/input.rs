//! Raw input routing
//!
//! Window events are applied to the pointer fields of `Globals` at once and,
//! for discrete events, turned into queued signals.

use easel_render::Point;
use log::trace;
use rustc_hash::FxHashSet;

use crate::signal::{Key, MouseButton, Signal, SignalQueue};
use crate::state::Globals;

/// A raw event from the windowing layer
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: MouseButton },
    PointerUp { x: f32, y: f32, button: MouseButton },
    /// Pointer left the surface
    PointerLeave,
    Click { x: f32, y: f32 },
    ContextMenu { x: f32, y: f32 },
    KeyDown(Key),
    KeyUp(Key),
}

/// Tracks held keys to suppress auto-repeat
#[derive(Debug, Default)]
pub struct InputTracker {
    held: FxHashSet<Key>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key is currently held
    pub fn is_held(&self, key: &Key) -> bool {
        self.held.contains(key)
    }

    /// Apply an event to the pointer state and queue its signal, if any
    pub fn handle(&mut self, event: InputEvent, globals: &mut Globals, queue: &mut SignalQueue) {
        trace!("Input event: {:?}", event);
        match event {
            InputEvent::PointerMove { x, y } => {
                globals.mouse.location = Point::new(x, y);
            }
            InputEvent::PointerDown { x, y, button } => {
                globals.mouse.location = Point::new(x, y);
                set_button(globals, button, true);
                queue.push(Signal::MouseDown { x, y, button });
            }
            InputEvent::PointerUp { x, y, button } => {
                globals.mouse.location = Point::new(x, y);
                set_button(globals, button, false);
                queue.push(Signal::MouseUp { x, y, button });
            }
            InputEvent::PointerLeave => {
                globals.mouse.left_is_down = false;
                globals.mouse.right_is_down = false;
            }
            InputEvent::Click { x, y } => {
                queue.push(Signal::Click { x, y });
            }
            InputEvent::ContextMenu { x, y } => {
                queue.push(Signal::Context { x, y });
            }
            InputEvent::KeyDown(key) => {
                if self.held.insert(key.clone()) {
                    queue.push(Signal::KeyDown { key });
                }
            }
            InputEvent::KeyUp(key) => {
                if self.held.remove(&key) {
                    queue.push(Signal::KeyUp { key });
                }
            }
        }
    }
}

fn set_button(globals: &mut Globals, button: MouseButton, down: bool) {
    match button {
        MouseButton::Left => globals.mouse.left_is_down = down,
        MouseButton::Right => globals.mouse.right_is_down = down,
        MouseButton::Middle => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(events: Vec<InputEvent>) -> (Globals, SignalQueue) {
        let mut tracker = InputTracker::new();
        let mut globals = Globals::default();
        let mut queue = SignalQueue::new();
        for event in events {
            tracker.handle(event, &mut globals, &mut queue);
        }
        (globals, queue)
    }

    #[test]
    fn test_key_repeat_suppressed() {
        let (_, queue) = feed(vec![
            InputEvent::KeyDown(Key::ArrowLeft),
            InputEvent::KeyDown(Key::ArrowLeft),
            InputEvent::KeyDown(Key::ArrowLeft),
        ]);
        assert_eq!(queue.pending(), &[Signal::KeyDown { key: Key::ArrowLeft }]);
    }

    #[test]
    fn test_key_up_only_when_held() {
        let (_, queue) = feed(vec![
            InputEvent::KeyUp(Key::Space),
            InputEvent::KeyDown(Key::Space),
            InputEvent::KeyUp(Key::Space),
            InputEvent::KeyUp(Key::Space),
            InputEvent::KeyDown(Key::Space),
        ]);
        assert_eq!(
            queue.pending(),
            &[
                Signal::KeyDown { key: Key::Space },
                Signal::KeyUp { key: Key::Space },
                Signal::KeyDown { key: Key::Space },
            ]
        );
    }

    #[test]
    fn test_pointer_state_updates_without_signals() {
        let (globals, queue) = feed(vec![InputEvent::PointerMove { x: 12.0, y: 30.0 }]);
        assert_eq!(globals.mouse.location, Point::new(12.0, 30.0));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_buttons_and_leave() {
        let (globals, queue) = feed(vec![
            InputEvent::PointerDown { x: 1.0, y: 1.0, button: MouseButton::Left },
            InputEvent::PointerDown { x: 1.0, y: 1.0, button: MouseButton::Right },
        ]);
        assert!(globals.mouse.left_is_down);
        assert!(globals.mouse.right_is_down);
        assert_eq!(queue.len(), 2);

        let (globals, _) = feed(vec![
            InputEvent::PointerDown { x: 1.0, y: 1.0, button: MouseButton::Left },
            InputEvent::PointerLeave,
        ]);
        assert!(!globals.mouse.left_is_down);
        assert!(!globals.mouse.right_is_down);
    }

    #[test]
    fn test_click_and_context_signals() {
        let (_, queue) = feed(vec![
            InputEvent::Click { x: 5.0, y: 6.0 },
            InputEvent::ContextMenu { x: 7.0, y: 8.0 },
        ]);
        assert_eq!(
            queue.pending(),
            &[Signal::Click { x: 5.0, y: 6.0 }, Signal::Context { x: 7.0, y: 8.0 }]
        );
    }
}
