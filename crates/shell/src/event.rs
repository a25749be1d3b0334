//! SDL event handling
//!
//! Polls SDL events and converts them to engine input events.

use easel_engine::{InputEvent, Key, MouseButton};

/// Events produced by one poll
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// Close the window
    Quit,
    /// Forward to the engine
    Input(InputEvent),
}

// SDL event type constants
const SDL_QUIT: u32 = 0x100;
const SDL_WINDOWEVENT: u32 = 0x200;
const SDL_KEYDOWN: u32 = 0x300;
const SDL_KEYUP: u32 = 0x301;
const SDL_MOUSEMOTION: u32 = 0x400;
const SDL_MOUSEBUTTONDOWN: u32 = 0x401;
const SDL_MOUSEBUTTONUP: u32 = 0x402;

// SDL scancode constants
pub const SCANCODE_RETURN: u32 = 40;
pub const SCANCODE_ESCAPE: u32 = 41;
pub const SCANCODE_SPACE: u32 = 44;
pub const SCANCODE_RIGHT: u32 = 79;
pub const SCANCODE_LEFT: u32 = 80;
pub const SCANCODE_DOWN: u32 = 81;
pub const SCANCODE_UP: u32 = 82;

// SDL window event subtypes
const SDL_WINDOWEVENT_LEAVE: u8 = 11;
const SDL_WINDOWEVENT_CLOSE: u8 = 14;

/// Map an SDL key to an engine key
///
/// Named keys go by scancode; anything else by its printable keycode.
pub fn key_from_sdl(scancode: u32, keycode: i32) -> Key {
    match scancode {
        SCANCODE_LEFT => Key::ArrowLeft,
        SCANCODE_RIGHT => Key::ArrowRight,
        SCANCODE_UP => Key::ArrowUp,
        SCANCODE_DOWN => Key::ArrowDown,
        SCANCODE_SPACE => Key::Space,
        SCANCODE_RETURN => Key::Enter,
        SCANCODE_ESCAPE => Key::Escape,
        _ => match u32::try_from(keycode).ok().and_then(char::from_u32) {
            Some(c) if !c.is_control() => Key::Character(c),
            _ => Key::Other(format!("scancode-{}", scancode)),
        },
    }
}

/// Map an SDL mouse button index
pub fn mouse_button(button: u8) -> Option<MouseButton> {
    match button {
        1 => Some(MouseButton::Left),
        2 => Some(MouseButton::Middle),
        3 => Some(MouseButton::Right),
        _ => None,
    }
}

/// Input events for a button release
///
/// A release also completes a click: left releases click, right releases
/// open the context menu.
pub fn button_released(x: f32, y: f32, button: MouseButton) -> Vec<ShellEvent> {
    let mut events = vec![ShellEvent::Input(InputEvent::PointerUp { x, y, button })];
    match button {
        MouseButton::Left => events.push(ShellEvent::Input(InputEvent::Click { x, y })),
        MouseButton::Right => events.push(ShellEvent::Input(InputEvent::ContextMenu { x, y })),
        MouseButton::Middle => {}
    }
    events
}

/// Poll all pending SDL events
///
/// Pointer coordinates arrive in logical pixels; the renderer undoes its
/// scale before events reach the queue.
pub fn poll_events() -> Vec<ShellEvent> {
    let mut events = Vec::new();

    unsafe {
        let mut raw_event: sdl2::sys::SDL_Event = std::mem::zeroed();

        while sdl2::sys::SDL_PollEvent(&mut raw_event) != 0 {
            match raw_event.type_ {
                SDL_QUIT => {
                    events.push(ShellEvent::Quit);
                }

                SDL_KEYDOWN | SDL_KEYUP => {
                    let key_event = raw_event.key;
                    let scancode = key_event.keysym.scancode as u32;
                    let key = key_from_sdl(scancode, key_event.keysym.sym);
                    if raw_event.type_ == SDL_KEYUP {
                        events.push(ShellEvent::Input(InputEvent::KeyUp(key)));
                    } else if key == Key::Escape {
                        events.push(ShellEvent::Quit);
                    } else {
                        events.push(ShellEvent::Input(InputEvent::KeyDown(key)));
                    }
                }

                SDL_MOUSEMOTION => {
                    let motion_event = raw_event.motion;
                    events.push(ShellEvent::Input(InputEvent::PointerMove {
                        x: motion_event.x as f32,
                        y: motion_event.y as f32,
                    }));
                }

                SDL_MOUSEBUTTONDOWN => {
                    let button_event = raw_event.button;
                    if let Some(button) = mouse_button(button_event.button) {
                        events.push(ShellEvent::Input(InputEvent::PointerDown {
                            x: button_event.x as f32,
                            y: button_event.y as f32,
                            button,
                        }));
                    }
                }

                SDL_MOUSEBUTTONUP => {
                    let button_event = raw_event.button;
                    if let Some(button) = mouse_button(button_event.button) {
                        events.extend(button_released(
                            button_event.x as f32,
                            button_event.y as f32,
                            button,
                        ));
                    }
                }

                SDL_WINDOWEVENT => match raw_event.window.event {
                    SDL_WINDOWEVENT_CLOSE => events.push(ShellEvent::Quit),
                    SDL_WINDOWEVENT_LEAVE => events.push(ShellEvent::Input(InputEvent::PointerLeave)),
                    _ => {}
                },

                _ => {
                    // Ignore unknown events
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys_by_scancode() {
        assert_eq!(key_from_sdl(SCANCODE_LEFT, 0x4000_0050), Key::ArrowLeft);
        assert_eq!(key_from_sdl(SCANCODE_SPACE, 32), Key::Space);
        assert_eq!(key_from_sdl(SCANCODE_ESCAPE, 27), Key::Escape);
    }

    #[test]
    fn test_printable_keys_by_keycode() {
        assert_eq!(key_from_sdl(4, 'a' as i32), Key::Character('a'));
        assert_eq!(key_from_sdl(58, 0x4000_003A), Key::Other("scancode-58".to_string()));
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(mouse_button(1), Some(MouseButton::Left));
        assert_eq!(mouse_button(3), Some(MouseButton::Right));
        assert_eq!(mouse_button(4), None);
    }

    #[test]
    fn test_release_completes_click() {
        let events = button_released(3.0, 4.0, MouseButton::Left);
        assert_eq!(
            events,
            vec![
                ShellEvent::Input(InputEvent::PointerUp {
                    x: 3.0,
                    y: 4.0,
                    button: MouseButton::Left
                }),
                ShellEvent::Input(InputEvent::Click { x: 3.0, y: 4.0 }),
            ]
        );
        let events = button_released(3.0, 4.0, MouseButton::Right);
        assert_eq!(events[1], ShellEvent::Input(InputEvent::ContextMenu { x: 3.0, y: 4.0 }));
        assert_eq!(button_released(0.0, 0.0, MouseButton::Middle).len(), 1);
    }
}
