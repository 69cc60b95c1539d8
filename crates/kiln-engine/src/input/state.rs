use std::collections::HashSet;

use crate::event::{Event, EventKind};

use super::types::{Key, MouseButton};

/// Pollable input state for the application window.
///
/// Fed from the same events the layer stack sees, before layers get a chance
/// to mark them handled, so polling reflects the device rather than whichever
/// layer consumed the event.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    /// Physical pixels, top-left origin.
    pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &Event) {
        match event.kind() {
            EventKind::KeyPressed(e) => {
                self.keys_down.insert(e.key);
            }
            EventKind::KeyReleased(e) => {
                self.keys_down.remove(&e.key);
            }
            EventKind::MouseButtonPressed(e) => {
                self.buttons_down.insert(e.button);
            }
            EventKind::MouseButtonReleased(e) => {
                self.buttons_down.remove(&e.button);
            }
            EventKind::MouseMoved(e) => {
                self.pointer_pos = Some((e.x, e.y));
            }
            EventKind::WindowClose(_)
            | EventKind::WindowResize(_)
            | EventKind::KeyTyped(_)
            | EventKind::MouseScrolled(_) => {}
        }
    }

    /// Clears held keys and buttons. Called on focus loss so nothing stays stuck
    /// when the release happens in another window.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.buttons_down.clear();
    }

    /// Forgets the pointer position; the cursor left the window.
    pub fn pointer_left(&mut self) {
        self.pointer_pos = None;
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    #[inline]
    pub fn pointer_position(&self) -> Option<(f32, f32)> {
        self.pointer_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyPressed, KeyReleased, MouseButtonPressed, MouseMoved};

    #[test]
    fn key_press_and_release_toggle_down_state() {
        let mut s = InputState::new();
        s.apply_event(&Event::new(KeyPressed { key: Key::W, repeat_count: 0 }));
        assert!(s.key_down(Key::W));
        assert!(!s.key_down(Key::S));

        s.apply_event(&Event::new(KeyReleased { key: Key::W }));
        assert!(!s.key_down(Key::W));
    }

    #[test]
    fn handled_events_still_update_state() {
        let mut s = InputState::new();
        let mut ev = Event::new(MouseButtonPressed { button: MouseButton::Left });
        ev.handled = true;
        s.apply_event(&ev);
        assert!(s.button_down(MouseButton::Left));
    }

    #[test]
    fn release_all_clears_keys_and_buttons_but_keeps_pointer() {
        let mut s = InputState::new();
        s.apply_event(&Event::new(KeyPressed { key: Key::A, repeat_count: 0 }));
        s.apply_event(&Event::new(MouseButtonPressed { button: MouseButton::Right }));
        s.apply_event(&Event::new(MouseMoved { x: 10.0, y: 20.0 }));

        s.release_all();

        assert!(!s.key_down(Key::A));
        assert!(!s.button_down(MouseButton::Right));
        assert_eq!(s.pointer_position(), Some((10.0, 20.0)));

        s.pointer_left();
        assert_eq!(s.pointer_position(), None);
    }
}
