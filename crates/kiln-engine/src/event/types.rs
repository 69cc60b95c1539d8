use std::fmt;

use bitflags::bitflags;

use crate::input::{Key, MouseButton};

bitflags! {
    /// Coarse classification of an event, queryable with [`Event::is_in_category`].
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct EventCategory: u8 {
        const APPLICATION  = 1 << 0;
        const INPUT        = 1 << 1;
        const KEYBOARD     = 1 << 2;
        const MOUSE        = 1 << 3;
        const MOUSE_BUTTON = 1 << 4;
    }
}

/// Runtime tag of an [`EventKind`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventType {
    WindowClose,
    WindowResize,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
}

// ── payloads ──────────────────────────────────────────────────────────────

/// The user asked the window to close.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowClose;

/// Drawable size changed, in physical pixels. Either dimension may be zero
/// while the window is minimized.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowResize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyPressed {
    pub key: Key,
    /// `0` for the initial press, `1` for auto-repeat.
    pub repeat_count: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyReleased {
    pub key: Key,
}

/// Committed character input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyTyped {
    pub character: char,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseButtonPressed {
    pub button: MouseButton,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseButtonReleased {
    pub button: MouseButton,
}

/// Pointer position in physical pixels, top-left origin; same units as
/// [`WindowResize`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseMoved {
    pub x: f32,
    pub y: f32,
}

/// Wheel offset in lines; positive `y_offset` scrolls up / away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseScrolled {
    pub x_offset: f32,
    pub y_offset: f32,
}

// ── kind ──────────────────────────────────────────────────────────────────

/// Closed set of events delivered by the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EventKind {
    WindowClose(WindowClose),
    WindowResize(WindowResize),
    KeyPressed(KeyPressed),
    KeyReleased(KeyReleased),
    KeyTyped(KeyTyped),
    MouseButtonPressed(MouseButtonPressed),
    MouseButtonReleased(MouseButtonReleased),
    MouseMoved(MouseMoved),
    MouseScrolled(MouseScrolled),
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::WindowClose(_) => EventType::WindowClose,
            EventKind::WindowResize(_) => EventType::WindowResize,
            EventKind::KeyPressed(_) => EventType::KeyPressed,
            EventKind::KeyReleased(_) => EventType::KeyReleased,
            EventKind::KeyTyped(_) => EventType::KeyTyped,
            EventKind::MouseButtonPressed(_) => EventType::MouseButtonPressed,
            EventKind::MouseButtonReleased(_) => EventType::MouseButtonReleased,
            EventKind::MouseMoved(_) => EventType::MouseMoved,
            EventKind::MouseScrolled(_) => EventType::MouseScrolled,
        }
    }
}

impl EventType {
    pub fn name(self) -> &'static str {
        match self {
            EventType::WindowClose => "WindowClose",
            EventType::WindowResize => "WindowResize",
            EventType::KeyPressed => "KeyPressed",
            EventType::KeyReleased => "KeyReleased",
            EventType::KeyTyped => "KeyTyped",
            EventType::MouseButtonPressed => "MouseButtonPressed",
            EventType::MouseButtonReleased => "MouseButtonReleased",
            EventType::MouseMoved => "MouseMoved",
            EventType::MouseScrolled => "MouseScrolled",
        }
    }

    pub fn categories(self) -> EventCategory {
        match self {
            EventType::WindowClose | EventType::WindowResize => EventCategory::APPLICATION,
            EventType::KeyPressed | EventType::KeyReleased | EventType::KeyTyped => {
                EventCategory::KEYBOARD | EventCategory::INPUT
            }
            EventType::MouseButtonPressed | EventType::MouseButtonReleased => {
                EventCategory::MOUSE_BUTTON | EventCategory::MOUSE | EventCategory::INPUT
            }
            EventType::MouseMoved | EventType::MouseScrolled => {
                EventCategory::MOUSE | EventCategory::INPUT
            }
        }
    }
}

/// A payload type that can be narrowed out of an [`EventKind`].
///
/// Implemented for every payload struct; used by
/// [`EventDispatcher::dispatch`](super::EventDispatcher::dispatch).
pub trait EventVariant: Sized {
    const TYPE: EventType;

    fn narrow(kind: &EventKind) -> Option<&Self>;
}

macro_rules! event_variant {
    ($($name:ident),* $(,)?) => {
        $(
            impl EventVariant for $name {
                const TYPE: EventType = EventType::$name;

                #[inline]
                fn narrow(kind: &EventKind) -> Option<&Self> {
                    match kind {
                        EventKind::$name(payload) => Some(payload),
                        _ => None,
                    }
                }
            }

            impl From<$name> for EventKind {
                #[inline]
                fn from(payload: $name) -> Self {
                    EventKind::$name(payload)
                }
            }
        )*
    };
}

event_variant!(
    WindowClose,
    WindowResize,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
);

// ── event ─────────────────────────────────────────────────────────────────

/// An event travelling through the dispatch chain.
///
/// `handled` starts out `false`. Once set, the layer stack stops offering the
/// event to layers further back.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    pub handled: bool,
}

impl Event {
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self { kind: kind.into(), handled: false }
    }

    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.event_type().name()
    }

    #[inline]
    pub fn categories(&self) -> EventCategory {
        self.event_type().categories()
    }

    #[inline]
    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.categories().intersects(category)
    }

    /// Returns the payload if this event is of type `T`.
    #[inline]
    pub fn get<T: EventVariant>(&self) -> Option<&T> {
        T::narrow(&self.kind)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match &self.kind {
            EventKind::WindowClose(_) => write!(f, "{name}"),
            EventKind::WindowResize(e) => write!(f, "{name}: {}, {}", e.width, e.height),
            EventKind::KeyPressed(e) => {
                write!(f, "{name}: {} (repeat = {})", e.key, e.repeat_count)
            }
            EventKind::KeyReleased(e) => write!(f, "{name}: {}", e.key),
            EventKind::KeyTyped(e) => write!(f, "{name}: {:?}", e.character),
            EventKind::MouseButtonPressed(e) => write!(f, "{name}: {:?}", e.button),
            EventKind::MouseButtonReleased(e) => write!(f, "{name}: {:?}", e.button),
            EventKind::MouseMoved(e) => write!(f, "{name}: {}, {}", e.x, e.y),
            EventKind::MouseScrolled(e) => write!(f, "{name}: {}, {}", e.x_offset, e.y_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── categories ────────────────────────────────────────────────────────

    #[test]
    fn window_events_are_application_only() {
        let e = Event::new(WindowResize { width: 1, height: 1 });
        assert!(e.is_in_category(EventCategory::APPLICATION));
        assert!(!e.is_in_category(EventCategory::INPUT));
    }

    #[test]
    fn mouse_button_events_carry_three_categories() {
        let e = Event::new(MouseButtonPressed { button: MouseButton::Left });
        assert_eq!(
            e.categories(),
            EventCategory::MOUSE_BUTTON | EventCategory::MOUSE | EventCategory::INPUT
        );
        assert!(!e.is_in_category(EventCategory::KEYBOARD));
    }

    #[test]
    fn key_typed_is_keyboard_input() {
        let e = Event::new(KeyTyped { character: 'x' });
        assert!(e.is_in_category(EventCategory::KEYBOARD));
        assert!(e.is_in_category(EventCategory::INPUT));
        assert!(!e.is_in_category(EventCategory::MOUSE));
    }

    // ── narrowing ─────────────────────────────────────────────────────────

    #[test]
    fn get_narrows_to_matching_payload() {
        let e = Event::new(MouseScrolled { x_offset: 0.0, y_offset: 2.0 });
        assert_eq!(e.get::<MouseScrolled>().map(|s| s.y_offset), Some(2.0));
        assert!(e.get::<MouseMoved>().is_none());
    }

    #[test]
    fn new_event_is_unhandled() {
        assert!(!Event::new(WindowClose).handled);
    }

    // ── display ───────────────────────────────────────────────────────────

    #[test]
    fn display_includes_payload() {
        let e = Event::new(WindowResize { width: 1280, height: 720 });
        assert_eq!(e.to_string(), "WindowResize: 1280, 720");

        let e = Event::new(KeyPressed { key: Key::A, repeat_count: 1 });
        assert_eq!(e.to_string(), "KeyPressed: A (repeat = 1)");

        assert_eq!(Event::new(WindowClose).to_string(), "WindowClose");
    }
}
