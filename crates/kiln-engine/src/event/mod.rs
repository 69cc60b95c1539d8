//! Event model.
//!
//! Events are a closed enum of window and input occurrences. Each carries a
//! `handled` flag and a fixed category mask. [`EventDispatcher`] narrows an
//! event to a concrete payload type and invokes a handler when it matches.

mod dispatch;
mod types;

pub use dispatch::EventDispatcher;
pub use types::{
    Event,
    EventCategory,
    EventKind,
    EventType,
    EventVariant,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
    WindowClose,
    WindowResize,
};
