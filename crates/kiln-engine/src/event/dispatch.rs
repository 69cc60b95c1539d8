use super::types::{Event, EventVariant};

/// Routes an event to a handler for one statically-known event type.
///
/// Several `dispatch` calls may be chained on the same event; only those whose
/// type matches run.
///
/// ```ignore
/// let mut dispatcher = EventDispatcher::new(event);
/// dispatcher.dispatch::<MouseScrolled>(|e| self.on_scrolled(e));
/// dispatcher.dispatch::<WindowResize>(|e| self.on_resized(e));
/// ```
pub struct EventDispatcher<'a> {
    event: &'a mut Event,
}

impl<'a> EventDispatcher<'a> {
    #[inline]
    pub fn new(event: &'a mut Event) -> Self {
        Self { event }
    }

    /// Runs `handler` if the event is a `T`.
    ///
    /// Returns whether the type matched. A handler returning `true` marks the
    /// event handled; returning `false` leaves the flag as it was.
    pub fn dispatch<T: EventVariant>(&mut self, handler: impl FnOnce(&T) -> bool) -> bool {
        let Some(payload) = T::narrow(self.event.kind()) else {
            return false;
        };

        let claimed = handler(payload);
        self.event.handled |= claimed;
        true
    }
}
