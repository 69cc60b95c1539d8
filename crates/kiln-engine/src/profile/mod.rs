//! Scope profiler writing Chrome trace JSON, viewable in `chrome://tracing`
//! or Perfetto.
//!
//! A process-wide session is opened with [`begin_session`] and closed with
//! [`end_session`]. While it is open, every [`ProfileTimer`] that finishes on
//! any thread appends one complete (`"ph": "X"`) event. Outside a session a
//! timer costs two `Instant::now` calls and an atomic load.
//!
//! ```ignore
//! kiln_engine::profile::begin_session("Startup", "kiln-startup.json")?;
//! {
//!     kiln_engine::profile_scope!("load assets");
//!     // ...
//! }
//! kiln_engine::profile::end_session()?;
//! ```

mod instrumentor;
mod timer;

pub use instrumentor::{begin_session, end_session, is_active, Instrumentor, ProfileResult};
pub use timer::ProfileTimer;

/// Times the rest of the enclosing block under `name`.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_timer = $crate::profile::ProfileTimer::new($name);
    };
}
