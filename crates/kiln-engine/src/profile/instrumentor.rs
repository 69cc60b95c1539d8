use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde_json::json;

/// One finished scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResult {
    pub name: &'static str,
    /// Microseconds since the first timer of the process was created.
    pub start_us: u64,
    pub duration_us: u64,
    pub thread_id: u32,
}

struct Session {
    name: String,
    out: Box<dyn Write + Send>,
    events: usize,
}

/// Streams profile results of one session at a time into a Chrome trace
/// document.
///
/// The document is only valid JSON once [`end_session`](Self::end_session)
/// has written the closing brackets.
#[derive(Default)]
pub struct Instrumentor {
    session: Option<Session>,
}

impl Instrumentor {
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Starts a session writing to `out`. A session still open is ended
    /// first.
    pub fn begin_session(&mut self, name: impl Into<String>, mut out: Box<dyn Write + Send>) -> Result<()> {
        if let Some(current) = self.session.as_ref() {
            log::warn!("profile session \"{}\" still open, ending it", current.name);
            self.end_session()?;
        }

        out.write_all(br#"{"otherData":{},"traceEvents":["#)
            .context("failed to write trace header")?;

        let name = name.into();
        log::debug!("profile session \"{name}\" started");
        self.session = Some(Session { name, out, events: 0 });
        Ok(())
    }

    /// Closes the trace document. Without an open session this does nothing.
    pub fn end_session(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        session
            .out
            .write_all(b"]}")
            .and_then(|()| session.out.flush())
            .context("failed to finish trace")?;

        log::debug!("profile session \"{}\" ended, {} events", session.name, session.events);
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    /// Appends one complete event. Results arriving outside a session are
    /// dropped.
    pub fn write_profile(&mut self, result: &ProfileResult) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        if session.events > 0 {
            session.out.write_all(b",")?;
        }

        let event = json!({
            "cat": "function",
            "dur": result.duration_us,
            "name": result.name,
            "ph": "X",
            "pid": 0,
            "tid": result.thread_id,
            "ts": result.start_us,
        });
        serde_json::to_writer(&mut session.out, &event).context("failed to write trace event")?;
        session.events += 1;
        Ok(())
    }
}

impl Drop for Instrumentor {
    fn drop(&mut self) {
        if let Err(err) = self.end_session() {
            log::warn!("{err:#}");
        }
    }
}

// ── process-wide session ──────────────────────────────────────────────────

static GLOBAL: Mutex<Instrumentor> = Mutex::new(Instrumentor::new());
static ACTIVE: AtomicBool = AtomicBool::new(false);

fn global() -> MutexGuard<'static, Instrumentor> {
    GLOBAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Opens the process-wide session, writing to a new file at `path`.
pub fn begin_session(name: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create profile output {}", path.display()))?;

    let mut instrumentor = global();
    instrumentor.begin_session(name, Box::new(BufWriter::new(file)))?;
    ACTIVE.store(true, Ordering::Release);
    log::info!("profiling \"{name}\" into {}", path.display());
    Ok(())
}

/// Closes the process-wide session, if one is open.
pub fn end_session() -> Result<()> {
    let mut instrumentor = global();
    ACTIVE.store(false, Ordering::Release);
    instrumentor.end_session()
}

#[inline]
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::Acquire)
}

pub(super) fn record(result: &ProfileResult) {
    if !is_active() {
        return;
    }
    if let Err(err) = global().write_profile(result) {
        log::warn!("profile event dropped: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;

    /// Writer whose bytes stay readable after it is boxed away.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.0.lock().unwrap()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn result(name: &'static str, start_us: u64) -> ProfileResult {
        ProfileResult { name, start_us, duration_us: 5, thread_id: 1 }
    }

    // ── sessions ──────────────────────────────────────────────────────────

    #[test]
    fn session_produces_chrome_trace_document() {
        let buf = SharedBuf::default();
        let mut inst = Instrumentor::new();
        inst.begin_session("test", Box::new(buf.clone())).unwrap();
        inst.write_profile(&result("Renderer2D::flush", 10)).unwrap();
        inst.write_profile(&result("Renderer2D::end_scene", 20)).unwrap();
        inst.end_session().unwrap();

        let doc = buf.json();
        let events = doc["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["name"], "Renderer2D::flush");
        assert_eq!(events[0]["ph"], "X");
        assert_eq!(events[0]["ts"], 10);
        assert_eq!(events[0]["dur"], 5);
        assert_eq!(events[1]["tid"], 1);
    }

    #[test]
    fn empty_session_is_still_valid_json() {
        let buf = SharedBuf::default();
        let mut inst = Instrumentor::new();
        inst.begin_session("empty", Box::new(buf.clone())).unwrap();
        inst.end_session().unwrap();
        assert!(buf.json()["traceEvents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn results_outside_a_session_are_dropped() {
        let mut inst = Instrumentor::new();
        assert!(inst.write_profile(&result("idle", 0)).is_ok());
        assert!(inst.end_session().is_ok());
        assert!(!inst.is_active());
    }

    #[test]
    fn beginning_again_closes_previous_session() {
        let first = SharedBuf::default();
        let second = SharedBuf::default();
        let mut inst = Instrumentor::new();

        inst.begin_session("first", Box::new(first.clone())).unwrap();
        inst.write_profile(&result("a", 1)).unwrap();
        inst.begin_session("second", Box::new(second.clone())).unwrap();

        assert_eq!(first.json()["traceEvents"].as_array().unwrap().len(), 1);
        assert_eq!(inst.session_name(), Some("second"));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let buf = SharedBuf::default();
        let mut inst = Instrumentor::new();
        inst.begin_session("q", Box::new(buf.clone())).unwrap();
        inst.write_profile(&result("say \"hi\"", 0)).unwrap();
        inst.end_session().unwrap();
        assert_eq!(buf.json()["traceEvents"][0]["name"], "say \"hi\"");
    }

    #[test]
    fn drop_finishes_open_session() {
        let buf = SharedBuf::default();
        {
            let mut inst = Instrumentor::new();
            inst.begin_session("dropped", Box::new(buf.clone())).unwrap();
        }
        assert!(buf.json()["traceEvents"].is_array());
    }
}
