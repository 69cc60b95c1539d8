use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use super::instrumentor::{record, ProfileResult};

fn origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

/// Small per-thread id, assigned on first use.
fn thread_id() -> u32 {
    static NEXT: AtomicU32 = AtomicU32::new(0);
    thread_local! {
        static ID: u32 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

/// Times a scope and reports it to the process-wide session when stopped or
/// dropped. Usually created through [`profile_scope!`](crate::profile_scope).
pub struct ProfileTimer {
    name: &'static str,
    start: Instant,
    stopped: bool,
}

impl ProfileTimer {
    pub fn new(name: &'static str) -> Self {
        let _ = origin();
        Self {
            name,
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Ends the scope now. Returns `None` if it was already stopped.
    pub fn stop(&mut self) -> Option<ProfileResult> {
        if self.stopped {
            return None;
        }
        self.stopped = true;

        let result = ProfileResult {
            name: self.name,
            start_us: self.start.saturating_duration_since(origin()).as_micros() as u64,
            duration_us: self.start.elapsed().as_micros() as u64,
            thread_id: thread_id(),
        };
        record(&result);
        Some(result)
    }
}

impl Drop for ProfileTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{begin_session, end_session};

    #[test]
    fn stop_reports_once() {
        let mut timer = ProfileTimer::new("once");
        let first = timer.stop();
        assert_eq!(first.map(|r| r.name), Some("once"));
        assert!(timer.stop().is_none());
    }

    #[test]
    fn threads_get_distinct_ids() {
        let here = thread_id();
        let there = std::thread::spawn(thread_id).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, thread_id());
    }

    #[test]
    fn later_timers_start_later() {
        let a = ProfileTimer::new("a").stop().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = ProfileTimer::new("b").stop().unwrap();
        assert!(b.start_us > a.start_us);
    }

    #[test]
    fn global_session_collects_dropped_scopes() {
        let path = std::env::temp_dir().join(format!("kiln-profile-{}.json", std::process::id()));
        begin_session("test", &path).unwrap();
        {
            crate::profile_scope!("global_session_collects_dropped_scopes");
        }
        end_session().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        let names: Vec<&str> = doc["traceEvents"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["name"].as_str())
            .collect();
        assert!(names.contains(&"global_session_collects_dropped_scopes"));
    }
}
