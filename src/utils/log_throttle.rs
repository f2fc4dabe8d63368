use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Lets one log line through per interval and counts the ones it holds back.
///
/// Each loader owns one, so a UI that keeps re-fetching a failing endpoint
/// produces one warning per window instead of one per attempt.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    window: Mutex<Option<Window>>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            window: Mutex::new(None),
        }
    }

    /// Returns `Some(suppressed_count)` when the caller should log now,
    /// otherwise `None` and the event is counted against the active window.
    pub fn should_emit(&self) -> Option<u64> {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match window.as_mut() {
            Some(state) if now.duration_since(state.started_at) < self.interval => {
                state.suppressed += 1;
                None
            }
            Some(state) => {
                let suppressed = state.suppressed;
                state.started_at = now;
                state.suppressed = 0;
                Some(suppressed)
            }
            None => {
                *window = Some(Window {
                    started_at: now,
                    suppressed: 0,
                });
                Some(0)
            }
        }
    }

    /// Start over, e.g. after the endpoint recovered.
    pub fn reset(&self) {
        *self.window.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
