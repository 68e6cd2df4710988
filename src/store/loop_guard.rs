use std::collections::VecDeque;
use tokio::time::{Duration, Instant};

pub const LOOP_WINDOW: Duration = Duration::from_secs(10);
pub const LOOP_MAX_ATTEMPTS: usize = 10;

/// Sliding-window breaker against runaway refresh loops: at most
/// `max_attempts` fetches in any trailing `window`.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    window: Duration,
    max_attempts: usize,
    history: VecDeque<Instant>,
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self::new(LOOP_MAX_ATTEMPTS, LOOP_WINDOW)
    }
}

impl LoopGuard {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            window,
            max_attempts,
            history: VecDeque::with_capacity(max_attempts + 1),
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.history.front() {
            if now.duration_since(*oldest) >= self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records an attempt at `now`. Returns `false` (and records nothing)
    /// when the window is already full.
    pub fn register(&mut self, now: Instant) -> bool {
        self.prune(now);
        if self.history.len() >= self.max_attempts {
            return false;
        }
        self.history.push_back(now);
        true
    }

    pub fn recent_attempts(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.history.len()
    }
}
