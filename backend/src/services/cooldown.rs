//! Advisory command cooldown.
//!
//! After a slew or an abort the caller suppresses repeated motion commands
//! for a short interval. This is flood control at the boundary only; the
//! controller itself never waits on it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Per-command cooldown tracker.
pub struct CommandGate {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<&'static str, Instant>>,
}

impl CommandGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Accept `command` unless it was accepted less than one cooldown ago.
    ///
    /// On refusal returns the time left before the command is accepted again.
    pub fn try_acquire(&self, command: &'static str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut last = self.last_accepted.lock();
        if let Some(at) = last.get(command) {
            let elapsed = now.duration_since(*at);
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }
        last.insert(command, now);
        Ok(())
    }
}
