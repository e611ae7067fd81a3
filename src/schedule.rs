// schedule.rs

use std::time::Instant;

pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

/// Wall clock counted from when the firmware started.
#[derive(Clone, Copy, Debug)]
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Uptime {
            started: Instant::now(),
        }
    }
}

impl Clock for Uptime {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Next time the device-status record is due.
///
/// The deadline moves forward from the time it actually fired, so a slow loop pass
/// pushes every later emission back by the same amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthSchedule {
    next_due_ms: u64,
    period_ms: u64,
}

impl HealthSchedule {
    pub fn starting_at(now_ms: u64, period_ms: u64) -> Self {
        HealthSchedule {
            next_due_ms: now_ms.saturating_add(period_ms),
            period_ms,
        }
    }

    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    pub fn advance(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms.saturating_add(self.period_ms);
    }
}


// EOF
