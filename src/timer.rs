use std::time::{Duration, Instant};

/// Gates work that shall run at a fixed rate onto an externally driven
/// step loop.
///
/// The caller hands in the current point in time instead of the clock
/// reading it itself, which keeps the stepping logic testable without
/// real wall-clock waits.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// the pause between two granted ticks
    interval: Duration,
    /// the point in time of the last granted tick
    last: Instant,
}

impl Clock {
    /// Will create a clock that grants its first tick one `interval`
    /// after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Reports if the interval has elapsed and if so arms the next one.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now >= self.last + self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Represents a countdown timer inside of the chip infrastructure, it
/// counts down to zero from whatever number given, at 60Hz.
///
/// The decrement is driven externally by the timer clock, never by
/// instruction execution.
#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    value: u8,
}

impl Timer {
    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Counts down by one, saturating at zero.
    ///
    /// Reports if a decrement actually happened, which lets the caller
    /// couple the sound timer to the buzzer.
    pub fn decrement(&mut self) -> bool {
        if self.value > 0 {
            self.value -= 1;
            true
        } else {
            false
        }
    }
}
