use crate::core::types::Minutes;
use std::time::Duration;

/// Hour of day at which minute 0 of the simulation falls.
pub const OPENING_HOUR: u32 = 11;

/// Monotone simulated clock, in minutes since opening.
///
/// The clock lives inside the shared world, so every read and write happens
/// under the world lock. Actors never set the time directly; they propose a
/// time and the clock keeps the larger of the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: Minutes,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self { now: 0 }
    }

    pub fn now(&self) -> Minutes {
        self.now
    }

    /// Move the clock to `max(now, proposed)` and return the new value
    pub fn advance_to(&mut self, proposed: Minutes) -> Minutes {
        if proposed > self.now {
            self.now = proposed;
        }
        self.now
    }
}

/// Render a simulated time as a wall clock stamp, e.g. `[1:05 pm]`
pub fn format_wall_clock(minutes: Minutes) -> String {
    let mut hour = OPENING_HOUR + minutes / 60;
    let minute = minutes % 60;
    let meridiem = if hour < 12 { 'a' } else { 'p' };
    if hour > 12 {
        hour -= 12;
    }
    format!("[{}:{:02} {}m]", hour, minute, meridiem)
}

/// Converts simulated minutes into real sleeping time.
///
/// A zero scale disables pacing entirely, which the tests use to run the
/// full protocol as fast as the scheduler allows.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    per_minute: Duration,
}

impl Pacer {
    pub fn new(per_minute: Duration) -> Self {
        Self { per_minute }
    }

    /// Block the calling thread for `minutes` of simulated time
    pub fn pause(&self, minutes: Minutes) {
        if self.per_minute.is_zero() || minutes == 0 {
            return;
        }
        std::thread::sleep(self.per_minute.saturating_mul(minutes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.advance_to(15), 15);
        assert_eq!(clock.advance_to(3), 15);
        assert_eq!(clock.advance_to(15), 15);
        assert_eq!(clock.advance_to(16), 16);
        assert_eq!(clock.now(), 16);
    }

    #[test]
    fn test_wall_clock_format() {
        assert_eq!(format_wall_clock(0), "[11:00 am]");
        assert_eq!(format_wall_clock(59), "[11:59 am]");
        assert_eq!(format_wall_clock(60), "[12:00 pm]");
        assert_eq!(format_wall_clock(125), "[1:05 pm]");
        assert_eq!(format_wall_clock(240), "[3:00 pm]");
        assert_eq!(format_wall_clock(241), "[3:01 pm]");
    }

    #[test]
    fn test_zero_scale_does_not_sleep() {
        let pacer = Pacer::new(Duration::ZERO);
        let started = std::time::Instant::now();
        pacer.pause(10_000);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
