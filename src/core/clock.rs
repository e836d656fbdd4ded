//! Host time source

use chrono::Utc;

/// Expiry used when a request does not specify one (year 5138).
pub const FOREVER: u64 = 99_999_999_999;

/// Supplies the current timestamp (unix seconds) to expiry checks.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_before_forever() {
        let now = SystemClock.now();
        assert!(now > 1_600_000_000);
        assert!(now < FOREVER);
    }
}
