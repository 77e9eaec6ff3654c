use std::time::Duration;

/// Bounded exponential delay between retries after failed reads.
pub struct BackoffController {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl BackoffController {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial = Duration::from_millis(initial_ms.max(1));
        let max = Duration::from_millis(max_ms.max(initial_ms.max(1)));
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Record a failure and return how long to wait before the next read.
    pub fn mark_failure(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Reset after a telegram came through.
    pub fn mark_success(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_max() {
        let mut backoff = BackoffController::new(100, 350);
        assert_eq!(backoff.mark_failure(), Duration::from_millis(100));
        assert_eq!(backoff.mark_failure(), Duration::from_millis(200));
        assert_eq!(backoff.mark_failure(), Duration::from_millis(350));
        assert_eq!(backoff.mark_failure(), Duration::from_millis(350));
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = BackoffController::new(10, 1000);
        backoff.mark_failure();
        backoff.mark_failure();
        backoff.mark_success();
        assert_eq!(backoff.mark_failure(), Duration::from_millis(10));
    }

    #[test]
    fn test_backoff_zero_values_are_clamped() {
        let mut backoff = BackoffController::new(0, 0);
        assert_eq!(backoff.mark_failure(), Duration::from_millis(1));
        assert_eq!(backoff.mark_failure(), Duration::from_millis(1));
    }
}
