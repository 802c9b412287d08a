use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("minimum wait ({min:?}) exceeds maximum wait ({max:?})")]
pub struct PacingError {
    pub min: Duration,
    pub max: Duration,
}

/// Randomized wait between two catalogue requests, drawn from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Result<Self, PacingError> {
        if min > max {
            return Err(PacingError { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn from_secs(min_seconds: u64, max_seconds: u64) -> Result<Self, PacingError> {
        Self::new(
            Duration::from_secs(min_seconds),
            Duration::from_secs(max_seconds),
        )
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws the next delay uniformly from `[min, max]`, at millisecond resolution.
    pub fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_window() {
        assert_eq!(
            Pacing::from_secs(10, 5),
            Err(PacingError {
                min: Duration::from_secs(10),
                max: Duration::from_secs(5),
            })
        );
    }

    #[test]
    fn test_delays_stay_in_window() {
        let pacing = Pacing::from_secs(150, 380).unwrap();
        for _ in 0..1_000 {
            let delay = pacing.next_delay();
            assert!(delay >= pacing.min() && delay <= pacing.max(), "{:?}", delay);
        }
    }

    #[test]
    fn test_degenerate_window() {
        let pacing = Pacing::from_secs(2, 2).unwrap();
        assert_eq!(pacing.next_delay(), Duration::from_secs(2));

        let none = Pacing::new(Duration::ZERO, Duration::ZERO).unwrap();
        assert_eq!(none.next_delay(), Duration::ZERO);
    }
}
