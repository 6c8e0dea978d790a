use crate::domain::ports::Pacer;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(1);

/// Sleeps a fixed interval after every remote call.
#[derive(Debug, Clone, Copy)]
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedIntervalPacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_for_interval() {
        let pacer = FixedIntervalPacer::new(Duration::from_millis(1000));
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_returns_immediately() {
        let pacer = FixedIntervalPacer::new(Duration::ZERO);
        let start = Instant::now();
        pacer.pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_default_interval_is_one_second() {
        assert_eq!(FixedIntervalPacer::default().interval(), Duration::from_secs(1));
    }
}
