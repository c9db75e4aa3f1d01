use rand::rngs::OsRng;
use rand::Rng;
use scout_config::DelayRange;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Default)]
/// Produces human-like pauses to reduce automation signals.
pub struct BehavioralEngine {}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Pick a duration between `min` and `max` milliseconds (either order).
    pub fn pick_delay(&self, min: u64, max: u64) -> Duration {
        let (lo, hi) = DelayRange(min, max).bounds();
        Duration::from_millis(OsRng.gen_range(lo..=hi))
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        sleep(self.pick_delay(min, max)).await;
    }

    /// Sleep for a random duration drawn from a configured range.
    pub async fn delay_in(&self, range: DelayRange) -> Duration {
        let (lo, hi) = range.bounds();
        let pause = self.pick_delay(lo, hi);
        sleep(pause).await;
        pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_delays_stay_in_range() {
        let engine = BehavioralEngine::new();
        for _ in 0..100 {
            let d = engine.pick_delay(4000, 2000).as_millis();
            assert!((2000..=4000).contains(&d));
        }
        assert_eq!(engine.pick_delay(7, 7), Duration::from_millis(7));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_in_sleeps_for_the_returned_duration() {
        let engine = BehavioralEngine::new();
        let started = tokio::time::Instant::now();
        let pause = engine.delay_in(DelayRange(50, 80)).await;
        assert!(started.elapsed() >= pause);
        assert!((50..=80).contains(&pause.as_millis()));
    }
}
