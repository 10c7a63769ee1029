use std::time::{Duration, Instant};

/// Keeps a loop running at a fixed wall-clock rate
pub struct FixedRate {
    period: Duration,
    last_update_time: Instant,
}

impl FixedRate {
    pub fn hz(rate: u32) -> Self {
        FixedRate {
            period: Duration::from_secs(1) / rate.max(1),
            last_update_time: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Simulation time step matching the pacing period
    pub fn dt(&self) -> f64 {
        self.period.as_secs_f64()
    }

    /// Sleep out whatever is left of the current period
    pub fn wait(&mut self) {
        let elapsed = self.last_update_time.elapsed();
        if elapsed < self.period {
            std::thread::sleep(self.period - elapsed);
        }
        self.last_update_time = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        assert_eq!(FixedRate::hz(20).period(), Duration::from_millis(50));
        assert!((FixedRate::hz(10).dt() - 0.1).abs() < 1e-12);
        assert_eq!(FixedRate::hz(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_wait_holds_the_period() {
        let mut pacer = FixedRate::hz(100);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
