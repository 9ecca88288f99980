use std::time::{Duration, Instant};

/// Wall-clock source for the shader's time uniform.
#[derive(Debug, Clone, Copy)]
pub struct SceneClock {
    start: Instant,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start: Instant) -> Self {
        Self { start }
    }

    /// Seconds since the clock started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed_at(Instant::now())
    }

    /// Seconds between the start and `now`. Zero if `now` is earlier.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a frame delta so a stalled frame does not fling the camera.
pub fn frame_delta(last: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(last).min(Duration::from_millis(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_measures_from_start() {
        let start = Instant::now();
        let clock = SceneClock::started_at(start);
        let later = start + Duration::from_millis(1500);
        assert!((clock.elapsed_at(later) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn elapsed_never_negative() {
        let start = Instant::now() + Duration::from_secs(5);
        let clock = SceneClock::started_at(start);
        assert_eq!(clock.elapsed_at(Instant::now()), 0.0);
    }

    #[test]
    fn frame_delta_is_capped() {
        let last = Instant::now();
        assert_eq!(
            frame_delta(last, last + Duration::from_secs(2)),
            Duration::from_millis(100)
        );
        assert_eq!(
            frame_delta(last, last + Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }
}
