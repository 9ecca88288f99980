use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of recent frame times behind the panel's fps readout.
///
/// Holds the last `window` frames; older frames fall out as new ones arrive.
#[derive(Debug)]
pub struct FrameTimer {
    frames: VecDeque<Duration>,
    window: usize,
    total: Duration,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            frames: VecDeque::with_capacity(window),
            window,
            total: Duration::ZERO,
        }
    }

    pub fn record(&mut self, frame_time: Duration) {
        if self.frames.len() == self.window {
            if let Some(oldest) = self.frames.pop_front() {
                self.total -= oldest;
            }
        }
        self.frames.push_back(frame_time);
        self.total += frame_time;
    }

    /// Frames currently in the window.
    pub fn count(&self) -> usize {
        self.frames.len()
    }

    /// Mean frame time over the window, zero when empty.
    pub fn average(&self) -> Duration {
        match self.frames.len() {
            0 => Duration::ZERO,
            n => self.total / n as u32,
        }
    }

    /// Slowest frame in the window.
    pub fn max(&self) -> Duration {
        self.frames.iter().copied().max().unwrap_or_default()
    }

    /// Fastest frame in the window.
    pub fn min(&self) -> Duration {
        self.frames.iter().copied().min().unwrap_or_default()
    }

    /// Frames per second over the window. Zero before the first frame.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

impl Default for FrameTimer {
    /// Two seconds of frames at 60 Hz.
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn readout_is_zero_before_first_frame() {
        let timer = FrameTimer::default();
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.max(), Duration::ZERO);
    }

    #[test]
    fn steady_60hz_reads_60_fps() {
        let mut timer = FrameTimer::default();
        for _ in 0..300 {
            timer.record(Duration::from_micros(16_667));
        }
        assert_eq!(timer.count(), 120);
        assert!((timer.fps() - 60.0).abs() < 0.01);
    }

    #[test]
    fn hitch_shows_in_max_and_drags_fps_down() {
        let mut timer = FrameTimer::new(4);
        for frame in [ms(20), ms(20), ms(20), ms(100)] {
            timer.record(frame);
        }
        assert_eq!(timer.max(), ms(100));
        assert_eq!(timer.min(), ms(20));
        assert_eq!(timer.average(), ms(40));
        assert!((timer.fps() - 25.0).abs() < 1e-3);
    }

    #[test]
    fn hitch_leaves_the_window() {
        let mut timer = FrameTimer::new(3);
        timer.record(ms(100));
        for _ in 0..3 {
            timer.record(ms(10));
        }
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.max(), ms(10));
        assert!((timer.fps() - 100.0).abs() < 1e-3);
    }
}
