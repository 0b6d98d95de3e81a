//! Per-frame wall-clock timing and periodic FPS reporting.
//!
//! The simulation clock is driven by real elapsed time, so one stalled frame
//! (window drag, breakpoint) would otherwise jump the orbits forward by however
//! long the stall lasted. Frame times are clamped to [`MAX_FRAME_TIME`].

use std::time::Instant;
use tracing::warn;

/// Longest frame fed to the simulation, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// FPS over the last reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    pub fps: f64,
    pub frames: u64,
    /// Wall seconds the report covers.
    pub window_s: f64,
}

/// Outcome of one [`FrameStats::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Clamped frame time in seconds.
    pub dt: f64,
    /// Set once every reporting interval.
    pub report: Option<FpsReport>,
}

pub struct FrameStats {
    previous_time: Instant,
    report_interval: f64,
    window_time: f64,
    window_frames: u64,
    frame_count: u64,
}

impl FrameStats {
    /// `report_interval_s <= 0` disables reports.
    pub fn new(report_interval_s: f64) -> Self {
        Self {
            previous_time: Instant::now(),
            report_interval: report_interval_s,
            window_time: 0.0,
            window_frames: 0,
            frame_count: 0,
        }
    }

    /// Measure the time since the previous tick.
    pub fn tick(&mut self) -> FrameTick {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.tick_with(frame_time)
    }

    /// Advance by an explicit frame time.
    pub fn tick_with(&mut self, frame_time: f64) -> FrameTick {
        let dt = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time.max(0.0)
        };

        self.frame_count += 1;
        self.window_frames += 1;
        // Unclamped: stalls show up in the FPS.
        self.window_time += frame_time.max(0.0);

        let report = if self.report_interval > 0.0 && self.window_time >= self.report_interval {
            let report = FpsReport {
                fps: self.window_frames as f64 / self.window_time,
                frames: self.window_frames,
                window_s: self.window_time,
            };
            self.window_time = 0.0;
            self.window_frames = 0;
            Some(report)
        } else {
            None
        };

        FrameTick { dt, report }
    }

    /// Frames ticked since creation.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dt_passes_through() {
        let mut stats = FrameStats::new(5.0);
        let tick = stats.tick_with(1.0 / 60.0);
        assert!((tick.dt - 1.0 / 60.0).abs() < 1e-12);
        assert!(tick.report.is_none());
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut stats = FrameStats::new(5.0);
        assert_eq!(stats.tick_with(3.0).dt, MAX_FRAME_TIME);
    }

    #[test]
    fn test_negative_frame_time_is_zero() {
        let mut stats = FrameStats::new(5.0);
        assert_eq!(stats.tick_with(-0.01).dt, 0.0);
    }

    #[test]
    fn test_report_after_interval() {
        let mut stats = FrameStats::new(1.0);
        let mut reports = Vec::new();
        for _ in 0..8 {
            if let Some(report) = stats.tick_with(0.25).report {
                reports.push(report);
            }
        }
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].frames, 4);
        assert!((reports[0].fps - 4.0).abs() < 1e-12);
        assert_eq!(stats.frame_count(), 8);
    }

    #[test]
    fn test_stall_lowers_reported_fps() {
        let mut stats = FrameStats::new(1.0);
        let report = stats.tick_with(2.0).report.unwrap();
        assert_eq!(report.frames, 1);
        assert!((report.fps - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_interval_never_reports() {
        let mut stats = FrameStats::new(0.0);
        for _ in 0..10 {
            assert!(stats.tick_with(1.0).report.is_none());
        }
    }
}
