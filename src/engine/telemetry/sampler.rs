//! ### English
//! FPS / load computation from two successive counter snapshots.
//!
//! ### 中文
//! 基于两次相邻计数器快照计算 FPS / 负载。

use std::fmt;
use std::time::{Duration, Instant};

use crate::engine::frame::FrameCountersSnapshot;

/// ### English
/// Added to every elapsed-time denominator so a zero interval still yields finite values.
///
/// ### 中文
/// 加到所有耗时分母上，保证零间隔时结果仍为有限值。
const ELAPSED_EPSILON: Duration = Duration::from_nanos(1);

/// ### English
/// One derived telemetry reading.
///
/// ### 中文
/// 一次推导出的遥测读数。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TelemetrySample {
    /// ### English
    /// Frames per second since the previous sample.
    ///
    /// ### 中文
    /// 自上一次采样以来的每秒帧数。
    pub fps: f64,
    /// ### English
    /// Render time divided by wall time since the first sample (a utilization ratio).
    ///
    /// ### 中文
    /// 渲染耗时除以自首次采样以来的墙钟时间（利用率）。
    pub load_ratio: f64,
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FPS: {:.2}, Load: {:.2}", self.fps, self.load_ratio)
    }
}

/// ### English
/// Stateful sampler: remembers the first sample time and the previous snapshot.
///
/// Time is injected by the caller so the arithmetic stays deterministic under test.
///
/// ### 中文
/// 有状态采样器：记住首次采样时间与上一次快照。
///
/// 时间由调用方注入，保证测试下计算结果确定。
#[derive(Clone, Debug)]
pub struct TelemetrySampler {
    first_at: Instant,
    baseline_render_time: Duration,
    prev_at: Instant,
    prev_draw_count: u64,
}

impl TelemetrySampler {
    /// ### English
    /// Starts sampling at `now` with `baseline` as the first snapshot.
    ///
    /// ### 中文
    /// 以 `now` 为起点、`baseline` 为首个快照开始采样。
    pub fn new(now: Instant, baseline: FrameCountersSnapshot) -> Self {
        Self {
            first_at: now,
            baseline_render_time: baseline.render_time,
            prev_at: now,
            prev_draw_count: baseline.draw_count,
        }
    }

    /// ### English
    /// Computes a sample for `snapshot` taken at `now` and advances the previous-sample state.
    ///
    /// ### 中文
    /// 针对 `now` 时刻的 `snapshot` 计算一次采样，并推进“上一次采样”状态。
    pub fn sample_at(&mut self, now: Instant, snapshot: FrameCountersSnapshot) -> TelemetrySample {
        let since_prev = now.saturating_duration_since(self.prev_at) + ELAPSED_EPSILON;
        let since_first = now.saturating_duration_since(self.first_at) + ELAPSED_EPSILON;

        let frames = snapshot.draw_count.saturating_sub(self.prev_draw_count);
        let busy = snapshot
            .render_time
            .saturating_sub(self.baseline_render_time);

        self.prev_at = now;
        self.prev_draw_count = snapshot.draw_count;

        TelemetrySample {
            fps: frames as f64 / since_prev.as_secs_f64(),
            load_ratio: busy.as_secs_f64() / since_first.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn snapshot(draw_count: u64, render_ms: u64) -> FrameCountersSnapshot {
        FrameCountersSnapshot {
            draw_count,
            render_time: Duration::from_millis(render_ms),
            failed_frames: 0,
        }
    }

    #[test]
    fn thirty_frames_in_one_second_is_thirty_fps() {
        let t0 = Instant::now();
        let mut sampler = TelemetrySampler::new(t0, snapshot(0, 0));

        let sample = sampler.sample_at(t0 + Duration::from_secs(1), snapshot(30, 500));
        assert_relative_eq!(sample.fps, 30.0, epsilon = 1e-6);
        assert_relative_eq!(sample.load_ratio, 0.5, epsilon = 1e-6);
        assert_eq!(sample.to_string(), "FPS: 30.00, Load: 0.50");
    }

    #[test]
    fn fps_uses_the_previous_sample_and_load_uses_the_first() {
        let t0 = Instant::now();
        let mut sampler = TelemetrySampler::new(t0, snapshot(0, 0));
        sampler.sample_at(t0 + Duration::from_secs(1), snapshot(60, 250));

        let sample = sampler.sample_at(t0 + Duration::from_secs(2), snapshot(80, 1000));
        assert_relative_eq!(sample.fps, 20.0, epsilon = 1e-6);
        assert_relative_eq!(sample.load_ratio, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_elapsed_time_stays_finite() {
        let t0 = Instant::now();
        let mut sampler = TelemetrySampler::new(t0, snapshot(0, 0));

        let idle = sampler.sample_at(t0, snapshot(0, 0));
        assert_eq!(idle.fps, 0.0);
        assert_eq!(idle.load_ratio, 0.0);

        let burst = sampler.sample_at(t0, snapshot(5, 1));
        assert!(burst.fps.is_finite());
        assert!(burst.load_ratio.is_finite());
    }

    #[test]
    fn late_start_subtracts_the_baseline() {
        let t0 = Instant::now();
        let mut sampler = TelemetrySampler::new(t0, snapshot(1000, 9000));

        let sample = sampler.sample_at(t0 + Duration::from_secs(1), snapshot(1030, 9100));
        assert_relative_eq!(sample.fps, 30.0, epsilon = 1e-6);
        assert_relative_eq!(sample.load_ratio, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn clock_going_backwards_is_clamped() {
        let t0 = Instant::now() + Duration::from_secs(5);
        let mut sampler = TelemetrySampler::new(t0, snapshot(0, 0));
        let sample = sampler.sample_at(t0 - Duration::from_secs(1), snapshot(0, 0));
        assert_eq!(sample, TelemetrySample::default());
    }
}
