//! ### English
//! Per-view frame counters written by the render thread and read by the telemetry sampler.
//!
//! A single-writer sequence counter makes every snapshot a consistent `(draw_count, render_time)`
//! pair without taking a lock on the render thread.
//!
//! ### 中文
//! 由渲染线程写入、遥测采样器读取的每 view 帧计数器。
//!
//! 单写者序列计数器保证每次快照都是一致的 `(draw_count, render_time)` 对，渲染线程无需加锁。

use std::sync::atomic::{AtomicU64, Ordering, fence};
use std::time::Duration;

use crate::engine::cache::pad_after_n;
use crate::engine::lockfree::Backoff;

const COUNTER_FIELDS: usize = 4;
const COUNTERS_PAD_BYTES: usize = pad_after_n::<AtomicU64>(COUNTER_FIELDS);

/// ### English
/// One consistent read of `FrameCounters`.
///
/// ### 中文
/// `FrameCounters` 的一次一致性读取结果。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCountersSnapshot {
    /// ### English
    /// Frames rendered and presented successfully.
    ///
    /// ### 中文
    /// 成功渲染并提交的帧数。
    pub draw_count: u64,
    /// ### English
    /// Sum of the measured render+blit durations of those frames.
    ///
    /// ### 中文
    /// 上述帧测得的渲染 + blit 耗时总和。
    pub render_time: Duration,
    /// ### English
    /// Render calls that reported failure (skipped frames).
    ///
    /// ### 中文
    /// 渲染调用失败（被跳过）的帧数。
    pub failed_frames: u64,
}

#[repr(C, align(64))]
/// ### English
/// Lock-free frame counters (single writer: the render thread).
///
/// ### 中文
/// 无锁帧计数器（单写者：渲染线程）。
pub struct FrameCounters {
    /// ### English
    /// Sequence counter: odd while the writer is mid-update.
    ///
    /// ### 中文
    /// 序列计数器：写者更新过程中为奇数。
    seq: AtomicU64,
    draw_count: AtomicU64,
    render_nanos: AtomicU64,
    failed_frames: AtomicU64,
    _padding: [u8; COUNTERS_PAD_BYTES],
}

impl Default for FrameCounters {
    fn default() -> Self {
        Self {
            seq: AtomicU64::new(0),
            draw_count: AtomicU64::new(0),
            render_nanos: AtomicU64::new(0),
            failed_frames: AtomicU64::new(0),
            _padding: [0; COUNTERS_PAD_BYTES],
        }
    }
}

impl FrameCounters {
    /// ### English
    /// Records one successfully presented frame that took `elapsed`.
    ///
    /// Only the render thread may call this (single writer).
    ///
    /// ### 中文
    /// 记录一帧成功提交的帧及其耗时 `elapsed`。
    ///
    /// 只能由渲染线程调用（单写者）。
    pub(crate) fn record_frame(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.write(|| {
            let draws = self.draw_count.load(Ordering::Relaxed);
            self.draw_count.store(draws + 1, Ordering::Relaxed);
            let total = self.render_nanos.load(Ordering::Relaxed);
            self.render_nanos
                .store(total.saturating_add(nanos), Ordering::Relaxed);
        });
    }

    /// ### English
    /// Records one failed (skipped) render call.
    ///
    /// ### 中文
    /// 记录一次失败（被跳过）的渲染调用。
    pub(crate) fn record_failure(&self) {
        self.write(|| {
            let failed = self.failed_frames.load(Ordering::Relaxed);
            self.failed_frames.store(failed + 1, Ordering::Relaxed);
        });
    }

    #[inline]
    fn write(&self, update: impl FnOnce()) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        update();
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// ### English
    /// Reads a consistent snapshot. Never blocks the writer; retries with backoff while a write is
    /// in progress.
    ///
    /// ### 中文
    /// 读取一致性快照。从不阻塞写者；写入进行中时带退避重试。
    pub fn snapshot(&self) -> FrameCountersSnapshot {
        let mut backoff = Backoff::new();
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                backoff.snooze();
                continue;
            }

            let draw_count = self.draw_count.load(Ordering::Relaxed);
            let render_nanos = self.render_nanos.load(Ordering::Relaxed);
            let failed_frames = self.failed_frames.load(Ordering::Relaxed);

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return FrameCountersSnapshot {
                    draw_count,
                    render_time: Duration::from_nanos(render_nanos),
                    failed_frames,
                };
            }
            backoff.snooze();
        }
    }

    /// ### English
    /// Relaxed read of the frame count alone (no pairing guarantee needed).
    ///
    /// ### 中文
    /// 仅读取帧数的 Relaxed 读取（无需配对一致性）。
    #[inline]
    pub fn draw_count(&self) -> u64 {
        self.draw_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    use super::*;

    #[test]
    fn counts_each_recorded_frame_once() {
        let counters = FrameCounters::default();
        let durations = [3u64, 5, 7, 11, 13];
        for nanos in durations {
            counters.record_frame(Duration::from_nanos(nanos));
        }
        counters.record_failure();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.draw_count, durations.len() as u64);
        assert_eq!(
            snapshot.render_time,
            Duration::from_nanos(durations.iter().sum())
        );
        assert_eq!(snapshot.failed_frames, 1);
        assert_eq!(counters.draw_count(), 5);
    }

    #[test]
    fn layout_fills_one_cache_line() {
        assert_eq!(std::mem::size_of::<FrameCounters>(), 64);
        assert_eq!(std::mem::align_of::<FrameCounters>(), 64);
    }

    #[test]
    fn concurrent_snapshots_are_never_torn() {
        const FRAMES: u64 = 200_000;
        const NANOS_PER_FRAME: u64 = 3;

        let counters = Arc::new(FrameCounters::default());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let counters = counters.clone();
            let done = done.clone();
            thread::spawn(move || {
                for _ in 0..FRAMES {
                    counters.record_frame(Duration::from_nanos(NANOS_PER_FRAME));
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut last = FrameCountersSnapshot::default();
        while !done.load(Ordering::Acquire) {
            let snapshot = counters.snapshot();
            assert_eq!(
                snapshot.render_time.as_nanos() as u64,
                snapshot.draw_count * NANOS_PER_FRAME
            );
            assert!(snapshot.draw_count >= last.draw_count);
            assert!(snapshot.render_time >= last.render_time);
            last = snapshot;
        }
        writer.join().unwrap();

        assert_eq!(counters.snapshot().draw_count, FRAMES);
    }
}
