//! ### English
//! Latest published telemetry sample (latest-wins), readable from any thread.
//!
//! ### 中文
//! 最近一次发布的遥测采样（latest-wins），可从任意线程读取。

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use super::sampler::TelemetrySample;

#[repr(C, align(64))]
/// ### English
/// Stores `(fps, load_ratio)` as two `f32` values packed into one `u64`, so a reader never sees a
/// value from one sample paired with a value from another.
///
/// ### 中文
/// 将 `(fps, load_ratio)` 以两个 `f32` 打包进一个 `u64`，读端不会看到来自不同采样的混合值。
pub(crate) struct LatestSample {
    /// ### English
    /// `0` until the first sample is published.
    ///
    /// ### 中文
    /// 首次发布采样前为 `0`。
    present: AtomicU8,
    _padding: [u8; 7],
    packed: AtomicU64,
}

impl Default for LatestSample {
    fn default() -> Self {
        Self {
            present: AtomicU8::new(0),
            _padding: [0; 7],
            packed: AtomicU64::new(0),
        }
    }
}

impl LatestSample {
    pub(crate) fn publish(&self, sample: TelemetrySample) {
        self.packed.store(
            pack_f32x2(sample.fps as f32, sample.load_ratio as f32),
            Ordering::Relaxed,
        );
        self.present.store(1, Ordering::Release);
    }

    pub(crate) fn load(&self) -> Option<TelemetrySample> {
        if self.present.load(Ordering::Acquire) == 0 {
            return None;
        }
        let (fps, load_ratio) = unpack_f32x2(self.packed.load(Ordering::Relaxed));
        Some(TelemetrySample {
            fps: f64::from(fps),
            load_ratio: f64::from(load_ratio),
        })
    }
}

#[inline]
fn pack_f32x2(a: f32, b: f32) -> u64 {
    (a.to_bits() as u64) | ((b.to_bits() as u64) << 32)
}

#[inline]
fn unpack_f32x2(packed: u64) -> (f32, f32) {
    (
        f32::from_bits(packed as u32),
        f32::from_bits((packed >> 32) as u32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_first_publish() {
        let latest = LatestSample::default();
        assert_eq!(latest.load(), None);

        latest.publish(TelemetrySample {
            fps: 60.0,
            load_ratio: 0.25,
        });
        assert_eq!(
            latest.load().map(|sample| sample.to_string()).as_deref(),
            Some("FPS: 60.00, Load: 0.25")
        );
    }

    #[test]
    fn latest_publish_wins() {
        let latest = LatestSample::default();
        latest.publish(TelemetrySample {
            fps: 10.0,
            load_ratio: 0.5,
        });
        latest.publish(TelemetrySample {
            fps: 30.0,
            load_ratio: 0.75,
        });
        assert_eq!(
            latest.load(),
            Some(TelemetrySample {
                fps: 30.0,
                load_ratio: 0.75,
            })
        );
    }
}
