//! ### English
//! Minimal spin-then-yield backoff helper for lock-free read retries.
//!
//! - Spin briefly to cover the render thread's short write window.
//! - Yield after the spin budget to avoid burning CPU on oversubscribed systems.
//!
//! ### 中文
//! 为无锁读重试提供的“短自旋 + 让出调度”退避工具。
//!
//! - 先短暂自旋，覆盖渲染线程较短的写入窗口；
//! - 超过自旋预算后调用 `yield`，避免在 CPU 过载时空转占满。

use std::thread;

/// ### English
/// Spin budget before switching to `yield_now()`.
///
/// ### 中文
/// 在切换到 `yield_now()` 之前允许的自旋次数预算。
const SPIN_LIMIT: u32 = 64;

/// ### English
/// Spin-then-yield backoff state.
///
/// ### 中文
/// “短自旋 + 让出调度”的退避状态。
pub(crate) struct Backoff {
    spins: u32,
}

impl Backoff {
    #[inline]
    pub(crate) fn new() -> Self {
        Self { spins: 0 }
    }

    /// ### English
    /// Performs one backoff step.
    ///
    /// ### 中文
    /// 执行一次退避步骤。
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.spins < SPIN_LIMIT {
            std::hint::spin_loop();
        } else {
            thread::yield_now();
        }
        self.spins = self.spins.wrapping_add(1);
    }
}

