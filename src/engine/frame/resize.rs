//! ### English
//! Coalesced frame resize request (latest-wins). The host thread posts the target frame size and
//! the render thread drains it between frames.
//!
//! ### 中文
//! 合并的帧 resize 请求（latest-wins）：宿主线程投递目标帧尺寸，渲染线程在两帧之间 drain。

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use dpi::PhysicalSize;

#[repr(C, align(64))]
/// ### English
/// Keeps only the latest `(width, height)` until the render thread drains it.
///
/// ### 中文
/// 只保留最新的 `(width, height)`，等待渲染线程 drain。
pub(crate) struct CoalescedResize {
    /// ### English
    /// Pending flag (`0` = no pending resize, `1` = pending).
    ///
    /// ### 中文
    /// pending 标记（`0` = 无待处理 resize，`1` = 有待处理 resize）。
    pending: AtomicU8,
    _padding: [u8; 7],
    /// ### English
    /// Packed `(width, height)` as two `u32` values.
    ///
    /// ### 中文
    /// 将 `(width, height)` 以两个 `u32` 打包到一个 `u64` 中。
    packed_size: AtomicU64,
}

impl Default for CoalescedResize {
    fn default() -> Self {
        Self {
            pending: AtomicU8::new(0),
            _padding: [0; 7],
            packed_size: AtomicU64::new(0),
        }
    }
}

impl CoalescedResize {
    /// ### English
    /// Stores the latest target size and marks it pending.
    /// Returns `true` only for the first request since the last drain.
    ///
    /// ### 中文
    /// 写入最新的目标尺寸并标记为 pending。
    /// 仅在上次 drain 之后的第一次请求时返回 `true`。
    pub(crate) fn set(&self, size: PhysicalSize<u32>) -> bool {
        self.packed_size
            .store(pack_u32x2(size.width, size.height), Ordering::Relaxed);
        self.pending.swap(1, Ordering::Release) == 0
    }

    /// ### English
    /// Takes the latest size if pending.
    ///
    /// ### 中文
    /// 若处于 pending，则取出最新尺寸。
    pub(crate) fn take(&self) -> Option<PhysicalSize<u32>> {
        if self.pending.swap(0, Ordering::Acquire) == 0 {
            return None;
        }
        let (width, height) = unpack_u32x2(self.packed_size.load(Ordering::Relaxed));
        Some(PhysicalSize::new(width, height))
    }
}

#[inline]
fn pack_u32x2(width: u32, height: u32) -> u64 {
    (width as u64) | ((height as u64) << 32)
}

#[inline]
fn unpack_u32x2(packed: u64) -> (u32, u32) {
    (packed as u32, (packed >> 32) as u32)
}
