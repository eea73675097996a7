//! ### English
//! State shared between a `RenderView` (host thread), its render thread, and the telemetry timer.
//!
//! ### 中文
//! `RenderView`（宿主线程）、其渲染线程与遥测计时器之间共享的状态。

use std::sync::atomic::{AtomicU8, Ordering};

use crate::engine::cache::pad_after_n;
use crate::engine::frame::{CoalescedResize, FrameCounters};

const CONTROL_PAD_BYTES: usize = pad_after_n::<AtomicU8>(2);

const EXIT_NONE: u8 = 0;

/// ### English
/// Why the render loop returned.
///
/// ### 中文
/// 渲染循环返回的原因。
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// ### English
    /// Canvas acquisition returned nothing (host tore the surface down).
    ///
    /// ### 中文
    /// 获取画布失败（宿主已销毁 surface）。
    SurfaceLost = 1,
    /// ### English
    /// The view signalled surface-destroyed and the loop observed it at the top of an iteration.
    ///
    /// ### 中文
    /// view 发出 surface-destroyed 信号，循环在迭代开始处观察到。
    Stopped = 2,
    /// ### English
    /// Too many consecutive render failures.
    ///
    /// ### 中文
    /// 连续渲染失败次数过多。
    RendererFailed = 3,
    /// ### English
    /// The renderer or surface panicked on the render thread.
    ///
    /// ### 中文
    /// 渲染器或 surface 在渲染线程上 panic。
    Panicked = 4,
}

impl LoopExit {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(LoopExit::SurfaceLost),
            2 => Some(LoopExit::Stopped),
            3 => Some(LoopExit::RendererFailed),
            4 => Some(LoopExit::Panicked),
            _ => None,
        }
    }
}

#[repr(C, align(64))]
struct LoopControl {
    /// ### English
    /// Non-zero while the host surface exists (cleared by surface-destroyed).
    ///
    /// ### 中文
    /// 宿主 surface 存在时非 0（surface-destroyed 时清除）。
    surface_alive: AtomicU8,
    /// ### English
    /// `LoopExit` discriminant, or `0` while the loop has not exited.
    ///
    /// ### 中文
    /// `LoopExit` 判别值；循环未退出时为 `0`。
    exit: AtomicU8,
    _padding: [u8; CONTROL_PAD_BYTES],
}

#[repr(C)]
pub(crate) struct LoopShared {
    pub(crate) counters: FrameCounters,
    control: LoopControl,
    pub(crate) resize: CoalescedResize,
}

impl LoopShared {
    pub(crate) fn new() -> Self {
        Self {
            counters: FrameCounters::default(),
            control: LoopControl {
                surface_alive: AtomicU8::new(0),
                exit: AtomicU8::new(EXIT_NONE),
                _padding: [0; CONTROL_PAD_BYTES],
            },
            resize: CoalescedResize::default(),
        }
    }

    #[inline]
    pub(crate) fn set_surface_alive(&self, alive: bool) {
        self.control
            .surface_alive
            .store(u8::from(alive), Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_surface_alive(&self) -> bool {
        self.control.surface_alive.load(Ordering::Acquire) != 0
    }

    /// ### English
    /// Records the first exit reason; later calls are ignored.
    ///
    /// ### 中文
    /// 记录第一次退出原因；之后的调用被忽略。
    pub(crate) fn record_exit(&self, exit: LoopExit) {
        let _ = self.control.exit.compare_exchange(
            EXIT_NONE,
            exit as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    #[inline]
    pub(crate) fn exit(&self) -> Option<LoopExit> {
        LoopExit::from_u8(self.control.exit.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_exit_reason_sticks() {
        let shared = LoopShared::new();
        assert_eq!(shared.exit(), None);
        shared.record_exit(LoopExit::RendererFailed);
        shared.record_exit(LoopExit::Stopped);
        assert_eq!(shared.exit(), Some(LoopExit::RendererFailed));
    }

    #[test]
    fn surface_flag_round_trips() {
        let shared = LoopShared::new();
        assert!(!shared.is_surface_alive());
        shared.set_surface_alive(true);
        assert!(shared.is_surface_alive());
        shared.set_surface_alive(false);
        assert!(!shared.is_surface_alive());
    }
}
