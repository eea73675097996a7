//! ### English
//! Bitflags controlling optional view behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask and folded into `RenderViewConfig`.
//!
//! ### 中文
//! 控制 view 可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入，并合并进 `RenderViewConfig`。

use super::config::RenderViewConfig;

/// ### English
/// Resize the frame buffer to `min(width, height)` squared on every surface change.
///
/// The native renderer must then accept buffers of any square size.
///
/// ### 中文
/// 每次 surface 尺寸变化时，将帧缓冲调整为 `min(width, height)` 的正方形。
///
/// 此时原生渲染器必须能接受任意正方形尺寸的缓冲区。
pub const COMPUTE_VIEW_FLAG_RESIZE_ON_SURFACE_CHANGE: u32 = 1 << 0;

/// ### English
/// Never stop the render loop because of render failures (failed frames are only skipped and counted).
///
/// ### 中文
/// 永不因渲染失败停止循环（失败帧仅跳过并计数）。
pub const COMPUTE_VIEW_FLAG_NO_FAILURE_ESCALATION: u32 = 1 << 1;

/// ### English
/// Applies a C ABI flag mask on top of `config`.
///
/// ### 中文
/// 将 C ABI 位掩码叠加到 `config` 上。
pub fn apply_view_flags(config: &mut RenderViewConfig, view_flags: u32) {
    if (view_flags & COMPUTE_VIEW_FLAG_RESIZE_ON_SURFACE_CHANGE) != 0 {
        config.frame.resize_on_surface_change = true;
    }
    if (view_flags & COMPUTE_VIEW_FLAG_NO_FAILURE_ESCALATION) != 0 {
        config.render.max_consecutive_failures = 0;
    }
}
