//! ### English
//! Host drawing surface seen from the render thread.
//!
//! Mirrors the lock / draw / unlock-and-post cycle of a platform surface holder. The surface is
//! moved onto the render thread when the view starts and dropped there when the loop ends.
//!
//! ### 中文
//! 渲染线程视角下的宿主绘制表面。
//!
//! 对应平台 surface holder 的 lock / draw / unlock-and-post 流程。view 启动时 surface 被移动到渲染线程，
//! 循环结束时在渲染线程上释放。

use dpi::PhysicalPosition;

use crate::engine::frame::FrameBuffer;

/// ### English
/// Drawable target supplied by the host on surface creation.
///
/// ### 中文
/// 宿主在 surface 创建时提供的可绘制目标。
pub trait Surface: Send + 'static {
    type Canvas<'a>: Canvas
    where
        Self: 'a;

    /// ### English
    /// Locks a canvas for one frame. Returns `None` once the surface has been torn down, which the
    /// render loop treats as its normal termination signal.
    ///
    /// ### 中文
    /// 为一帧锁定画布。surface 被销毁后返回 `None`，渲染循环将其视为正常结束信号。
    fn lock_canvas(&mut self) -> Option<Self::Canvas<'_>>;
}

/// ### English
/// One locked canvas. Must be posted exactly once; the render loop posts it even when the frame
/// was skipped so the host surface is never left locked.
///
/// ### 中文
/// 一个已锁定的画布。必须且只能 post 一次；即使该帧被跳过，渲染循环也会 post，保证宿主 surface 不会一直处于锁定状态。
pub trait Canvas {
    fn draw_frame(&mut self, frame: &FrameBuffer, origin: PhysicalPosition<i32>);

    fn unlock_and_post(self);
}
