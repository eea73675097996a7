//! ### English
//! Render loop body: runs on the dedicated render thread until the surface goes away, the view
//! signals destruction, or the renderer keeps failing.
//!
//! ### 中文
//! 渲染循环主体：在独立渲染线程上运行，直到 surface 消失、view 发出销毁信号，或渲染器持续失败。

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use dpi::PhysicalPosition;
use log::{debug, error, info, warn};

use crate::engine::rendering::Renderer;
use crate::engine::surface::{Canvas, Surface};

use super::shared::{LoopExit, LoopShared};
use super::worker::RenderResources;

/// ### English
/// Runs iterations until an exit condition is met and returns the reason.
///
/// Per iteration: check surface flag → lock canvas → apply pending resize → render → blit →
/// count → post. A failed render skips blit and count but still posts the canvas. A panic in render
/// or blit posts the canvas and ends the loop with `LoopExit::Panicked`.
///
/// #### Parameters
/// - `shared`: Counters and control flags shared with the view.
/// - `resources`: Frame buffer and renderer owned by this thread while it runs.
/// - `surface`: Host surface moved onto this thread.
/// - `max_consecutive_failures`: Failure streak that stops the loop (`0` = never).
///
/// ### 中文
/// 持续执行迭代直到满足退出条件，并返回退出原因。
///
/// 每次迭代：检查 surface 标记 → 锁定画布 → 应用待处理 resize → 渲染 → blit → 计数 → post。
/// 渲染失败时跳过 blit 与计数，但仍会 post 画布。渲染或 blit 发生 panic 时会先 post 画布，
/// 再以 `LoopExit::Panicked` 结束循环。
///
/// #### 参数
/// - `shared`：与 view 共享的计数器与控制标记。
/// - `resources`：运行期间由本线程持有的帧缓冲与渲染器。
/// - `surface`：移动到本线程的宿主 surface。
/// - `max_consecutive_failures`：导致循环停止的连续失败次数（`0` = 永不）。
pub(super) fn run_render_loop<R: Renderer, S: Surface>(
    shared: &LoopShared,
    resources: &mut RenderResources<R>,
    surface: &mut S,
    max_consecutive_failures: u32,
) -> LoopExit {
    let origin = PhysicalPosition::new(0, 0);
    let mut consecutive_failures: u32 = 0;

    loop {
        if !shared.is_surface_alive() {
            return LoopExit::Stopped;
        }

        let Some(mut canvas) = surface.lock_canvas() else {
            return LoopExit::SurfaceLost;
        };

        if let Some(target) = shared.resize.take() {
            if resources.frame.resize(target) {
                debug!("frame buffer resized to {}x{}", target.width, target.height);
            }
        }

        let started = Instant::now();
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            let result = resources.renderer.render(&mut resources.frame);
            if result.is_ok() {
                canvas.draw_frame(&resources.frame, origin);
            }
            result
        }));
        let Ok(rendered) = rendered else {
            canvas.unlock_and_post();
            error!("render thread panicked mid-frame, canvas posted and loop stopped");
            return LoopExit::Panicked;
        };

        match rendered {
            Ok(()) => {
                shared.counters.record_frame(started.elapsed());
                canvas.unlock_and_post();

                if consecutive_failures > 0 {
                    info!("renderer recovered after {consecutive_failures} failed frame(s)");
                    consecutive_failures = 0;
                }
            }
            Err(err) => {
                canvas.unlock_and_post();
                shared.counters.record_failure();
                consecutive_failures = consecutive_failures.saturating_add(1);

                if consecutive_failures == 1 {
                    warn!("render failed, skipping frame: {err}");
                }
                if max_consecutive_failures != 0 && consecutive_failures >= max_consecutive_failures
                {
                    error!(
                        "render failed {consecutive_failures} times in a row, stopping loop: {err}"
                    );
                    return LoopExit::RendererFailed;
                }
            }
        }
    }
}
