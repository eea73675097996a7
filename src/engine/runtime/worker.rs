//! ### English
//! Owned render worker: spawns the dedicated render thread and hands the frame buffer and renderer
//! back on join.
//!
//! ### 中文
//! 持有型渲染 worker：创建独立渲染线程，并在 join 时交还帧缓冲与渲染器。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::{error, info};

use crate::engine::error::RenderError;
use crate::engine::frame::FrameBuffer;
use crate::engine::rendering::Renderer;
use crate::engine::surface::Surface;

use super::render_loop::run_render_loop;
use super::shared::{LoopExit, LoopShared};

/// ### English
/// Everything the render thread owns while it runs.
///
/// ### 中文
/// 渲染线程运行期间持有的全部资源。
pub struct RenderResources<R> {
    pub frame: FrameBuffer,
    pub renderer: R,
}

/// ### English
/// Handle to one running render thread.
///
/// Building a worker consumes the `RenderResources`, so a view can never have two live workers.
/// Dropping the worker stops and joins the thread.
///
/// ### 中文
/// 单个运行中渲染线程的句柄。
///
/// 创建 worker 会消耗 `RenderResources`，因此一个 view 不可能同时存在两个活跃 worker。
/// drop worker 时会停止并 join 线程。
pub struct RenderWorker<R: Renderer> {
    shared: Arc<LoopShared>,
    /// ### English
    /// Join handle; yields the resources back unless the thread panicked.
    ///
    /// ### 中文
    /// join handle；除非线程 panic，否则会交还资源。
    thread: Option<thread::JoinHandle<Option<RenderResources<R>>>>,
}

impl<R: Renderer> RenderWorker<R> {
    /// ### English
    /// Marks the surface alive and spawns the render thread.
    ///
    /// #### Parameters
    /// - `thread_name`: OS thread name.
    /// - `shared`: Counters and control flags shared with the view.
    /// - `resources`: Frame buffer and initialized renderer, moved onto the thread.
    /// - `surface`: Host surface, moved onto the thread.
    /// - `max_consecutive_failures`: Failure streak that stops the loop (`0` = never).
    ///
    /// ### 中文
    /// 标记 surface 存活并创建渲染线程。
    ///
    /// #### 参数
    /// - `thread_name`：系统线程名。
    /// - `shared`：与 view 共享的计数器与控制标记。
    /// - `resources`：帧缓冲与已初始化的渲染器，移动到线程中。
    /// - `surface`：宿主 surface，移动到线程中。
    /// - `max_consecutive_failures`：导致循环停止的连续失败次数（`0` = 永不）。
    pub(crate) fn start<S: Surface>(
        thread_name: &str,
        shared: Arc<LoopShared>,
        resources: RenderResources<R>,
        surface: S,
        max_consecutive_failures: u32,
    ) -> Result<Self, RenderError> {
        shared.set_surface_alive(true);

        let shared_for_thread = shared.clone();
        let spawned = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                render_thread_main(
                    &shared_for_thread,
                    resources,
                    surface,
                    max_consecutive_failures,
                )
            });

        match spawned {
            Ok(thread) => Ok(Self {
                shared,
                thread: Some(thread),
            }),
            Err(err) => {
                shared.set_surface_alive(false);
                Err(RenderError::ThreadSpawn(err))
            }
        }
    }

    /// ### English
    /// Asks the loop to exit at the top of its next iteration. Does not wait.
    ///
    /// ### 中文
    /// 请求循环在下一次迭代开始处退出；不等待。
    pub fn stop(&self) {
        self.shared.set_surface_alive(false);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|thread| thread.is_finished())
    }

    /// ### English
    /// Waits for the render thread to exit and returns its resources (`None` if it panicked).
    ///
    /// The caller must have stopped the loop (or torn the surface down) first, otherwise this
    /// blocks for as long as the loop keeps rendering.
    ///
    /// ### 中文
    /// 等待渲染线程退出并返回其资源（若线程 panic 则为 `None`）。
    ///
    /// 调用方需先停止循环（或销毁 surface），否则会一直阻塞到循环结束。
    pub fn join(mut self) -> Option<RenderResources<R>> {
        let thread = self.thread.take()?;
        thread.join().ok().flatten()
    }
}

impl<R: Renderer> Drop for RenderWorker<R> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.stop();
            let _ = thread.join();
        }
    }
}

fn render_thread_main<R: Renderer, S: Surface>(
    shared: &LoopShared,
    mut resources: RenderResources<R>,
    mut surface: S,
    max_consecutive_failures: u32,
) -> Option<RenderResources<R>> {
    info!(
        "render thread started ({}x{})",
        resources.frame.width(),
        resources.frame.height()
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_render_loop(
            shared,
            &mut resources,
            &mut surface,
            max_consecutive_failures,
        )
    }));

    match outcome {
        Ok(exit) => {
            shared.record_exit(exit);
            let counters = shared.counters.snapshot();
            info!(
                "render loop exited ({exit:?}) after {} frame(s), {} failed",
                counters.draw_count, counters.failed_frames
            );
            drop(surface);
            Some(resources)
        }
        Err(_) => {
            shared.record_exit(LoopExit::Panicked);
            error!("render thread panicked; renderer and frame buffer released");
            None
        }
    }
}
