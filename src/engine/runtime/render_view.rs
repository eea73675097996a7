//! ### English
//! Surface lifecycle controller: the state machine that owns the frame buffer and renderer, starts
//! the render thread on surface-created and tears it down on surface-destroyed.
//!
//! ### 中文
//! Surface 生命周期控制器：持有帧缓冲与渲染器的状态机，在 surface-created 时启动渲染线程，
//! 在 surface-destroyed 时将其销毁。

use std::sync::Arc;
use std::time::{Duration, Instant};

use dpi::PhysicalSize;
use log::{debug, info, warn};

use crate::engine::config::RenderViewConfig;
use crate::engine::error::RenderError;
use crate::engine::frame::{FrameBuffer, FrameCountersSnapshot};
use crate::engine::rendering::{Renderer, ShaderBinary};
use crate::engine::surface::Surface;
use crate::engine::telemetry::{
    LatestSample, RecurringTimer, TelemetrySample, TelemetrySampler, TimerHandle,
};

use super::shared::{LoopExit, LoopShared};
use super::worker::{RenderResources, RenderWorker};

/// ### English
/// Lifecycle state of a `RenderView`.
///
/// `Uninitialized → Initialized → Running → Stopped`; `Stopped` is terminal and is also reached
/// directly from the other states on surface-destroyed.
///
/// ### 中文
/// `RenderView` 的生命周期状态。
///
/// `Uninitialized → Initialized → Running → Stopped`；`Stopped` 为终态，
/// 其他状态在 surface-destroyed 时也会直接进入 `Stopped`。
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized = 0,
    Initialized = 1,
    Running = 2,
    Stopped = 3,
}

/// ### English
/// An active telemetry subscription: its own timer thread plus the task handle.
///
/// ### 中文
/// 一个活跃的遥测订阅：独立的计时线程及其任务句柄。
struct TelemetryTask {
    timer: RecurringTimer,
    handle: TimerHandle,
}

/// ### English
/// One view surface driven by a dedicated render thread.
///
/// All lifecycle calls take `&mut self` and are expected on the host (UI) thread. The frame buffer
/// and renderer live inside the view until the surface is created, move onto the render thread
/// while it runs, and are released when the view reaches `Stopped`.
///
/// ### 中文
/// 由独立渲染线程驱动的单个 view surface。
///
/// 所有生命周期调用都需要 `&mut self`，应在宿主（UI）线程上调用。帧缓冲与渲染器在 surface 创建前
/// 由 view 持有，运行期间移动到渲染线程，view 进入 `Stopped` 时释放。
pub struct RenderView<R: Renderer> {
    config: RenderViewConfig,
    state: RenderState,
    /// ### English
    /// Frame buffer + renderer while no render thread owns them.
    ///
    /// ### 中文
    /// 没有渲染线程持有时的帧缓冲与渲染器。
    resources: Option<RenderResources<R>>,
    worker: Option<RenderWorker<R>>,
    shared: Arc<LoopShared>,
    surface_size: Option<PhysicalSize<u32>>,
    telemetry: Option<TelemetryTask>,
    latest_sample: Arc<LatestSample>,
}

impl<R: Renderer> RenderView<R> {
    /// ### English
    /// Allocates the frame buffer described by `config` and takes ownership of `renderer`.
    ///
    /// ### 中文
    /// 按 `config` 分配帧缓冲，并接管 `renderer`。
    pub fn new(renderer: R, config: RenderViewConfig) -> Self {
        let frame = FrameBuffer::new(config.frame_size());
        debug!(
            "render view created ({}x{}, resize_on_surface_change={})",
            frame.width(),
            frame.height(),
            config.frame.resize_on_surface_change
        );

        Self {
            config,
            state: RenderState::Uninitialized,
            resources: Some(RenderResources { frame, renderer }),
            worker: None,
            shared: Arc::new(LoopShared::new()),
            surface_size: None,
            telemetry: None,
            latest_sample: Arc::new(LatestSample::default()),
        }
    }

    pub fn config(&self) -> &RenderViewConfig {
        &self.config
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// ### English
    /// Why the render loop ended, or `None` while it has not ended (or never started).
    ///
    /// ### 中文
    /// 渲染循环结束的原因；尚未结束（或从未启动）时为 `None`。
    pub fn loop_exit(&self) -> Option<LoopExit> {
        self.shared.exit()
    }

    pub fn frame_counters(&self) -> FrameCountersSnapshot {
        self.shared.counters.snapshot()
    }

    pub fn draw_count(&self) -> u64 {
        self.shared.counters.draw_count()
    }

    /// ### English
    /// Handle to the state shared with the render thread, for readers that must not borrow the view.
    ///
    /// ### 中文
    /// 与渲染线程共享的状态句柄，供不能借用 view 的读取方使用。
    pub(crate) fn loop_shared(&self) -> Arc<LoopShared> {
        self.shared.clone()
    }

    pub(crate) fn latest_sample_handle(&self) -> Arc<LatestSample> {
        self.latest_sample.clone()
    }

    /// ### English
    /// Whether a render thread exists and has not returned yet.
    ///
    /// ### 中文
    /// 渲染线程是否存在且尚未返回。
    pub fn is_rendering(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// ### English
    /// Last size reported through `on_surface_changed`.
    ///
    /// ### 中文
    /// 最近一次通过 `on_surface_changed` 上报的尺寸。
    pub fn surface_size(&self) -> Option<PhysicalSize<u32>> {
        self.surface_size
    }

    /// ### English
    /// The frame buffer, when no render thread currently owns it.
    ///
    /// ### 中文
    /// 帧缓冲（仅在没有渲染线程持有时可用）。
    pub fn frame(&self) -> Option<&FrameBuffer> {
        self.resources.as_ref().map(|resources| &resources.frame)
    }

    /// ### English
    /// Hands the shader to the renderer. On failure the view stays `Uninitialized`.
    ///
    /// ### 中文
    /// 将 shader 交给渲染器。失败时 view 保持 `Uninitialized`。
    pub fn initialize(&mut self, shader: ShaderBinary) -> Result<(), RenderError> {
        match self.state {
            RenderState::Uninitialized => {}
            RenderState::Initialized | RenderState::Running => {
                return Err(RenderError::AlreadyInitialized);
            }
            RenderState::Stopped => return Err(RenderError::Stopped),
        }

        let resources = self.resources.as_mut().ok_or(RenderError::Stopped)?;
        let shader_len = shader.len();
        resources
            .renderer
            .init(shader)
            .map_err(RenderError::RendererInit)?;

        self.state = RenderState::Initialized;
        info!("renderer initialized ({shader_len} byte shader)");
        Ok(())
    }

    /// ### English
    /// Starts the render thread on `surface`.
    ///
    /// Rejected with `NotInitialized` before `initialize`, `AlreadyRunning` while a thread exists,
    /// and `Stopped` after teardown. If the thread cannot be spawned the resources are released and
    /// the view becomes `Stopped`.
    ///
    /// ### 中文
    /// 在 `surface` 上启动渲染线程。
    ///
    /// `initialize` 之前调用返回 `NotInitialized`，线程存在时返回 `AlreadyRunning`，销毁后返回 `Stopped`。
    /// 若线程创建失败，资源会被释放且 view 进入 `Stopped`。
    pub fn on_surface_created<S: Surface>(&mut self, surface: S) -> Result<(), RenderError> {
        match self.state {
            RenderState::Initialized => {}
            RenderState::Uninitialized => {
                return Err(RenderError::NotInitialized(self.state));
            }
            RenderState::Running => return Err(RenderError::AlreadyRunning),
            RenderState::Stopped => return Err(RenderError::Stopped),
        }

        let resources = self.resources.take().ok_or(RenderError::AlreadyRunning)?;
        let started = RenderWorker::start(
            &self.config.render.thread_name,
            self.shared.clone(),
            resources,
            surface,
            self.config.render.max_consecutive_failures,
        );

        match started {
            Ok(worker) => {
                self.worker = Some(worker);
                self.state = RenderState::Running;
                info!("surface created, render loop started");
                Ok(())
            }
            Err(err) => {
                self.state = RenderState::Stopped;
                warn!("render loop could not start: {err}");
                Err(err)
            }
        }
    }

    /// ### English
    /// Records the new surface size and, when enabled in the config, resizes the frame buffer to a
    /// `min(width, height)` square (clamped to `frame.max_edge`).
    ///
    /// While the render thread runs, the resize is coalesced and applied between iterations;
    /// otherwise it is applied immediately.
    ///
    /// ### 中文
    /// 记录新的 surface 尺寸；若配置启用，则把帧缓冲调整为边长 `min(width, height)` 的正方形
    /// （钳制到 `frame.max_edge`）。
    ///
    /// 渲染线程运行时 resize 会被合并并在两次迭代之间应用；否则立即应用。
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        let size = PhysicalSize::new(width, height);
        self.surface_size = Some(size);
        debug!("surface changed to {width}x{height}");

        if !self.config.frame.resize_on_surface_change || self.state == RenderState::Stopped {
            return;
        }

        let target = FrameBuffer::square_for_surface(size, self.config.frame.max_edge);
        if let Some(resources) = self.resources.as_mut() {
            resources.frame.resize(target);
        } else if self.worker.is_some() && self.shared.resize.set(target) {
            debug!(
                "frame resize to {}x{} queued for the render thread",
                target.width, target.height
            );
        }
    }

    /// ### English
    /// Signals the loop to exit, joins the render thread, then releases the frame buffer and
    /// renderer. Also cancels telemetry. Idempotent; valid from any state.
    ///
    /// ### 中文
    /// 通知循环退出、join 渲染线程，然后释放帧缓冲与渲染器，并取消遥测。幂等；任意状态下均可调用。
    pub fn on_surface_destroyed(&mut self) {
        self.shared.set_surface_alive(false);

        if let Some(worker) = self.worker.take() {
            let returned = worker.join();
            drop(returned);
        }
        self.resources = None;
        self.stop_telemetry();

        if self.state != RenderState::Stopped {
            info!(
                "surface destroyed, view stopped after {} frame(s)",
                self.draw_count()
            );
            self.state = RenderState::Stopped;
        }
    }

    /// ### English
    /// Samples the frame counters every `period` on a dedicated timer thread, publishing each
    /// sample to `sink` and to `telemetry_text`. Replaces any previous subscription.
    ///
    /// `sink` runs on the timer thread and must not block.
    ///
    /// ### 中文
    /// 在独立计时线程上每隔 `period` 采样一次帧计数器，并把每次采样发布给 `sink` 与 `telemetry_text`。
    /// 会替换之前的订阅。
    ///
    /// `sink` 在计时线程上执行，不得阻塞。
    pub fn start_telemetry<F>(&mut self, period: Duration, mut sink: F) -> Result<(), RenderError>
    where
        F: FnMut(TelemetrySample) + Send + 'static,
    {
        self.stop_telemetry();

        let timer = RecurringTimer::new(&self.config.telemetry.timer_thread_name)
            .map_err(RenderError::ThreadSpawn)?;

        let shared = self.shared.clone();
        let latest_sample = self.latest_sample.clone();
        let mut sampler = TelemetrySampler::new(Instant::now(), shared.counters.snapshot());

        let handle = timer.schedule_repeating(period, move || {
            let sample = sampler.sample_at(Instant::now(), shared.counters.snapshot());
            latest_sample.publish(sample);
            sink(sample);
        });

        debug!("telemetry started (every {period:?})");
        self.telemetry = Some(TelemetryTask { timer, handle });
        Ok(())
    }

    /// ### English
    /// Same as `start_telemetry` with the configured period.
    ///
    /// ### 中文
    /// 与 `start_telemetry` 相同，使用配置中的周期。
    pub fn start_default_telemetry<F>(&mut self, sink: F) -> Result<(), RenderError>
    where
        F: FnMut(TelemetrySample) + Send + 'static,
    {
        self.start_telemetry(self.config.telemetry_period(), sink)
    }

    /// ### English
    /// Cancels telemetry and joins its timer thread. The last published text stays readable.
    ///
    /// ### 中文
    /// 取消遥测并 join 其计时线程。最近一次发布的文本仍可读取。
    pub fn stop_telemetry(&mut self) {
        if let Some(mut task) = self.telemetry.take() {
            task.timer.cancel(&task.handle);
            task.timer.shutdown();
            debug!("telemetry stopped");
        }
    }

    pub fn is_telemetry_running(&self) -> bool {
        self.telemetry.is_some()
    }

    pub fn latest_sample(&self) -> Option<TelemetrySample> {
        self.latest_sample.load()
    }

    /// ### English
    /// Most recent sample formatted as `"FPS: <f2>, Load: <f2>"`.
    ///
    /// ### 中文
    /// 最近一次采样，格式为 `"FPS: <f2>, Load: <f2>"`。
    pub fn telemetry_text(&self) -> Option<String> {
        self.latest_sample().map(|sample| sample.to_string())
    }
}

impl<R: Renderer> Drop for RenderView<R> {
    fn drop(&mut self) {
        self.on_surface_destroyed();
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::rendering::PatternRenderer;

    use super::*;

    fn small_config() -> RenderViewConfig {
        let mut config = RenderViewConfig::default();
        config.frame.width = 8;
        config.frame.height = 8;
        config
    }

    fn shader() -> ShaderBinary {
        ShaderBinary::new(vec![7u8; 16]).unwrap()
    }

    #[test]
    fn initialize_moves_to_initialized_once() {
        let mut view = RenderView::new(PatternRenderer::new(), small_config());
        assert_eq!(view.state(), RenderState::Uninitialized);

        view.initialize(shader()).unwrap();
        assert_eq!(view.state(), RenderState::Initialized);

        assert!(matches!(
            view.initialize(shader()),
            Err(RenderError::AlreadyInitialized)
        ));
    }

    #[test]
    fn destroy_without_start_stops_and_releases() {
        let mut view = RenderView::new(PatternRenderer::new(), small_config());
        view.initialize(shader()).unwrap();

        view.on_surface_destroyed();
        assert_eq!(view.state(), RenderState::Stopped);
        assert!(view.frame().is_none());
        assert_eq!(view.loop_exit(), None);

        view.on_surface_destroyed();
        assert_eq!(view.state(), RenderState::Stopped);
        assert!(matches!(
            view.initialize(shader()),
            Err(RenderError::Stopped)
        ));
    }

    #[test]
    fn resize_is_ignored_unless_enabled() {
        let mut view = RenderView::new(PatternRenderer::new(), small_config());
        view.on_surface_changed(20, 10);
        assert_eq!(view.surface_size(), Some(PhysicalSize::new(20, 10)));
        assert_eq!(view.frame().map(FrameBuffer::size), Some(PhysicalSize::new(8, 8)));
    }

    #[test]
    fn resize_applies_directly_when_idle() {
        let mut config = small_config();
        config.frame.resize_on_surface_change = true;
        let mut view = RenderView::new(PatternRenderer::new(), config);

        view.on_surface_changed(20, 10);
        assert_eq!(
            view.frame().map(FrameBuffer::size),
            Some(PhysicalSize::new(10, 10))
        );
    }

    #[test]
    fn huge_surface_resize_is_clamped_to_max_edge() {
        let mut config = small_config();
        config.frame.resize_on_surface_change = true;
        config.frame.max_edge = 16;
        let mut view = RenderView::new(PatternRenderer::new(), config);

        view.on_surface_changed(u32::MAX, u32::MAX);
        assert_eq!(view.surface_size(), Some(PhysicalSize::new(u32::MAX, u32::MAX)));
        assert_eq!(
            view.frame().map(FrameBuffer::size),
            Some(PhysicalSize::new(16, 16))
        );
    }

    #[test]
    fn telemetry_text_is_empty_before_any_sample() {
        let view = RenderView::new(PatternRenderer::new(), small_config());
        assert_eq!(view.telemetry_text(), None);
        assert!(!view.is_telemetry_running());
    }
}
