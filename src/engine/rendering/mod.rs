//! ### English
//! Renderer boundary: the compute renderer that fills a `FrameBuffer` from a shader binary.
//!
//! The core never knows how pixels are produced; it only calls `Renderer::init` once and
//! `Renderer::render` once per loop iteration.
//!
//! ### 中文
//! 渲染器边界：根据 shader 二进制填充 `FrameBuffer` 的计算渲染器。
//!
//! 核心不关心像素如何生成，只会调用一次 `Renderer::init`，并在每次循环迭代中调用一次 `Renderer::render`。

mod pattern;
mod shader;

pub use pattern::PatternRenderer;
pub use shader::ShaderBinary;

use crate::engine::error::RendererError;
use crate::engine::frame::FrameBuffer;

/// ### English
/// Injected compute renderer capability.
///
/// Contract:
/// - `init` runs exactly once, on the thread that calls `RenderView::initialize`, before any
///   `render` call.
/// - `render` runs on the render thread, once per iteration, never concurrently with itself. It
///   must fill `frame` and must not keep any reference to it after returning (the borrow checker
///   enforces this for Rust renderers; native renderers must honor it manually).
/// - An `Err` from `render` skips the frame; repeated failures may stop the loop.
///
/// ### 中文
/// 注入的计算渲染器能力。
///
/// 约定：
/// - `init` 只执行一次，在调用 `RenderView::initialize` 的线程上、任何 `render` 之前执行。
/// - `render` 在渲染线程上每次迭代执行一次，不会与自身并发。它必须填充 `frame`，
///   且返回后不得保留任何引用（Rust 渲染器由借用检查保证；原生渲染器需自行遵守）。
/// - `render` 返回 `Err` 时跳过该帧；连续失败可能导致循环停止。
pub trait Renderer: Send + 'static {
    fn init(&mut self, shader: ShaderBinary) -> Result<(), RendererError>;

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), RendererError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn init(&mut self, shader: ShaderBinary) -> Result<(), RendererError> {
        (**self).init(shader)
    }

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), RendererError> {
        (**self).render(frame)
    }
}
