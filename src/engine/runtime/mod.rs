//! ### English
//! Render runtime (public API): the per-view lifecycle controller and its render thread.
//!
//! ### 中文
//! 渲染运行时（对外公开 API）：每个 view 的生命周期控制器及其渲染线程。

mod render_loop;
mod render_view;
mod shared;
mod worker;

pub use render_view::{RenderState, RenderView};
pub use shared::LoopExit;
pub(crate) use shared::LoopShared;
pub use worker::{RenderResources, RenderWorker};
