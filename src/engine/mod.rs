//! ### English
//! Engine internal modules (render thread, frame buffer, telemetry, and host boundaries).
//!
//! ### 中文
//! 引擎内部模块（渲染线程、帧缓冲、遥测与宿主边界等）。

pub(crate) mod cache;
pub mod config;
pub mod error;
pub mod flags;
pub mod frame;
pub(crate) mod lockfree;
pub mod logging;
pub mod rendering;
pub mod runtime;
pub mod surface;
pub mod telemetry;

pub use config::RenderViewConfig;
pub use error::{ConfigError, RenderError, RendererError};
pub use frame::{FrameBuffer, FrameCountersSnapshot, PixelFormat};
pub use rendering::{PatternRenderer, Renderer, ShaderBinary};
pub use runtime::{LoopExit, RenderState, RenderView};
pub use surface::{Canvas, Surface};
pub use telemetry::TelemetrySample;
