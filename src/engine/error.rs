//! ### English
//! Error types for the render-loop core.
//!
//! ### 中文
//! 渲染循环核心的错误类型。

use thiserror::Error;

use super::runtime::RenderState;

/// ### English
/// Failure reported by a `Renderer` implementation.
///
/// `code` carries the native status code when the renderer sits behind the C ABI (negative
/// values), or `-1` for Rust renderers that have no code of their own.
///
/// ### 中文
/// `Renderer` 实现上报的失败。
///
/// 当渲染器位于 C ABI 之后时，`code` 为原生状态码（负数）；没有自有状态码的 Rust 渲染器使用 `-1`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("renderer failed (code {code}): {message}")]
pub struct RendererError {
    pub code: i32,
    pub message: String,
}

impl RendererError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: -1,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// ### English
/// Errors returned synchronously by `RenderView` lifecycle calls.
///
/// ### 中文
/// `RenderView` 生命周期调用同步返回的错误。
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("shader binary is empty")]
    EmptyShader,

    #[error("renderer is not initialized (state: {0:?})")]
    NotInitialized(RenderState),

    #[error("renderer is already initialized")]
    AlreadyInitialized,

    #[error("a render thread is already running for this surface")]
    AlreadyRunning,

    #[error("view is stopped")]
    Stopped,

    #[error("renderer initialization failed: {0}")]
    RendererInit(#[source] RendererError),

    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

impl RenderError {
    /// ### English
    /// Stable negative status code used by the C ABI.
    ///
    /// ### 中文
    /// C ABI 使用的稳定负数状态码。
    pub fn status_code(&self) -> i32 {
        match self {
            RenderError::EmptyShader => -2,
            RenderError::NotInitialized(_) => -3,
            RenderError::AlreadyInitialized => -4,
            RenderError::AlreadyRunning => -5,
            RenderError::Stopped => -6,
            RenderError::RendererInit(_) => -7,
            RenderError::ThreadSpawn(_) => -8,
        }
    }
}

/// ### English
/// Configuration loading errors.
///
/// ### 中文
/// 配置加载错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
