//! ### English
//! Logging bootstrap (`log` facade + `env_logger`).
//!
//! ### 中文
//! 日志初始化（`log` 门面 + `env_logger`）。

/// ### English
/// Installs `env_logger` as the global logger. Safe to call more than once: a logger that is
/// already installed (by an earlier call or by the embedder) is kept.
///
/// Honors `RUST_LOG`; defaults to `info` when unset.
///
/// ### 中文
/// 安装 `env_logger` 作为全局 logger。可重复调用；若已安装（包括宿主安装的 logger）则静默保留。
///
/// 遵循 `RUST_LOG`；未设置时默认 `info`。
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
