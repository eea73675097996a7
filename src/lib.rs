/// ### English
/// `compute_view` crate root.
/// Exposes the C ABI via `ffi`; the render-loop core lives under `engine`.
///
/// ### 中文
/// `compute_view` 的 crate 根。
/// 通过 `ffi` 导出 C ABI；渲染循环核心位于 `engine` 模块。
pub mod engine;
mod ffi;
