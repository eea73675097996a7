//! ### English
//! C ABI surface for `compute_view`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`. Every entry point
//! tolerates NULL handles. Lifecycle calls on one view (including `compute_view_state` and the
//! telemetry start/stop calls) must not run concurrently with each other. The counter readers
//! (`compute_view_draw_count`, `compute_view_failed_frame_count`, `compute_view_loop_exit`,
//! `compute_view_telemetry_text`) only touch state shared with the render thread and may be called
//! from any thread until `compute_view_destroy`.
//!
//! Status codes: `0` = ok, `-1` = invalid argument (NULL pointer, missing callback, bad UTF-8),
//! other negative values map `RenderError` variants (see `RenderError::status_code`).
//!
//! ### 中文
//! `compute_view` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。所有入口都容忍 NULL 句柄。
//! 同一 view 的生命周期调用（包括 `compute_view_state` 与遥测 start/stop）不得并发。计数器读取函数
//! （`compute_view_draw_count`、`compute_view_failed_frame_count`、`compute_view_loop_exit`、
//! `compute_view_telemetry_text`）只访问与渲染线程共享的状态，在 `compute_view_destroy` 之前可在任意线程调用。
//!
//! 状态码：`0` = 成功，`-1` = 参数非法（NULL 指针、缺少回调、UTF-8 非法），
//! 其他负数对应 `RenderError` 各变体（见 `RenderError::status_code`）。
mod abi;
mod bridge;
mod telemetry;
mod view;

#[cfg(test)]
mod test_host;

use std::ffi::{CStr, c_char};
use std::sync::Arc;

use crate::engine::error::RenderError;
use crate::engine::runtime::{LoopShared, RenderView};
use crate::engine::telemetry::LatestSample;

use bridge::NativeRenderer;

/// ### English
/// Opaque view handle owning one render view and (while running) its render thread.
///
/// `shared` and `latest` alias the view's own handles; the any-thread readers go through them and
/// never borrow `view`.
///
/// ### 中文
/// 不透明 view 句柄，持有一个渲染 view 及其（运行时的）渲染线程。
///
/// `shared` 与 `latest` 是 view 自身句柄的克隆；可跨线程调用的读取函数只经由它们访问，从不借用 `view`。
pub struct ComputeView {
    view: RenderView<NativeRenderer>,
    shared: Arc<LoopShared>,
    latest: Arc<LatestSample>,
}

impl ComputeView {
    fn new(view: RenderView<NativeRenderer>) -> Self {
        Self {
            shared: view.loop_shared(),
            latest: view.latest_sample_handle(),
            view,
        }
    }
}

/// ### English
/// C ABI version for `compute_view`.
///
/// ### 中文
/// `compute_view` 的 C ABI 版本号。
const COMPUTE_VIEW_ABI_VERSION: u32 = 1;

const COMPUTE_VIEW_STATUS_OK: i32 = 0;
const COMPUTE_VIEW_STATUS_INVALID_ARGUMENT: i32 = -1;

#[inline]
fn status_of(result: Result<(), RenderError>) -> i32 {
    match result {
        Ok(()) => COMPUTE_VIEW_STATUS_OK,
        Err(err) => err.status_code(),
    }
}

/// ### English
/// Borrows a NUL-terminated UTF-8 C string. Returns `None` for NULL or invalid UTF-8.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string valid for `'a`.
///
/// ### 中文
/// 借用以 NUL 结尾的 UTF-8 C 字符串。NULL 或 UTF-8 非法时返回 `None`。
///
/// # Safety
/// `ptr` 必须为 NULL，或指向在 `'a` 内有效、以 NUL 结尾的字符串。
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}
