//! ### English
//! C ABI bindings for FPS / load telemetry.
//!
//! ### 中文
//! FPS / 负载遥测的 C ABI 绑定。

use std::ffi::{c_char, c_void};
use std::time::Duration;

use super::{COMPUTE_VIEW_STATUS_INVALID_ARGUMENT, ComputeView, status_of};

/// ### English
/// Telemetry callback: `(user_data, fps, load_ratio)`, invoked on the telemetry timer thread.
///
/// ### 中文
/// 遥测回调：`(user_data, fps, load_ratio)`，在遥测计时线程上调用。
pub type ComputeViewTelemetryCallback =
    unsafe extern "C" fn(user_data: *mut c_void, fps: f64, load_ratio: f64);

struct CallbackTarget {
    callback: ComputeViewTelemetryCallback,
    user_data: *mut c_void,
}

// The host promises `user_data` may be used from the timer thread.
unsafe impl Send for CallbackTarget {}

#[unsafe(no_mangle)]
/// ### English
/// Starts sampling every `period_ms` milliseconds (`0` = configured period).
///
/// `callback` may be NULL, in which case samples are only available through
/// `compute_view_telemetry_text`. The callback must not block and must not call back into this
/// view's lifecycle functions. Restarting replaces the previous subscription.
///
/// ### 中文
/// 每 `period_ms` 毫秒采样一次（`0` = 使用配置中的周期）。
///
/// `callback` 可以为 NULL，此时只能通过 `compute_view_telemetry_text` 读取采样。回调不得阻塞，
/// 也不得回调该 view 的生命周期函数。重复调用会替换之前的订阅。
pub unsafe extern "C" fn compute_view_telemetry_start(
    view: *mut ComputeView,
    period_ms: u32,
    callback: Option<ComputeViewTelemetryCallback>,
    user_data: *mut c_void,
) -> i32 {
    if view.is_null() {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    }
    let view = unsafe { &mut (*view).view };

    let period = match period_ms {
        0 => view.config().telemetry_period(),
        ms => Duration::from_millis(u64::from(ms)),
    };

    let target = callback.map(|callback| CallbackTarget {
        callback,
        user_data,
    });
    status_of(view.start_telemetry(period, move |sample| {
        if let Some(target) = &target {
            unsafe { (target.callback)(target.user_data, sample.fps, sample.load_ratio) };
        }
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Stops telemetry and waits for the timer thread; the callback is not invoked after this returns.
///
/// ### 中文
/// 停止遥测并等待计时线程退出；返回后不会再调用回调。
pub unsafe extern "C" fn compute_view_telemetry_stop(view: *mut ComputeView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).view.stop_telemetry() };
}

#[unsafe(no_mangle)]
/// ### English
/// Copies the latest `"FPS: <f2>, Load: <f2>"` text into `buf` (NUL-terminated, truncated to fit).
///
/// Returns the full text length in bytes excluding the NUL (like `snprintf`), `0` when no sample has
/// been published yet, or `-1` for a NULL view.
///
/// ### 中文
/// 将最新的 `"FPS: <f2>, Load: <f2>"` 文本拷贝到 `buf`（以 NUL 结尾，放不下时截断）。
///
/// 返回完整文本的字节长度（不含 NUL，类似 `snprintf`）；尚无采样时返回 `0`；view 为 NULL 时返回 `-1`。
pub unsafe extern "C" fn compute_view_telemetry_text(
    view: *const ComputeView,
    buf: *mut c_char,
    buf_len: usize,
) -> i32 {
    if view.is_null() {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    }
    let latest = unsafe { &(*view).latest };
    let text = latest
        .load()
        .map(|sample| sample.to_string())
        .unwrap_or_default();

    if !buf.is_null() && buf_len > 0 {
        let copied = text.len().min(buf_len - 1);
        unsafe {
            std::ptr::copy_nonoverlapping(text.as_ptr(), buf.cast::<u8>(), copied);
            *buf.add(copied) = 0;
        }
    }

    i32::try_from(text.len()).unwrap_or(i32::MAX)
}
