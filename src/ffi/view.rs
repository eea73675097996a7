//! ### English
//! C ABI bindings for view creation and the surface lifecycle.
//!
//! ### 中文
//! view 创建与 surface 生命周期的 C ABI 绑定。

use std::ffi::c_char;

use crate::engine::config::RenderViewConfig;
use crate::engine::flags::apply_view_flags;
use crate::engine::logging;
use crate::engine::rendering::ShaderBinary;
use crate::engine::runtime::RenderView;

use super::bridge::{
    ComputeViewRendererVTable, ComputeViewSurfaceVTable, NativeRenderer, NativeSurface,
};
use super::{COMPUTE_VIEW_STATUS_INVALID_ARGUMENT, ComputeView, cstr_to_str, status_of};

/// ### English
/// Boxes a view around the renderer described by `renderer`.
///
/// # Safety
/// `renderer` must be NULL or point to a valid vtable for the duration of the call.
///
/// ### 中文
/// 基于 `renderer` 描述的渲染器创建并装箱一个 view。
///
/// # Safety
/// `renderer` 必须为 NULL，或在调用期间指向有效的 vtable。
unsafe fn create_view(
    config: RenderViewConfig,
    renderer: *const ComputeViewRendererVTable,
) -> *mut ComputeView {
    if renderer.is_null() {
        return std::ptr::null_mut();
    }
    let Some(renderer) = NativeRenderer::new(unsafe { *renderer }) else {
        return std::ptr::null_mut();
    };

    let view = RenderView::new(renderer, config);
    Box::into_raw(Box::new(ComputeView::new(view)))
}

#[unsafe(no_mangle)]
/// ### English
/// Creates one view with a `width × height` frame buffer.
///
/// `view_flags` is a bitmask of `COMPUTE_VIEW_FLAG_*`. The vtable is copied; `destroy` (if set) is
/// called when the renderer is released. Returns NULL if `renderer` is NULL or lacks `init`/`render`,
/// or if an edge exceeds the default `frame.max_edge`.
///
/// ### 中文
/// 创建一个帧缓冲为 `width × height` 的 view。
///
/// `view_flags` 为 `COMPUTE_VIEW_FLAG_*` 位掩码。vtable 会被拷贝；渲染器释放时调用 `destroy`（若设置）。
/// `renderer` 为 NULL 或缺少 `init`/`render`，或边长超过默认的 `frame.max_edge` 时返回 NULL。
pub unsafe extern "C" fn compute_view_create(
    width: u32,
    height: u32,
    view_flags: u32,
    renderer: *const ComputeViewRendererVTable,
) -> *mut ComputeView {
    logging::init();

    let mut config = RenderViewConfig::default();
    config.frame.width = width.max(1);
    config.frame.height = height.max(1);
    apply_view_flags(&mut config, view_flags);
    if let Err(err) = config.validate() {
        log::error!("invalid view size {width}x{height}: {err}");
        return std::ptr::null_mut();
    }

    unsafe { create_view(config, renderer) }
}

#[unsafe(no_mangle)]
/// ### English
/// Creates one view from a TOML configuration string (NUL-terminated UTF-8).
///
/// Returns NULL if the string is NULL, not valid TOML, or fails validation.
///
/// ### 中文
/// 根据 TOML 配置字符串（NUL 结尾的 UTF-8）创建一个 view。
///
/// 字符串为 NULL、不是合法 TOML 或校验失败时返回 NULL。
pub unsafe extern "C" fn compute_view_create_with_config(
    config_toml: *const c_char,
    renderer: *const ComputeViewRendererVTable,
) -> *mut ComputeView {
    logging::init();

    let Some(contents) = (unsafe { cstr_to_str(config_toml) }) else {
        return std::ptr::null_mut();
    };
    let config = match RenderViewConfig::from_toml_str(contents) {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid view configuration: {err}");
            return std::ptr::null_mut();
        }
    };

    unsafe { create_view(config, renderer) }
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a view created by `compute_view_create*`.
///
/// Stops telemetry, stops and joins the render thread, then releases the renderer.
///
/// ### 中文
/// 销毁由 `compute_view_create*` 创建的 view。
///
/// 停止遥测、停止并 join 渲染线程，然后释放渲染器。
pub unsafe extern "C" fn compute_view_destroy(view: *mut ComputeView) {
    if view.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(view));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Passes the shader binary to the renderer's `init`.
///
/// The bytes are copied before `init` runs. Returns `0` on success.
///
/// ### 中文
/// 将 shader 二进制传给渲染器的 `init`。
///
/// 字节会在 `init` 之前被拷贝。成功返回 `0`。
pub unsafe extern "C" fn compute_view_initialize(
    view: *mut ComputeView,
    shader_bytes: *const u8,
    shader_len: usize,
) -> i32 {
    if view.is_null() || (shader_bytes.is_null() && shader_len != 0) {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    }

    let bytes: &[u8] = if shader_len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(shader_bytes, shader_len) }
    };
    let view = unsafe { &mut (*view).view };
    status_of(ShaderBinary::new(bytes).and_then(|shader| view.initialize(shader)))
}

#[unsafe(no_mangle)]
/// ### English
/// Host surface created: starts the render thread on `surface` (the vtable is copied).
///
/// ### 中文
/// 宿主 surface 已创建：在 `surface` 上启动渲染线程（vtable 会被拷贝）。
pub unsafe extern "C" fn compute_view_surface_created(
    view: *mut ComputeView,
    surface: *const ComputeViewSurfaceVTable,
) -> i32 {
    if view.is_null() || surface.is_null() {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    }
    let Some(surface) = NativeSurface::new(unsafe { *surface }) else {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    };

    let view = unsafe { &mut (*view).view };
    status_of(view.on_surface_created(surface))
}

#[unsafe(no_mangle)]
/// ### English
/// Host surface changed size (in pixels).
///
/// ### 中文
/// 宿主 surface 尺寸变化（单位：像素）。
pub unsafe extern "C" fn compute_view_surface_changed(
    view: *mut ComputeView,
    width: u32,
    height: u32,
) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).view.on_surface_changed(width, height) };
}

#[unsafe(no_mangle)]
/// ### English
/// Host surface destroyed: blocks until the render thread has exited. Once this returns the surface
/// callbacks are never invoked again.
///
/// ### 中文
/// 宿主 surface 已销毁：阻塞直到渲染线程退出。返回后不会再调用 surface 回调。
pub unsafe extern "C" fn compute_view_surface_destroyed(view: *mut ComputeView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).view.on_surface_destroyed() };
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the `RenderState` discriminant (`0..=3`), or `-1` for NULL. Lifecycle thread only.
///
/// ### 中文
/// 返回 `RenderState` 判别值（`0..=3`），NULL 时返回 `-1`。仅限生命周期线程调用。
pub unsafe extern "C" fn compute_view_state(view: *const ComputeView) -> i32 {
    if view.is_null() {
        return COMPUTE_VIEW_STATUS_INVALID_ARGUMENT;
    }
    unsafe { (*view).view.state() as i32 }
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the `LoopExit` discriminant, or `0` while the loop has not exited (or for NULL).
///
/// ### 中文
/// 返回 `LoopExit` 判别值；循环尚未退出（或 NULL）时返回 `0`。
pub unsafe extern "C" fn compute_view_loop_exit(view: *const ComputeView) -> u8 {
    if view.is_null() {
        return 0;
    }
    let shared = unsafe { &(*view).shared };
    shared.exit().map_or(0, |exit| exit as u8)
}

#[unsafe(no_mangle)]
/// ### English
/// Number of frames rendered and posted so far.
///
/// ### 中文
/// 目前已渲染并 post 的帧数。
pub unsafe extern "C" fn compute_view_draw_count(view: *const ComputeView) -> u64 {
    if view.is_null() {
        return 0;
    }
    let shared = unsafe { &(*view).shared };
    shared.counters.draw_count()
}

#[unsafe(no_mangle)]
/// ### English
/// Number of frames the renderer failed to produce.
///
/// ### 中文
/// 渲染器未能生成的帧数。
pub unsafe extern "C" fn compute_view_failed_frame_count(view: *const ComputeView) -> u64 {
    if view.is_null() {
        return 0;
    }
    let shared = unsafe { &(*view).shared };
    shared.counters.snapshot().failed_frames
}
