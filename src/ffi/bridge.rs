//! ### English
//! Adapters from host function-pointer tables to the `Renderer` and `Surface` traits.
//!
//! ### 中文
//! 将宿主函数指针表适配为 `Renderer` 与 `Surface` trait。

use std::ffi::c_void;

use dpi::PhysicalPosition;

use crate::engine::error::RendererError;
use crate::engine::frame::FrameBuffer;
use crate::engine::rendering::{Renderer, ShaderBinary};
use crate::engine::surface::{Canvas, Surface};

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Native compute renderer callbacks.
///
/// - `init(user_data, bytes, len)`: called once on the thread that calls `compute_view_initialize`.
///   The bytes are only valid during the call.
/// - `render(user_data, pixels, width, height, stride)`: called on the render thread once per frame.
///   `pixels` points to `stride * height` RGBA8888 words (`stride` in pixels) and is only valid during
///   the call.
/// - `destroy(user_data)`: optional; called once when the renderer is released.
///
/// A negative return value is a failure carrying that code.
///
/// ### 中文
/// 原生计算渲染器回调。
///
/// - `init(user_data, bytes, len)`：在调用 `compute_view_initialize` 的线程上调用一次；字节仅在调用期间有效。
/// - `render(user_data, pixels, width, height, stride)`：在渲染线程上每帧调用一次。`pixels` 指向
///   `stride * height` 个 RGBA8888 字（`stride` 以像素为单位），仅在调用期间有效。
/// - `destroy(user_data)`：可选；渲染器释放时调用一次。
///
/// 返回负数表示失败，并携带该错误码。
pub struct ComputeViewRendererVTable {
    pub user_data: *mut c_void,
    pub init: Option<unsafe extern "C" fn(user_data: *mut c_void, bytes: *const u8, len: usize) -> i32>,
    pub render: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            pixels: *mut u32,
            width: u32,
            height: u32,
            stride: u32,
        ) -> i32,
    >,
    pub destroy: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Host drawing surface callbacks, all invoked on the render thread.
///
/// - `lock_canvas(user_data)`: returns `false` once the surface is gone (ends the loop).
/// - `blit(user_data, pixels, width, height, stride, x, y)`: copies the frame onto the locked canvas.
/// - `unlock_and_post(user_data)`: called exactly once after every successful `lock_canvas`.
///
/// ### 中文
/// 宿主绘制表面回调，全部在渲染线程上调用。
///
/// - `lock_canvas(user_data)`：surface 消失后返回 `false`（结束循环）。
/// - `blit(user_data, pixels, width, height, stride, x, y)`：把帧拷贝到已锁定画布上。
/// - `unlock_and_post(user_data)`：每次成功 `lock_canvas` 之后恰好调用一次。
pub struct ComputeViewSurfaceVTable {
    pub user_data: *mut c_void,
    pub lock_canvas: Option<unsafe extern "C" fn(user_data: *mut c_void) -> bool>,
    pub blit: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            pixels: *const u32,
            width: u32,
            height: u32,
            stride: u32,
            x: i32,
            y: i32,
        ),
    >,
    pub unlock_and_post: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

/// ### English
/// `Renderer` backed by `ComputeViewRendererVTable`.
///
/// ### 中文
/// 由 `ComputeViewRendererVTable` 支撑的 `Renderer`。
pub(super) struct NativeRenderer {
    vtable: ComputeViewRendererVTable,
}

// The host promises its callbacks may be invoked from the render thread.
unsafe impl Send for NativeRenderer {}

impl NativeRenderer {
    /// ### English
    /// Returns `None` when a required callback (`init`, `render`) is missing.
    ///
    /// ### 中文
    /// 缺少必需回调（`init`、`render`）时返回 `None`。
    pub(super) fn new(vtable: ComputeViewRendererVTable) -> Option<Self> {
        if vtable.init.is_none() || vtable.render.is_none() {
            return None;
        }
        Some(Self { vtable })
    }
}

impl Renderer for NativeRenderer {
    fn init(&mut self, shader: ShaderBinary) -> Result<(), RendererError> {
        let Some(init) = self.vtable.init else {
            return Err(RendererError::new("native init callback missing"));
        };
        let bytes = shader.as_bytes();
        let code = unsafe { init(self.vtable.user_data, bytes.as_ptr(), bytes.len()) };
        if code < 0 {
            return Err(RendererError::with_code(code, "native init failed"));
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), RendererError> {
        let Some(render) = self.vtable.render else {
            return Err(RendererError::new("native render callback missing"));
        };
        let (width, height, stride) = (frame.width(), frame.height(), frame.stride());
        let code = unsafe {
            render(
                self.vtable.user_data,
                frame.pixels_mut().as_mut_ptr(),
                width,
                height,
                stride,
            )
        };
        if code < 0 {
            return Err(RendererError::with_code(code, "native render failed"));
        }
        Ok(())
    }
}

impl Drop for NativeRenderer {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            unsafe { destroy(self.vtable.user_data) };
        }
    }
}

/// ### English
/// `Surface` backed by `ComputeViewSurfaceVTable`.
///
/// ### 中文
/// 由 `ComputeViewSurfaceVTable` 支撑的 `Surface`。
pub(super) struct NativeSurface {
    vtable: ComputeViewSurfaceVTable,
}

unsafe impl Send for NativeSurface {}

impl NativeSurface {
    /// ### English
    /// Returns `None` unless every callback is present.
    ///
    /// ### 中文
    /// 任一回调缺失时返回 `None`。
    pub(super) fn new(vtable: ComputeViewSurfaceVTable) -> Option<Self> {
        if vtable.lock_canvas.is_none() || vtable.blit.is_none() || vtable.unlock_and_post.is_none()
        {
            return None;
        }
        Some(Self { vtable })
    }
}

pub(super) struct NativeCanvas<'a> {
    vtable: &'a ComputeViewSurfaceVTable,
}

impl Surface for NativeSurface {
    type Canvas<'a> = NativeCanvas<'a>;

    fn lock_canvas(&mut self) -> Option<Self::Canvas<'_>> {
        let lock_canvas = self.vtable.lock_canvas?;
        if !unsafe { lock_canvas(self.vtable.user_data) } {
            return None;
        }
        Some(NativeCanvas {
            vtable: &self.vtable,
        })
    }
}

impl Canvas for NativeCanvas<'_> {
    fn draw_frame(&mut self, frame: &FrameBuffer, origin: PhysicalPosition<i32>) {
        if let Some(blit) = self.vtable.blit {
            unsafe {
                blit(
                    self.vtable.user_data,
                    frame.pixels().as_ptr(),
                    frame.width(),
                    frame.height(),
                    frame.stride(),
                    origin.x,
                    origin.y,
                )
            };
        }
    }

    fn unlock_and_post(self) {
        if let Some(unlock_and_post) = self.vtable.unlock_and_post {
            unsafe { unlock_and_post(self.vtable.user_data) };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dpi::PhysicalSize;

    use super::*;

    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn init_ok(_: *mut c_void, _: *const u8, len: usize) -> i32 {
        if len == 0 { -9 } else { 0 }
    }

    unsafe extern "C" fn render_fill(
        _: *mut c_void,
        pixels: *mut u32,
        width: u32,
        height: u32,
        stride: u32,
    ) -> i32 {
        let words = unsafe { std::slice::from_raw_parts_mut(pixels, (stride * height) as usize) };
        for pixel in words.iter_mut() {
            *pixel = width;
        }
        0
    }

    unsafe extern "C" fn render_fail(_: *mut c_void, _: *mut u32, _: u32, _: u32, _: u32) -> i32 {
        -42
    }

    unsafe extern "C" fn count_destroy(_: *mut c_void) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    fn vtable() -> ComputeViewRendererVTable {
        ComputeViewRendererVTable {
            user_data: std::ptr::null_mut(),
            init: Some(init_ok),
            render: Some(render_fill),
            destroy: Some(count_destroy),
        }
    }

    #[test]
    fn missing_callbacks_are_rejected() {
        let mut table = vtable();
        table.render = None;
        table.destroy = None;
        assert!(NativeRenderer::new(table).is_none());
    }

    #[test]
    fn native_renderer_fills_and_reports_codes() {
        let before = DESTROYED.load(Ordering::SeqCst);
        {
            let mut renderer = NativeRenderer::new(vtable()).unwrap();
            renderer.init(ShaderBinary::new(vec![1u8; 4]).unwrap()).unwrap();

            let mut frame = FrameBuffer::new(PhysicalSize::new(3, 2));
            renderer.render(&mut frame).unwrap();
            assert!(frame.pixels().iter().all(|&pixel| pixel == 3));

            renderer.vtable.render = Some(render_fail);
            let err = renderer.render(&mut frame).unwrap_err();
            assert_eq!(err.code, -42);
        }
        assert_eq!(DESTROYED.load(Ordering::SeqCst), before + 1);
    }
}
