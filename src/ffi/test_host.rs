//! Host-side callback tables backed by atomics, shared by the C ABI tests.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::bridge::{ComputeViewRendererVTable, ComputeViewSurfaceVTable};

/// What the host saw. `canvases` is how many more `lock_canvas` calls succeed.
#[derive(Default)]
pub(super) struct TestHost {
    pub(super) canvases: AtomicUsize,
    pub(super) fail_render: AtomicBool,
    pub(super) init_len: AtomicUsize,
    pub(super) renders: AtomicUsize,
    pub(super) locks: AtomicUsize,
    pub(super) blits: AtomicUsize,
    pub(super) posts: AtomicUsize,
    pub(super) last_pixel: AtomicU32,
    pub(super) destroyed: AtomicBool,
}

impl TestHost {
    pub(super) fn with_canvases(canvases: usize) -> Self {
        Self {
            canvases: AtomicUsize::new(canvases),
            ..Self::default()
        }
    }

    fn user_data(&self) -> *mut c_void {
        (self as *const Self).cast_mut().cast()
    }

    pub(super) fn renderer(&self) -> ComputeViewRendererVTable {
        ComputeViewRendererVTable {
            user_data: self.user_data(),
            init: Some(host_init),
            render: Some(host_render),
            destroy: Some(host_destroy),
        }
    }

    pub(super) fn surface(&self) -> ComputeViewSurfaceVTable {
        ComputeViewSurfaceVTable {
            user_data: self.user_data(),
            lock_canvas: Some(host_lock_canvas),
            blit: Some(host_blit),
            unlock_and_post: Some(host_unlock_and_post),
        }
    }
}

unsafe fn host<'a>(user_data: *mut c_void) -> &'a TestHost {
    unsafe { &*user_data.cast::<TestHost>() }
}

unsafe extern "C" fn host_init(user_data: *mut c_void, _: *const u8, len: usize) -> i32 {
    unsafe { host(user_data) }.init_len.store(len, Ordering::SeqCst);
    0
}

unsafe extern "C" fn host_render(
    user_data: *mut c_void,
    pixels: *mut u32,
    width: u32,
    height: u32,
    stride: u32,
) -> i32 {
    let host = unsafe { host(user_data) };
    let frame = host.renders.fetch_add(1, Ordering::SeqCst) as u32 + 1;
    if host.fail_render.load(Ordering::SeqCst) {
        return -3;
    }
    let words = unsafe { std::slice::from_raw_parts_mut(pixels, (stride * height) as usize) };
    words.fill(frame.wrapping_mul(width));
    0
}

unsafe extern "C" fn host_destroy(user_data: *mut c_void) {
    unsafe { host(user_data) }
        .destroyed
        .store(true, Ordering::SeqCst);
}

unsafe extern "C" fn host_lock_canvas(user_data: *mut c_void) -> bool {
    let host = unsafe { host(user_data) };
    let granted = host
        .canvases
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if granted {
        host.locks.fetch_add(1, Ordering::SeqCst);
    }
    granted
}

unsafe extern "C" fn host_blit(
    user_data: *mut c_void,
    pixels: *const u32,
    _: u32,
    _: u32,
    _: u32,
    _: i32,
    _: i32,
) {
    let host = unsafe { host(user_data) };
    host.last_pixel
        .store(unsafe { *pixels }, Ordering::SeqCst);
    host.blits.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn host_unlock_and_post(user_data: *mut c_void) {
    unsafe { host(user_data) }
        .posts
        .fetch_add(1, Ordering::SeqCst);
}

pub(super) fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}
