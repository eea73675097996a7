//! ### English
//! Fixed-size CPU pixel buffer shared (by handoff, never concurrently) between the render loop
//! and the renderer.
//!
//! ### 中文
//! 渲染循环与渲染器之间交接使用（从不并发访问）的定长 CPU 像素缓冲。

use dpi::PhysicalSize;

/// ### English
/// Pixel layout of a `FrameBuffer`.
///
/// The discriminant matches `ANDROIDBITMAP_FORMAT_RGBA_8888` so it can be forwarded to a bitmap
/// host unchanged.
///
/// ### 中文
/// `FrameBuffer` 的像素布局。
///
/// 判别值与 `ANDROIDBITMAP_FORMAT_RGBA_8888` 一致，可原样转交给位图宿主。
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// ### English
    /// 8 bits per channel, byte order `[R, G, B, A]` in memory.
    ///
    /// ### 中文
    /// 每通道 8 位，内存字节序为 `[R, G, B, A]`。
    Rgba8888 = 1,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
        }
    }
}

/// ### English
/// Packs one RGBA pixel so that its in-memory byte order is `[r, g, b, a]` on every target.
///
/// ### 中文
/// 打包一个 RGBA 像素，保证在任意平台上内存字节序均为 `[r, g, b, a]`。
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_ne_bytes([r, g, b, a])
}

/// ### English
/// Largest accepted frame edge in pixels. Larger requests are clamped.
///
/// ### 中文
/// 允许的最大帧边长（像素），更大的请求会被钳制。
pub const MAX_FRAME_EDGE: u32 = 8192;

/// ### English
/// Mutable 2-D pixel surface with fixed dimensions.
///
/// Rows are tightly packed (`stride == width`). Renderers receive `&mut FrameBuffer` and can write
/// pixels but cannot change the dimensions; only the render loop (between frames) may resize it.
///
/// ### 中文
/// 尺寸固定的可变二维像素表面。
///
/// 行紧密排列（`stride == width`）。渲染器拿到 `&mut FrameBuffer` 后只能写像素、不能修改尺寸；
/// 只有渲染循环（在两帧之间）可以调整尺寸。
pub struct FrameBuffer {
    size: PhysicalSize<u32>,
    format: PixelFormat,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// ### English
    /// Allocates a zeroed (transparent black) buffer. Each dimension is clamped to
    /// `1..=MAX_FRAME_EDGE`.
    ///
    /// ### 中文
    /// 分配一个清零（透明黑）的缓冲区；每一维都会被钳制到 `1..=MAX_FRAME_EDGE`。
    pub fn new(size: PhysicalSize<u32>) -> Self {
        let size = clamp_size(size);
        Self {
            size,
            format: PixelFormat::Rgba8888,
            pixels: vec![0; pixel_count(size)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height
    }

    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// ### English
    /// Row stride in pixels.
    ///
    /// ### 中文
    /// 行跨度（像素）。
    #[inline]
    pub fn stride(&self) -> u32 {
        self.size.width
    }

    #[inline]
    pub fn stride_bytes(&self) -> usize {
        self.size.width as usize * self.format.bytes_per_pixel()
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// ### English
    /// Returns row `y`, or `None` when out of range.
    ///
    /// ### 中文
    /// 返回第 `y` 行；越界时返回 `None`。
    pub fn row(&self, y: u32) -> Option<&[u32]> {
        if y >= self.size.height {
            return None;
        }
        let width = self.size.width as usize;
        let start = y as usize * width;
        Some(&self.pixels[start..start + width])
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u32]> {
        if y >= self.size.height {
            return None;
        }
        let width = self.size.width as usize;
        let start = y as usize * width;
        Some(&mut self.pixels[start..start + width])
    }

    pub fn fill(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    /// ### English
    /// Reallocates the buffer to `size` (contents are cleared). Returns `false` if the size is
    /// unchanged.
    ///
    /// Must only be called while no render call is in flight.
    ///
    /// ### 中文
    /// 将缓冲区重新分配为 `size`（内容清空）；尺寸未变化时返回 `false`。
    ///
    /// 只能在没有渲染调用进行时调用。
    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) -> bool {
        let size = clamp_size(size);
        if size == self.size {
            return false;
        }
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(pixel_count(size), 0);
        true
    }

    /// ### English
    /// Square buffer size for a surface: the edge is the smaller surface dimension, clamped to
    /// `1..=max_edge` (and never above `MAX_FRAME_EDGE`).
    ///
    /// ### 中文
    /// surface 对应的正方形缓冲尺寸：边长取 surface 较小的一边，并钳制到 `1..=max_edge`
    /// （且不超过 `MAX_FRAME_EDGE`）。
    pub fn square_for_surface(surface: PhysicalSize<u32>, max_edge: u32) -> PhysicalSize<u32> {
        let max_edge = max_edge.clamp(1, MAX_FRAME_EDGE);
        let edge = surface.width.min(surface.height).clamp(1, max_edge);
        PhysicalSize::new(edge, edge)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .field("format", &self.format)
            .finish()
    }
}

#[inline]
fn clamp_size(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
    PhysicalSize::new(
        size.width.clamp(1, MAX_FRAME_EDGE),
        size.height.clamp(1, MAX_FRAME_EDGE),
    )
}

#[inline]
fn pixel_count(size: PhysicalSize<u32>) -> usize {
    size.width as usize * size.height as usize
}
