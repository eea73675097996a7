//! ### English
//! Cache-line sized padding helpers shared by the atomics written from the render thread.
//!
//! ### 中文
//! 渲染线程写入的原子字段共用的 cache line padding 工具。

/// ### English
/// The cache line size we optimize for (bytes).
///
/// ### 中文
/// 作为优化目标的 cache line 大小（字节）。
pub(crate) const CACHE_LINE_BYTES: usize = 64;

/// ### English
/// Returns the padding bytes needed to advance to the next cache-line boundary.
///
/// Used with `#[repr(C, align(64))]` structs so that the render thread's hot counters and the
/// host-written control flags never share a line.
///
/// #### Parameters
/// - `bytes_used`: Number of bytes already occupied by preceding fields.
///
/// ### 中文
/// 返回将偏移推进到下一个 cache line 边界所需的 padding 字节数。
///
/// 配合 `#[repr(C, align(64))]` 结构体使用，使渲染线程的热计数器与宿主写入的控制标记不共用同一缓存行。
///
/// #### 参数
/// - `bytes_used`：前置字段已占用的字节数。
#[inline]
pub(crate) const fn pad_to_cache_line(bytes_used: usize) -> usize {
    let rem = bytes_used % CACHE_LINE_BYTES;
    if rem == 0 { 0 } else { CACHE_LINE_BYTES - rem }
}

/// ### English
/// Padding after `count` fields of type `T` laid out back to back.
///
/// ### 中文
/// 连续排列 `count` 个 `T` 字段之后所需的 padding 字节数。
#[inline]
pub(crate) const fn pad_after_n<T>(count: usize) -> usize {
    pad_to_cache_line(std::mem::size_of::<T>() * count)
}
