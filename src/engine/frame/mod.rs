//! ### English
//! Frame-side state: the pixel buffer the renderer fills, the counters the render thread
//! publishes, and the coalesced resize request the host posts.
//!
//! ### 中文
//! 帧相关状态：渲染器填充的像素缓冲、渲染线程发布的计数器，以及宿主投递的合并 resize 请求。

mod buffer;
mod counters;
mod resize;

pub use buffer::{FrameBuffer, MAX_FRAME_EDGE, PixelFormat, pack_rgba};
pub use counters::{FrameCounters, FrameCountersSnapshot};
pub(crate) use resize::CoalescedResize;
