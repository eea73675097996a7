//! ### English
//! Frame-rate and load telemetry: a pure sampler plus the recurring timer that drives it.
//!
//! ### 中文
//! 帧率与负载遥测：纯计算采样器，以及驱动它的周期计时器。

mod latest;
mod sampler;
mod timer;

pub(crate) use latest::LatestSample;
pub use sampler::{TelemetrySample, TelemetrySampler};
pub use timer::{RecurringTimer, TimerHandle};
