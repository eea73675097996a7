//! ### English
//! View configuration (TOML).
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ### 中文
//! view 配置（TOML）。
//!
//! 所有字段都有默认值，因此空文档也是合法配置。

use std::path::Path;
use std::time::Duration;

use dpi::PhysicalSize;
use serde::Deserialize;

use super::error::ConfigError;
use super::frame::MAX_FRAME_EDGE;

/// ### English
/// Default frame buffer edge length, matching the compute dispatch size of the native renderer.
///
/// ### 中文
/// 默认帧缓冲边长，与原生渲染器的 compute dispatch 尺寸一致。
pub const DEFAULT_FRAME_EDGE: u32 = 1024;

pub const DEFAULT_MAX_FRAME_EDGE: u32 = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderViewConfig {
    pub frame: FrameConfig,
    pub render: RenderConfig,
    pub telemetry: TelemetryConfig,
}

/// ### English
/// Frame buffer geometry.
///
/// ### 中文
/// 帧缓冲尺寸配置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    /// ### English
    /// Resize the buffer to `min(width, height)` squared when the surface changes size.
    ///
    /// ### 中文
    /// surface 尺寸变化时，将缓冲区调整为 `min(width, height)` 的正方形。
    pub resize_on_surface_change: bool,
    /// ### English
    /// Upper bound for the frame edge (initial size and surface-driven resizes), at most
    /// `MAX_FRAME_EDGE`.
    ///
    /// ### 中文
    /// 帧边长上限（初始尺寸与 surface 驱动的 resize 都受其约束），不超过 `MAX_FRAME_EDGE`。
    pub max_edge: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub thread_name: String,
    /// ### English
    /// Consecutive render failures tolerated before the loop stops (`0` = never stop).
    ///
    /// ### 中文
    /// 循环停止前允许的连续渲染失败次数（`0` = 永不因失败停止）。
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub period_ms: u64,
    pub timer_thread_name: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_EDGE,
            height: DEFAULT_FRAME_EDGE,
            resize_on_surface_change: false,
            max_edge: DEFAULT_MAX_FRAME_EDGE,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thread_name: "ComputeViewRender".to_string(),
            max_consecutive_failures: 30,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            timer_thread_name: "ComputeViewTelemetry".to_string(),
        }
    }
}

impl RenderViewConfig {
    /// ### English
    /// Parses and validates a TOML document.
    ///
    /// ### 中文
    /// 解析并校验 TOML 文档。
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// ### English
    /// Reads, parses and validates a TOML file.
    ///
    /// ### 中文
    /// 读取、解析并校验 TOML 文件。
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.max_edge == 0 || self.frame.max_edge > MAX_FRAME_EDGE {
            return Err(ConfigError::Invalid {
                field: "frame.max_edge",
                reason: "must be between 1 and 8192",
            });
        }
        if self.frame.width > self.frame.max_edge {
            return Err(ConfigError::Invalid {
                field: "frame.width",
                reason: "must not exceed frame.max_edge",
            });
        }
        if self.frame.height > self.frame.max_edge {
            return Err(ConfigError::Invalid {
                field: "frame.height",
                reason: "must not exceed frame.max_edge",
            });
        }
        if self.frame.width == 0 {
            return Err(ConfigError::Invalid {
                field: "frame.width",
                reason: "must be non-zero",
            });
        }
        if self.frame.height == 0 {
            return Err(ConfigError::Invalid {
                field: "frame.height",
                reason: "must be non-zero",
            });
        }
        if self.telemetry.period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "telemetry.period_ms",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }

    pub fn frame_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.frame.width, self.frame.height)
    }

    pub fn telemetry_period(&self) -> Duration {
        Duration::from_millis(self.telemetry.period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RenderViewConfig::from_toml_str("").unwrap();
        assert_eq!(config, RenderViewConfig::default());
        assert_eq!(config.frame_size(), PhysicalSize::new(1024, 1024));
        assert_eq!(config.telemetry_period(), Duration::from_secs(1));
        assert!(!config.frame.resize_on_surface_change);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RenderViewConfig::from_toml_str(
            r#"
            [frame]
            width = 640
            resize_on_surface_change = true

            [render]
            max_consecutive_failures = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.frame.width, 640);
        assert_eq!(config.frame.height, DEFAULT_FRAME_EDGE);
        assert!(config.frame.resize_on_surface_change);
        assert_eq!(config.render.max_consecutive_failures, 5);
        assert_eq!(config.render.thread_name, "ComputeViewRender");
        assert_eq!(config.telemetry.period_ms, 1000);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = RenderViewConfig::from_toml_str("[frame]\nheight = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "frame.height",
                ..
            }
        ));
    }

    #[test]
    fn rejects_oversized_frames() {
        let err = RenderViewConfig::from_toml_str("[frame]\nwidth = 4294967295\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "frame.width",
                ..
            }
        ));

        let err = RenderViewConfig::from_toml_str("[frame]\nmax_edge = 100000\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "frame.max_edge",
                ..
            }
        ));

        let config =
            RenderViewConfig::from_toml_str("[frame]\nmax_edge = 8192\nwidth = 8192\n").unwrap();
        assert_eq!(config.frame_size(), PhysicalSize::new(8192, 1024));
    }

    #[test]
    fn rejects_zero_telemetry_period() {
        let err = RenderViewConfig::from_toml_str("[telemetry]\nperiod_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn reports_parse_errors() {
        let err = RenderViewConfig::from_toml_str("[frame\nwidth = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RenderViewConfig::load_from_file("/nonexistent/compute-view.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
