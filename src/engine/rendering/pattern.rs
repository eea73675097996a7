//! ### English
//! Deterministic software renderer (scrolling gradient tinted by the shader bytes).
//!
//! Useful as a stand-in when no native compute renderer is available, and as a reference for the
//! `Renderer` contract.
//!
//! ### 中文
//! 确定性的软件渲染器（按 shader 字节着色的滚动渐变）。
//!
//! 在没有原生计算渲染器时可作为替身，也可作为 `Renderer` 约定的参考实现。

use crate::engine::error::RendererError;
use crate::engine::frame::{FrameBuffer, pack_rgba};

use super::{Renderer, ShaderBinary};

#[derive(Debug, Default)]
pub struct PatternRenderer {
    /// ### English
    /// Blue channel derived from the shader bytes; `None` until `init`.
    ///
    /// ### 中文
    /// 由 shader 字节派生的蓝色通道；`init` 之前为 `None`。
    tint: Option<u8>,
    frame_index: u64,
}

impl PatternRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Pixel the renderer writes at `(x, y)` for frame `frame_index` with the given tint.
    ///
    /// ### 中文
    /// 渲染器在第 `frame_index` 帧、给定 tint 下于 `(x, y)` 写入的像素值。
    #[inline]
    pub fn expected_pixel(x: u32, y: u32, frame_index: u64, tint: u8) -> u32 {
        let offset = frame_index as u32;
        pack_rgba(
            x.wrapping_add(offset) as u8,
            y.wrapping_add(offset) as u8,
            tint,
            u8::MAX,
        )
    }

    pub fn tint(&self) -> Option<u8> {
        self.tint
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_index
    }
}

impl Renderer for PatternRenderer {
    fn init(&mut self, shader: ShaderBinary) -> Result<(), RendererError> {
        self.tint = Some(fold_tint(shader.as_bytes()));
        self.frame_index = 0;
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameBuffer) -> Result<(), RendererError> {
        let Some(tint) = self.tint else {
            return Err(RendererError::new("render called before init"));
        };

        let frame_index = self.frame_index;
        for y in 0..frame.height() {
            let Some(row) = frame.row_mut(y) else {
                break;
            };
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = Self::expected_pixel(x as u32, y, frame_index, tint);
            }
        }
        self.frame_index += 1;
        Ok(())
    }
}

/// ### English
/// FNV-1a over the shader bytes, folded to one byte.
///
/// ### 中文
/// 对 shader 字节做 FNV-1a 哈希并折叠为一个字节。
fn fold_tint(bytes: &[u8]) -> u8 {
    let mut hash: u32 = 0x811C_9DC5;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    (hash ^ (hash >> 8) ^ (hash >> 16) ^ (hash >> 24)) as u8
}
