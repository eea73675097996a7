use crate::engine::error::RenderError;

/// ### English
/// Immutable, non-empty shader binary handed to `Renderer::init`.
///
/// The format is opaque to the render loop (typically SPIR-V for a compute pipeline).
///
/// ### 中文
/// 交给 `Renderer::init` 的不可变、非空 shader 二进制。
///
/// 其格式对渲染循环不透明（通常是计算管线使用的 SPIR-V）。
#[derive(Clone, PartialEq, Eq)]
pub struct ShaderBinary {
    bytes: Box<[u8]>,
}

impl ShaderBinary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, RenderError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(RenderError::EmptyShader);
        }
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// ### English
    /// Always `false`; kept for API symmetry with `len`.
    ///
    /// ### 中文
    /// 恒为 `false`；仅为与 `len` 保持 API 对称。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ShaderBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderBinary")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl AsRef<[u8]> for ShaderBinary {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_bytes() {
        assert!(matches!(
            ShaderBinary::new(Vec::new()),
            Err(RenderError::EmptyShader)
        ));
    }

    #[test]
    fn keeps_bytes_verbatim() {
        let shader = ShaderBinary::new(vec![0x03, 0x02, 0x23, 0x07]).unwrap();
        assert_eq!(shader.len(), 4);
        assert!(!shader.is_empty());
        assert_eq!(shader.as_bytes(), &[0x03, 0x02, 0x23, 0x07]);
        assert_eq!(format!("{shader:?}"), "ShaderBinary { len: 4 }");
    }
}
