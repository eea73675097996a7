#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn compute_view_abi_version() -> u32 {
    super::COMPUTE_VIEW_ABI_VERSION
}
