//! Serialization format versions.
//!
//! A single version number governs both the single node encoding and the map block layout.

/// Lowest version any codec in this crate understands.
pub const SER_FMT_VER_LOWEST: u8 = 0;

/// Highest version any codec in this crate understands, and the one written by default.
pub const SER_FMT_VER_HIGHEST: u8 = 17;

/// Lowest version of a stored map block. Earlier blocks used a compression scheme which is no
/// longer supported.
pub const SER_FMT_VER_LOWEST_BLOCK: u8 = 11;

/// Returns `true` if single nodes of this version can be read and written.
#[must_use]
pub fn ser_ver_supported(version: u8) -> bool {
    (SER_FMT_VER_LOWEST..=SER_FMT_VER_HIGHEST).contains(&version)
}

/// Returns `true` if map blocks of this version can be read and written.
#[must_use]
pub fn block_ser_ver_supported(version: u8) -> bool {
    (SER_FMT_VER_LOWEST_BLOCK..=SER_FMT_VER_HIGHEST).contains(&version)
}
