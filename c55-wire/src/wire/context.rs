//! Settings which are handed to every serializer and deserializer.

use std::fmt::{self, Display};
use std::str::FromStr;

use anyhow::{Result, bail};

use super::util::{compress_zlib, decompress_zlib, zstd_compress, zstd_decompress};
use super::version::SER_FMT_VER_HIGHEST;

/// Compression level used for zlib unless configured otherwise.
pub const DEFAULT_ZLIB_LEVEL: u8 = 6;

/// Compression level used for zstd unless configured otherwise.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Upper bound for the decompressed size of a single section.
pub const DEFAULT_MAX_SECTION_SIZE: usize = 1 << 20;

/// The algorithm used for the compressed sections of a map block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(variant_size_differences, reason = "all variants are small enough")]
pub enum Compression {
    /// zlib stream with a compression level between 0 and 10
    Zlib { level: u8 },
    /// zstd frame with a compression level between 1 and 22
    Zstd { level: i32 },
}

impl Compression {
    /// Guesses the algorithm from the first bytes of a compressed section.
    ///
    /// The level can't be recovered and is set to the default.
    #[must_use]
    pub fn detect(section: &[u8]) -> Option<Self> {
        match *section {
            [0x28, 0xb5, 0x2f, 0xfd, ..] => Some(Self::Zstd {
                level: DEFAULT_ZSTD_LEVEL,
            }),
            // deflate method and a valid header check
            [cmf, flg, ..] if cmf & 0x0f == 8 && u16::from_be_bytes([cmf, flg]) % 31 == 0 => {
                Some(Self::default())
            }
            _ => None,
        }
    }

    /// Compresses a whole section.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Zlib { level } => Ok(compress_zlib(data, level)),
            Self::Zstd { level } => {
                let mut compressed = Vec::with_capacity(data.len() / 2);
                zstd_compress(data, level, |chunk| {
                    compressed.extend_from_slice(chunk);
                    Ok(())
                })?;
                Ok(compressed)
            }
        }
    }

    /// Decompresses a section from the start of `input`.
    ///
    /// `input` may contain more data past the end of the section.
    /// Returns (`bytes_consumed`, `decompressed_data`).
    pub fn decompress(self, input: &[u8], max_size: usize) -> Result<(usize, Vec<u8>)> {
        match self {
            Self::Zlib { .. } => decompress_zlib(input, max_size),
            Self::Zstd { .. } => {
                let mut decompressed = Vec::new();
                let consumed = zstd_decompress(input, |chunk| {
                    if decompressed.len() + chunk.len() > max_size {
                        bail!("section exceeds {max_size} bytes");
                    }
                    decompressed.extend_from_slice(chunk);
                    Ok(())
                })?;
                Ok((consumed, decompressed))
            }
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zlib {
            level: DEFAULT_ZLIB_LEVEL,
        }
    }
}

impl Display for Compression {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Zlib { level } => write!(formatter, "zlib (level {level})"),
            Self::Zstd { level } => write!(formatter, "zstd (level {level})"),
        }
    }
}

impl FromStr for Compression {
    type Err = anyhow::Error;

    /// Parses `zlib` or `zstd` with their default level.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "zlib" => Ok(Self::default()),
            "zstd" => Ok(Self::Zstd {
                level: DEFAULT_ZSTD_LEVEL,
            }),
            _ => bail!("unknown compression '{name}', expected 'zlib' or 'zstd'"),
        }
    }
}

/// Settings shared by all codecs of a single read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireContext {
    /// Serialization format version to write, or the one that is being read.
    pub ser_fmt: u8,
    /// Algorithm of the compressed sections.
    pub compression: Compression,
    /// Decompressing a section to more than this many bytes fails.
    pub max_section_size: usize,
}

impl WireContext {
    /// Latest version with the default compression.
    #[must_use]
    pub fn latest() -> Self {
        Self::for_version(SER_FMT_VER_HIGHEST)
    }

    /// The given version with the default compression.
    #[must_use]
    pub fn for_version(ser_fmt: u8) -> Self {
        Self {
            ser_fmt,
            compression: Compression::default(),
            max_section_size: DEFAULT_MAX_SECTION_SIZE,
        }
    }
}

impl Default for WireContext {
    fn default() -> Self {
        Self::latest()
    }
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    #[test]
    fn parse_compression() {
        assert_eq!("zlib".parse::<Compression>().unwrap(), Compression::default());
        assert_eq!(
            "zstd".parse::<Compression>().unwrap(),
            Compression::Zstd {
                level: DEFAULT_ZSTD_LEVEL
            }
        );
        assert!("lzma".parse::<Compression>().is_err());
    }

    #[test]
    fn round_trip_with_trailing_data() {
        let data: Vec<u8> = (0..=255).cycle().take(5000).collect();
        for compression in [Compression::default(), Compression::Zstd { level: 1 }] {
            let mut compressed = compression.compress(&data).unwrap();
            let length = compressed.len();
            compressed.extend_from_slice(b"trailing");
            let (consumed, decompressed) = compression.decompress(&compressed, 1 << 16).unwrap();
            assert_eq!(consumed, length, "{compression}");
            assert_eq!(decompressed, data, "{compression}");
        }
    }

    #[test]
    fn detect() {
        for compression in [Compression::Zlib { level: 1 }, Compression::Zstd { level: 1 }] {
            let compressed = compression.compress(b"some section").unwrap();
            let detected = Compression::detect(&compressed).unwrap();
            assert_eq!(
                mem::discriminant(&detected),
                mem::discriminant(&compression)
            );
        }
        assert_eq!(Compression::detect(&[1, 2, 3, 4]), None);
        assert_eq!(Compression::detect(&[]), None);
    }

    #[test]
    fn size_limit() {
        let data = vec![0_u8; 10_000];
        for compression in [Compression::default(), Compression::Zstd { level: 1 }] {
            let compressed = compression.compress(&data).unwrap();
            assert!(compression.decompress(&compressed, 9_999).is_err(), "{compression}");
            assert!(compression.decompress(&compressed, 10_000).is_ok(), "{compression}");
        }
    }
}
