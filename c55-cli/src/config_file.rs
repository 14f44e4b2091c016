use std::{
    fs,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use c55_wire::{
    Compression, SER_FMT_VER_HIGHEST, WireContext,
    wire::context::{DEFAULT_MAX_SECTION_SIZE, DEFAULT_ZLIB_LEVEL, DEFAULT_ZSTD_LEVEL},
};
use clap::ValueEnum;
use log::{debug, warn};

/// The compression algorithms selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CompressionKind {
    Zlib,
    Zstd,
}

/// Settings of a single run, read from a `key = value` file and the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) ser_fmt: u8,
    pub(crate) compression: CompressionKind,
    pub(crate) compression_level: Option<i32>,
    pub(crate) max_section_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ser_fmt: SER_FMT_VER_HIGHEST,
            compression: CompressionKind::Zlib,
            compression_level: None,
            max_section_size: DEFAULT_MAX_SECTION_SIZE,
        }
    }
}

impl Settings {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let reader = fs::File::open(path)
            .with_context(|| format!("cannot open settings file {}", path.display()))?;
        let reader = BufReader::new(reader);

        let mut settings = Self::default();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            settings
                .parse_line(&line)
                .with_context(|| format!("{}:{}", path.display(), line_index + 1))?;
        }
        debug!("loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(anyhow!("invalid settings line: {line}"));
        };
        self.set(key.trim(), value.trim())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "serialization_version" => self.ser_fmt = value.parse()?,
            "compression" => {
                self.compression = CompressionKind::from_str(value, true).map_err(|err| {
                    anyhow!("invalid compression '{value}': {err}")
                })?;
            }
            "compression_level" => self.compression_level = Some(value.parse()?),
            "max_section_size" => self.max_section_size = value.parse()?,
            _ => warn!("ignoring unknown setting '{key}'"),
        }
        Ok(())
    }

    /// Resolves the configured compression and checks its level.
    pub(crate) fn compression(&self) -> Result<Compression> {
        match self.compression {
            CompressionKind::Zlib => {
                let level = self
                    .compression_level
                    .unwrap_or(DEFAULT_ZLIB_LEVEL.into());
                if !(0..=10).contains(&level) {
                    bail!("zlib compression level must be between 0 and 10, got {level}");
                }
                Ok(Compression::Zlib {
                    level: u8::try_from(level)?,
                })
            }
            CompressionKind::Zstd => {
                let level = self.compression_level.unwrap_or(DEFAULT_ZSTD_LEVEL);
                if !(1..=22).contains(&level) {
                    bail!("zstd compression level must be between 1 and 22, got {level}");
                }
                Ok(Compression::Zstd { level })
            }
        }
    }

    pub(crate) fn context(&self) -> Result<WireContext> {
        Ok(WireContext {
            ser_fmt: self.ser_fmt,
            compression: self.compression()?,
            max_section_size: self.max_section_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Settings> {
        let mut settings = Settings::default();
        for line in text.lines() {
            settings.parse_line(line)?;
        }
        Ok(settings)
    }

    #[test]
    fn defaults() {
        let context = Settings::default().context().unwrap();
        assert_eq!(context, WireContext::latest());
    }

    #[test]
    fn all_keys() {
        let settings = parse(
            "# written by hand\n\
             \n\
             serialization_version = 15\n\
             compression=zstd\n\
             compression_level = 9\n\
             max_section_size = 65536\n",
        )
        .unwrap();
        assert_eq!(
            settings.context().unwrap(),
            WireContext {
                ser_fmt: 15,
                compression: Compression::Zstd { level: 9 },
                max_section_size: 65536,
            }
        );
    }

    #[test]
    fn level_follows_the_algorithm() {
        let mut settings = parse("compression_level = 9").unwrap();
        assert_eq!(
            settings.compression().unwrap(),
            Compression::Zlib { level: 9 }
        );
        settings.compression_level = Some(15);
        assert!(settings.compression().is_err());
        settings.compression = CompressionKind::Zstd;
        assert_eq!(
            settings.compression().unwrap(),
            Compression::Zstd { level: 15 }
        );
    }

    #[test]
    fn invalid_lines() {
        assert!(parse("serialization_version").is_err());
        assert!(parse("serialization_version = seventeen").is_err());
        assert!(parse("compression = lzma").is_err());
        assert!(parse("unknown_key = 1").is_ok());
    }
}
