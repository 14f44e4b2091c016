//!
//! Compression helpers for the sections of a map block
//!

use anyhow::Result;
use anyhow::bail;
use miniz_oxide::inflate;
use miniz_oxide::inflate::core::DecompressorOxide;
use miniz_oxide::inflate::core::inflate_flags;
use zstd_safe::CParameter;
use zstd_safe::InBuffer;
use zstd_safe::OutBuffer;

#[must_use]
pub fn compress_zlib(uncompressed: &[u8], level: u8) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(uncompressed, level)
}

/// This method must detect the end of the stream.
/// 'input' may have more data past the end of the zlib stream
/// Returns (`bytes_consumed`, `uncompressed_data`)
///
/// Fails if the decompressed data would exceed `max_size` bytes.
pub fn decompress_zlib(input: &[u8], max_size: usize) -> Result<(usize, Vec<u8>)> {
    let flags = inflate_flags::TINFL_FLAG_PARSE_ZLIB_HEADER
        | inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF;
    let initial_len = input.len().saturating_mul(2).clamp(64, max_size.max(64));
    let mut ret: Vec<u8> = vec![0; initial_len];

    let mut decompressor = Box::<DecompressorOxide>::default();

    let mut in_pos = 0;
    let mut out_pos = 0;
    loop {
        // Wrap the whole output slice so we know we have enough of the
        // decompressed data for matches.
        let (status, in_consumed, out_consumed) = inflate::core::decompress(
            &mut decompressor,
            input.get(in_pos..).unwrap_or_default(),
            &mut ret,
            out_pos,
            flags,
        );
        in_pos += in_consumed;
        out_pos += out_consumed;

        match status {
            inflate::TINFLStatus::Done => {
                if out_pos > max_size {
                    bail!("zlib section exceeds {max_size} bytes");
                }
                ret.truncate(out_pos);
                return Ok((in_pos, ret));
            }

            inflate::TINFLStatus::HasMoreOutput => {
                // if the buffer has already reached the size limit, return an error
                if ret.len() >= max_size {
                    bail!("zlib section exceeds {max_size} bytes");
                }
                let new_len = ret.len().saturating_mul(2).min(max_size);
                ret.resize(new_len, 0);
            }

            err => bail!(
                "zlib decompression error: in_pos={}, out_pos={}, {:?}",
                in_pos,
                out_pos,
                err
            ),
        }
    }
}

///
/// Streaming Zstd compress
pub fn zstd_compress<F>(input: &[u8], level: i32, mut write: F) -> Result<()>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    const BUFSIZE: usize = 0x4000;
    let mut ctx = zstd_safe::CCtx::create();
    if let Err(error) = ctx.set_parameter(CParameter::CompressionLevel(level)) {
        bail!("zstd_compress level: {}", zstd_safe::get_error_name(error));
    }
    let mut buf = [0_u8; BUFSIZE];
    let mut input_buffer = InBuffer { src: input, pos: 0 };
    while input_buffer.pos < input.len() {
        let mut output_buffer = OutBuffer::around(&mut buf);
        match ctx.compress_stream(&mut output_buffer, &mut input_buffer) {
            Ok(_) => {
                let written = output_buffer.as_slice();
                if !written.is_empty() {
                    write(written)?;
                }
            }
            Err(error) => bail!("zstd_compress: {}", zstd_safe::get_error_name(error)),
        }
    }
    loop {
        let mut output_buffer = OutBuffer::around(&mut buf);
        match ctx.end_stream(&mut output_buffer) {
            Ok(code) => {
                let chunk = output_buffer.as_slice();
                if !chunk.is_empty() {
                    write(chunk)?;
                }
                if code == 0 {
                    break;
                }
            }
            Err(ec) => bail!("zstd_compress end: {}", zstd_safe::get_error_name(ec)),
        }
    }
    Ok(())
}

/// Streaming Zstd decompress
///
/// The input is allowed to contain more data than Zstd will consume.
/// Returns the actual number of bytes consumed from the input.
///
pub fn zstd_decompress<F>(input: &[u8], mut write: F) -> Result<usize>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    const BUFSIZE: usize = 0x4000;
    let mut buf = [0_u8; BUFSIZE];
    let mut ctx = zstd_safe::DCtx::create();

    let mut input_buffer = InBuffer { src: input, pos: 0 };
    loop {
        let mut output_buffer = OutBuffer::around(&mut buf);
        match ctx.decompress_stream(&mut output_buffer, &mut input_buffer) {
            Ok(code) => {
                let out = output_buffer.as_slice();
                if code == 0 {
                    if !out.is_empty() {
                        write(out)?;
                    }
                    break;
                }
                if out.is_empty() {
                    if input_buffer.pos() == input.len() {
                        bail!("zstd_decompress: frame is truncated");
                    }
                } else {
                    write(out)?;
                }
            }
            Err(ec) => bail!("zstd_decompress: {}", zstd_safe::get_error_name(ec)),
        }
    }
    Ok(input_buffer.pos())
}
