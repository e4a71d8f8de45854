//! RIFF/WAVE container header.
//!
//! Layout written by [`write_header`] (44 bytes, all little-endian):
//!
//! ```text
//! "RIFF" <riff size:u32> "WAVE"
//! "fmt " <16:u32> <format tag:u16> <channels:u16> <frame rate:u32>
//!        <byte rate:u32> <block align:u16> <bits per sample:u16>
//! "data" <payload bytes:u32>
//! ```
//!
//! Reading is more lenient: unknown chunks before `data` are skipped and
//! `WAVE_FORMAT_EXTENSIBLE` is accepted when its sub-format is PCM.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::audio::Format;
use crate::error::{PaudError, Result};

const RIFF_ID: [u8; 4] = *b"RIFF";
const WAVE_ID: [u8; 4] = *b"WAVE";
const FMT_ID: [u8; 4] = *b"fmt ";
const DATA_ID: [u8; 4] = *b"data";

/// Uncompressed integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// Format tag whose real encoding lives in a sub-format GUID.
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the header produced by [`write_header`].
pub const HEADER_LEN: usize = 44;

/// Fields of the `fmt ` chunk plus the location of the `data` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub format_tag: u16,
    pub channels: u16,
    pub frame_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Byte offset of the first payload byte.
    pub data_offset: usize,
    /// Payload bytes actually present (clamped to the input length).
    pub data_len: usize,
}

impl WavHeader {
    /// Bytes per sample, rounding partial bytes up.
    pub fn sample_width(&self) -> u16 {
        self.bits_per_sample.div_ceil(8)
    }

    pub fn frame_width(&self) -> usize {
        self.channels as usize * self.sample_width() as usize
    }

    /// Whole frames in the payload.
    pub fn frame_count(&self) -> usize {
        self.data_len / self.frame_width()
    }

    pub fn format(&self) -> Format {
        Format {
            channels: self.channels,
            sample_width: self.sample_width(),
            frame_rate: self.frame_rate,
        }
    }
}

/// Parse a WAVE header from the start of `bytes`.
pub fn parse_header(bytes: &[u8]) -> Result<WavHeader> {
    let mut reader = Cursor::new(bytes);

    let mut id = [0u8; 4];
    reader.read_exact(&mut id).map_err(truncated)?;
    if id != RIFF_ID {
        return Err(PaudError::UnsupportedFormat(
            "file does not start with a RIFF id".into(),
        ));
    }
    let _riff_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    reader.read_exact(&mut id).map_err(truncated)?;
    if id != WAVE_ID {
        return Err(PaudError::UnsupportedFormat("not a WAVE file".into()));
    }

    let mut fmt: Option<FmtChunk> = None;
    loop {
        if reader.read_exact(&mut id).is_err() {
            return Err(PaudError::UnsupportedFormat("missing data chunk".into()));
        }
        let size = reader.read_u32::<LittleEndian>().map_err(truncated)? as u64;
        let body_start = reader.position();

        match id {
            FMT_ID => {
                fmt = Some(read_fmt(&mut reader, size)?);
            }
            DATA_ID => {
                let fmt = fmt.ok_or_else(|| {
                    PaudError::UnsupportedFormat("data chunk before fmt chunk".into())
                })?;
                let data_offset = body_start as usize;
                let available = bytes.len() - data_offset;
                let data_len = (size as usize).min(available);
                if data_len < size as usize {
                    log::warn!(
                        "WAV data chunk declares {size} bytes but only {available} are present"
                    );
                }
                return Ok(WavHeader {
                    format_tag: fmt.format_tag,
                    channels: fmt.channels,
                    frame_rate: fmt.frame_rate,
                    byte_rate: fmt.byte_rate,
                    block_align: fmt.block_align,
                    bits_per_sample: fmt.bits_per_sample,
                    data_offset,
                    data_len,
                });
            }
            _ => {
                log::trace!("skipping WAV chunk {:?} ({size} bytes)", String::from_utf8_lossy(&id));
            }
        }

        // Chunks are word aligned: odd sizes carry one pad byte.
        let next = body_start + size + (size & 1);
        reader.seek(SeekFrom::Start(next))?;
    }
}

/// Write a canonical 44-byte PCM header for `data_len` payload bytes.
pub fn write_header<W: Write>(writer: &mut W, format: &Format, data_len: usize) -> Result<()> {
    let block_align = u16::try_from(format.frame_width()).map_err(|_| {
        PaudError::InvalidConfiguration(format!(
            "frame width {} does not fit a WAV header",
            format.frame_width()
        ))
    })?;
    let bits_per_sample = format.sample_width.checked_mul(8).ok_or_else(|| {
        PaudError::InvalidConfiguration(format!(
            "sample width {} does not fit a WAV header",
            format.sample_width
        ))
    })?;
    let byte_rate = format
        .frame_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| PaudError::InvalidConfiguration("byte rate overflows 32 bits".into()))?;
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36 + 1).is_some())
        .ok_or_else(|| {
            PaudError::InvalidConfiguration(format!(
                "payload of {data_len} bytes is too large for a WAV container"
            ))
        })?;
    let riff_size = 36 + data_size + (data_size & 1);

    writer.write_all(&RIFF_ID)?;
    writer.write_u32::<LittleEndian>(riff_size)?;
    writer.write_all(&WAVE_ID)?;

    writer.write_all(&FMT_ID)?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(WAVE_FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(format.channels)?;
    writer.write_u32::<LittleEndian>(format.frame_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(bits_per_sample)?;

    writer.write_all(&DATA_ID)?;
    writer.write_u32::<LittleEndian>(data_size)?;
    Ok(())
}

struct FmtChunk {
    format_tag: u16,
    channels: u16,
    frame_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

fn read_fmt(reader: &mut Cursor<&[u8]>, size: u64) -> Result<FmtChunk> {
    if size < 16 {
        return Err(PaudError::UnsupportedFormat(format!(
            "fmt chunk is {size} bytes, expected at least 16"
        )));
    }
    let format_tag = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let channels = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let frame_rate = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let byte_rate = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let block_align = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let bits_per_sample = reader.read_u16::<LittleEndian>().map_err(truncated)?;

    match format_tag {
        WAVE_FORMAT_PCM => {}
        WAVE_FORMAT_EXTENSIBLE => {
            // cbSize, valid bits, channel mask, then the sub-format GUID whose
            // first two bytes carry the real format tag.
            if size < 40 {
                return Err(PaudError::UnsupportedFormat(
                    "extensible fmt chunk is too short".into(),
                ));
            }
            let _extension_size = reader.read_u16::<LittleEndian>().map_err(truncated)?;
            let _valid_bits = reader.read_u16::<LittleEndian>().map_err(truncated)?;
            let _channel_mask = reader.read_u32::<LittleEndian>().map_err(truncated)?;
            let sub_format = reader.read_u16::<LittleEndian>().map_err(truncated)?;
            if sub_format != WAVE_FORMAT_PCM {
                return Err(PaudError::UnsupportedFormat(format!(
                    "unknown extensible sub-format {sub_format:#06x}"
                )));
            }
        }
        other => {
            return Err(PaudError::UnsupportedFormat(format!(
                "unknown compression tag {other:#06x}"
            )));
        }
    }

    if channels == 0 {
        return Err(PaudError::UnsupportedFormat("bad # of channels".into()));
    }
    if bits_per_sample == 0 {
        return Err(PaudError::UnsupportedFormat("bad sample width".into()));
    }
    if frame_rate == 0 {
        return Err(PaudError::UnsupportedFormat("bad frame rate".into()));
    }

    Ok(FmtChunk {
        format_tag,
        channels,
        frame_rate,
        byte_rate,
        block_align,
        bits_per_sample,
    })
}

/// A short read inside the header means the header itself is malformed.
fn truncated(e: io::Error) -> PaudError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        PaudError::UnsupportedFormat("truncated WAV header".into())
    } else {
        PaudError::Io(e)
    }
}
