//! Bridge from raw PCM to plain numeric arrays.
//!
//! Samples are read as signed little-endian integers of `sample_width`
//! bytes and laid out frame-major, `(frame_count, channels)`.

use crate::audio::Audio;
use crate::error::{PaudError, Result};

/// Element type requested from [`Audio::to_numeric_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// The samples' own width, unscaled.
    Native,
    I8,
    I16,
    I32,
    I64,
    /// Floats in `[-1, 1)`.
    F32,
    F64,
}

impl NumericType {
    /// Largest value of an integer target type.
    fn int_max(self) -> Option<i128> {
        match self {
            NumericType::I8 => Some(i8::MAX as i128),
            NumericType::I16 => Some(i16::MAX as i128),
            NumericType::I32 => Some(i32::MAX as i128),
            NumericType::I64 => Some(i64::MAX as i128),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    Int(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// A row-major `(frames, channels)` array of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub frames: usize,
    pub channels: usize,
    pub data: NumericData,
}

impl NumericArray {
    pub fn shape(&self) -> (usize, usize) {
        (self.frames, self.channels)
    }
}

impl Audio {
    /// Interpret the payload as signed samples, optionally rescaled.
    ///
    /// Integer targets are scaled by `(target_max + 1) / peak_amplitude`
    /// (truncating toward zero); float targets are divided by
    /// `peak_amplitude`.
    pub fn to_numeric_array(&self, dtype: NumericType) -> Result<NumericArray> {
        let width = self.sample_width() as usize;
        if width == 0 || self.channels() == 0 {
            return Err(PaudError::InvalidConfiguration(format!(
                "can't lay out samples for format {:?}",
                self.format()
            )));
        }
        if width > 8 {
            return Err(PaudError::UnsupportedFormat(format!(
                "{width}-byte samples don't fit a 64-bit integer"
            )));
        }

        let payload = self.frames().payload();
        if payload.len() % self.frame_width() != 0 {
            return Err(PaudError::InvalidConfiguration(
                "payload ends with a partial frame".into(),
            ));
        }

        let samples = payload.chunks_exact(width).map(signed_le);
        // peak amplitude, 256^width / 2, as an exact power of two
        let peak: i128 = 1 << (8 * width - 1);

        let data = match dtype {
            NumericType::Native => NumericData::Int(samples.collect()),
            NumericType::F32 => {
                NumericData::F32(samples.map(|s| (s as f64 / peak as f64) as f32).collect())
            }
            NumericType::F64 => NumericData::F64(samples.map(|s| s as f64 / peak as f64).collect()),
            int => {
                let scale = int.int_max().map_or(peak, |max| max + 1);
                NumericData::Int(
                    samples
                        .map(|s| (s as i128 * scale / peak) as i64)
                        .collect(),
                )
            }
        };

        Ok(NumericArray {
            frames: self.frame_count(),
            channels: self.channels() as usize,
            data,
        })
    }
}

/// Sign-extending little-endian decode of up to 8 bytes.
fn signed_le(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    let shift = 64 - 8 * bytes.len() as u32;
    (i64::from_le_bytes(buf) << shift) >> shift
}
