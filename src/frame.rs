//! A single point-in-time sample.
//!
//! A frame is an owned group of bytes holding one sample per channel,
//! interleaved. When coerced to a number the bytes are read as an unsigned
//! little-endian integer of arbitrary width.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul};

use num_bigint::BigUint;

use crate::audio::{Audio, Format};
use crate::error::{PaudError, Result};

/// One interleaved multi-channel sample.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    value: Vec<u8>,
}

impl Frame {
    /// Wrap raw bytes as-is.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Frame {
            value: bytes.into(),
        }
    }

    /// Encode `n` little-endian using the fewest bytes that can hold it.
    ///
    /// Zero takes one byte.
    pub fn from_integer(n: impl Into<BigUint>) -> Self {
        Frame {
            value: n.into().to_bytes_le(),
        }
    }

    /// Number of base-256 digits needed to represent `n` (at least 1).
    pub fn bytes_needed(n: &BigUint) -> usize {
        (n.bits() as usize).div_ceil(8).max(1)
    }

    /// Little-endian decode of the stored bytes, at any width.
    pub fn to_integer(&self) -> BigUint {
        BigUint::from_bytes_le(&self.value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.value
    }

    /// Byte width of this frame.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Two-frame audio (`frame + frame`).
    ///
    /// The format is inferred from the frames, so both must have the same width.
    pub fn concat(self, other: Frame) -> Result<Audio> {
        Audio::from_frames(vec![self, other])
    }

    /// Prepend this frame to `audio`, keeping the audio's format.
    pub fn prepend_to(self, audio: &Audio) -> Result<Audio> {
        let mut out = Audio::with_format(vec![self], audio.format())?;
        out.extend(audio.iter())?;
        Ok(out)
    }

    /// This frame repeated `times` times (`frame * n`).
    pub fn repeat(&self, times: i64) -> Result<Audio> {
        let times = usize::try_from(times).map_err(|_| {
            PaudError::InvalidOperand(format!("can't repeat a frame {times} times"))
        })?;
        self * times
    }

    /// Bytes with the most-significant zero bytes stripped.
    fn significant(&self) -> &[u8] {
        let end = self
            .value
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        &self.value[..end]
    }
}

pub(crate) fn sample_width_for(width: usize) -> Result<u16> {
    match u16::try_from(width) {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(PaudError::InvalidConfiguration(format!(
            "frame width {width} can't be used as a sample width"
        ))),
    }
}

impl Ord for Frame {
    /// Numeric order, regardless of width. Equal values of different
    /// widths order the narrower frame first.
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.iter().rev().cmp(b.iter().rev()))
            .then_with(|| self.value.len().cmp(&other.value.len()))
    }
}

impl PartialOrd for Frame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Mul<usize> for &Frame {
    type Output = Result<Audio>;

    fn mul(self, times: usize) -> Result<Audio> {
        let format = Format {
            sample_width: sample_width_for(self.len())?,
            ..Format::default()
        };
        &Audio::with_format(vec![self.clone()], format)? * times
    }
}

impl Add for Frame {
    type Output = Result<Audio>;

    fn add(self, other: Frame) -> Result<Audio> {
        self.concat(other)
    }
}

impl Add<&Audio> for Frame {
    type Output = Result<Audio>;

    fn add(self, audio: &Audio) -> Result<Audio> {
        self.prepend_to(audio)
    }
}

impl From<u128> for Frame {
    fn from(n: u128) -> Self {
        Frame::from_integer(n)
    }
}

impl From<&[u8]> for Frame {
    fn from(bytes: &[u8]) -> Self {
        Frame::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Frame::from_bytes(bytes)
    }
}

impl TryFrom<i64> for Frame {
    type Error = PaudError;

    fn try_from(n: i64) -> Result<Self> {
        if n < 0 {
            return Err(PaudError::InvalidValue(format!(
                "a frame can't hold the negative value {n}"
            )));
        }
        Ok(Frame::from_integer(n.unsigned_abs()))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_integer())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({self})")
    }
}
