//! Lazy, buffer-backed frame sequence.
//!
//! Holds one contiguous PCM payload and a frame width, and materializes a
//! [`Frame`] only when one is asked for. A trailing partial frame is
//! tolerated: it counts towards the length and is returned short.

use crate::error::{PaudError, Result};
use crate::frame::Frame;

/// Frames stored back to back in a single byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataFrames {
    data: Vec<u8>,
    frame_width: usize,
}

impl DataFrames {
    /// Wrap `data` as frames of `frame_width` bytes.
    pub fn new(data: impl Into<Vec<u8>>, frame_width: usize) -> Result<Self> {
        if frame_width == 0 {
            return Err(PaudError::InvalidConfiguration(
                "frame width must be at least 1 byte".into(),
            ));
        }
        Ok(DataFrames {
            data: data.into(),
            frame_width,
        })
    }

    /// Number of frames, counting a trailing partial frame.
    pub fn len(&self) -> usize {
        self.data.len().div_ceil(self.frame_width)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frame_width(&self) -> usize {
        self.frame_width
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Materialize the frame at `index`.
    pub fn get(&self, index: usize) -> Result<Frame> {
        let len = self.len();
        if index >= len {
            return Err(PaudError::IndexOutOfRange { index, len });
        }
        Ok(Frame::from_bytes(&self.data[self.byte_range(index)]))
    }

    /// Copy of the frames in `[start, stop)`.
    ///
    /// `None` means the start or end of the buffer. Bounds past the end
    /// are clamped, and `start > stop` gives an empty buffer.
    pub fn slice(&self, start: Option<usize>, stop: Option<usize>) -> DataFrames {
        let len = self.len();
        let stop = stop.unwrap_or(len).min(len);
        let start = start.unwrap_or(0).min(stop);
        let from = start * self.frame_width;
        let to = (stop * self.frame_width).min(self.data.len());
        DataFrames {
            data: self.data[from..to].to_vec(),
            frame_width: self.frame_width,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Frame> + '_ {
        self.data.chunks(self.frame_width).map(Frame::from_bytes)
    }

    /// Append one frame's bytes.
    pub fn append(&mut self, frame: &Frame) -> Result<()> {
        self.check_width(frame)?;
        self.data.extend_from_slice(frame.as_bytes());
        Ok(())
    }

    /// Append every frame, or none of them if any has the wrong width.
    pub fn extend<'a, I>(&mut self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let frames: Vec<&Frame> = frames.into_iter().collect();
        for frame in &frames {
            self.check_width(frame)?;
        }
        self.data.reserve(frames.len() * self.frame_width);
        for frame in frames {
            self.data.extend_from_slice(frame.as_bytes());
        }
        Ok(())
    }

    /// Replace the bytes of the frame at `index`.
    pub fn set_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        self.check_width(frame)?;
        let len = self.len();
        if index >= len {
            return Err(PaudError::IndexOutOfRange { index, len });
        }
        let range = self.byte_range(index);
        self.data.splice(range, frame.as_bytes().iter().copied());
        Ok(())
    }

    /// Remove the frame at `index`, shifting the rest of the buffer left.
    pub fn drop_frame(&mut self, index: usize) -> Result<Frame> {
        let len = self.len();
        if index >= len {
            return Err(PaudError::IndexOutOfRange { index, len });
        }
        let range = self.byte_range(index);
        let removed: Vec<u8> = self.data.drain(range).collect();
        Ok(Frame::from_bytes(removed))
    }

    /// New buffer with frame order reversed; bytes within a frame keep their order.
    pub fn reverse(&self) -> DataFrames {
        let mut data = Vec::with_capacity(self.data.len());
        for chunk in self.data.chunks(self.frame_width).rev() {
            data.extend_from_slice(chunk);
        }
        DataFrames {
            data,
            frame_width: self.frame_width,
        }
    }

    /// Smallest raw byte in the payload.
    ///
    /// Legacy sample-width heuristic: this is a byte statistic over the whole
    /// buffer, not a frame-level minimum.
    pub fn min(&self) -> Option<u8> {
        self.data.iter().copied().min()
    }

    /// Largest raw byte in the payload. See [`DataFrames::min`].
    pub fn max(&self) -> Option<u8> {
        self.data.iter().copied().max()
    }

    /// The whole buffer `times` times over. Fails instead of aborting when
    /// the result can't be allocated.
    pub(crate) fn repeated(&self, times: usize) -> Result<DataFrames> {
        let total = self
            .data
            .len()
            .checked_mul(times)
            .ok_or_else(|| too_large(self.len(), times))?;
        let mut data: Vec<u8> = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| too_large(self.len(), times))?;
        for _ in 0..times {
            data.extend_from_slice(&self.data);
        }
        Ok(DataFrames {
            data,
            frame_width: self.frame_width,
        })
    }

    /// Append another buffer's bytes. Frame widths must already match.
    pub(crate) fn append_buffer(&mut self, other: &DataFrames) {
        self.data.extend_from_slice(&other.data);
    }

    /// Replace frames `[start, stop)` with `frames`. Widths must already be checked.
    pub(crate) fn splice_frames(&mut self, start: usize, stop: usize, frames: &[Frame]) {
        let from = (start * self.frame_width).min(self.data.len());
        let to = (stop * self.frame_width).min(self.data.len()).max(from);
        let bytes: Vec<u8> = frames
            .iter()
            .flat_map(|f| f.as_bytes().iter().copied())
            .collect();
        self.data.splice(from..to, bytes);
    }

    fn byte_range(&self, index: usize) -> std::ops::Range<usize> {
        let start = index * self.frame_width;
        start..(start + self.frame_width).min(self.data.len())
    }

    fn check_width(&self, frame: &Frame) -> Result<()> {
        if frame.len() != self.frame_width {
            return Err(PaudError::TypeMismatch(format!(
                "frame is {} bytes wide, buffer frames are {}",
                frame.len(),
                self.frame_width
            )));
        }
        Ok(())
    }
}

pub(crate) fn too_large(frames: usize, times: usize) -> PaudError {
    PaudError::InvalidOperand(format!("{frames} frames repeated {times} times is too large"))
}
