//! Frame storage behind an [`Audio`](crate::Audio).
//!
//! Audio holds its frames either eagerly, one [`Frame`] per sample, or lazily
//! as a [`DataFrames`] byte view. Both answer to [`FrameSequence`], and
//! [`FrameStore`] picks between them.

use crate::data_frames::{DataFrames, too_large};
use crate::error::{PaudError, Result};
use crate::frame::Frame;

/// What a frame container has to support to back an audio buffer.
///
/// Operations that produce a new sequence always copy; nothing returned here
/// aliases the source buffer.
pub trait FrameSequence {
    fn frame_count(&self) -> usize;

    fn frame_at(&self, index: usize) -> Result<Frame>;

    fn push_frame(&mut self, frame: Frame) -> Result<()>;

    fn slice_frames(&self, start: usize, stop: usize) -> Self
    where
        Self: Sized;

    fn reversed_frames(&self) -> Self
    where
        Self: Sized;
}

impl FrameSequence for Vec<Frame> {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame_at(&self, index: usize) -> Result<Frame> {
        self.get(index).cloned().ok_or(PaudError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.push(frame);
        Ok(())
    }

    fn slice_frames(&self, start: usize, stop: usize) -> Self {
        let stop = stop.min(self.len());
        let start = start.min(stop);
        self[start..stop].to_vec()
    }

    fn reversed_frames(&self) -> Self {
        self.iter().rev().cloned().collect()
    }
}

impl FrameSequence for DataFrames {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame_at(&self, index: usize) -> Result<Frame> {
        self.get(index)
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.append(&frame)
    }

    fn slice_frames(&self, start: usize, stop: usize) -> Self {
        self.slice(Some(start), Some(stop))
    }

    fn reversed_frames(&self) -> Self {
        self.reverse()
    }
}

/// Eager or lazy frame storage.
#[derive(Debug, Clone)]
pub enum FrameStore {
    Eager(Vec<Frame>),
    Lazy(DataFrames),
}

impl FrameStore {
    pub fn len(&self) -> usize {
        match self {
            FrameStore::Eager(frames) => frames.frame_count(),
            FrameStore::Lazy(frames) => frames.frame_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, FrameStore::Lazy(_))
    }

    pub fn get(&self, index: usize) -> Result<Frame> {
        match self {
            FrameStore::Eager(frames) => frames.frame_at(index),
            FrameStore::Lazy(frames) => frames.frame_at(index),
        }
    }

    pub fn iter(&self) -> FrameIter<'_> {
        match self {
            FrameStore::Eager(frames) => FrameIter::Eager(frames.iter()),
            FrameStore::Lazy(frames) => FrameIter::Lazy {
                chunks: frames.as_bytes().chunks(frames.frame_width()),
            },
        }
    }

    pub fn push(&mut self, frame: Frame) -> Result<()> {
        match self {
            FrameStore::Eager(frames) => frames.push_frame(frame),
            FrameStore::Lazy(frames) => frames.push_frame(frame),
        }
    }

    pub fn slice(&self, start: usize, stop: usize) -> FrameStore {
        match self {
            FrameStore::Eager(frames) => FrameStore::Eager(frames.slice_frames(start, stop)),
            FrameStore::Lazy(frames) => FrameStore::Lazy(frames.slice_frames(start, stop)),
        }
    }

    pub fn reversed(&self) -> FrameStore {
        match self {
            FrameStore::Eager(frames) => FrameStore::Eager(frames.reversed_frames()),
            FrameStore::Lazy(frames) => FrameStore::Lazy(frames.reversed_frames()),
        }
    }

    pub fn set(&mut self, index: usize, frame: Frame) -> Result<()> {
        match self {
            FrameStore::Eager(frames) => {
                let len = frames.len();
                let slot = frames
                    .get_mut(index)
                    .ok_or(PaudError::IndexOutOfRange { index, len })?;
                *slot = frame;
                Ok(())
            }
            FrameStore::Lazy(frames) => frames.set_frame(index, &frame),
        }
    }

    /// The whole sequence `times` times over.
    ///
    /// Sizes that overflow or can't be allocated are an `InvalidOperand`.
    pub fn repeated(&self, times: usize) -> Result<FrameStore> {
        match self {
            FrameStore::Eager(frames) => {
                let count = frames
                    .len()
                    .checked_mul(times)
                    .ok_or_else(|| too_large(frames.len(), times))?;
                let bytes = frames
                    .iter()
                    .map(Frame::len)
                    .sum::<usize>()
                    .checked_mul(times)
                    .filter(|&bytes| bytes <= isize::MAX as usize)
                    .ok_or_else(|| too_large(frames.len(), times))?;
                log::trace!("repeating {count} frames ({bytes} payload bytes)");
                let mut out: Vec<Frame> = Vec::new();
                out.try_reserve_exact(count)
                    .map_err(|_| too_large(frames.len(), times))?;
                for _ in 0..times {
                    out.extend(frames.iter().cloned());
                }
                Ok(FrameStore::Eager(out))
            }
            FrameStore::Lazy(frames) => Ok(FrameStore::Lazy(frames.repeated(times)?)),
        }
    }

    /// Replace `[start, stop)` with `frames`, growing or shrinking the store.
    pub fn splice(&mut self, start: usize, stop: usize, frames: Vec<Frame>) {
        let stop = stop.min(self.len());
        let start = start.min(stop);
        match self {
            FrameStore::Eager(existing) => {
                existing.splice(start..stop, frames);
            }
            FrameStore::Lazy(existing) => existing.splice_frames(start, stop, &frames),
        }
    }

    /// The raw PCM payload: every frame's bytes, concatenated.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            FrameStore::Eager(frames) => frames
                .iter()
                .flat_map(|f| f.as_bytes().iter().copied())
                .collect(),
            FrameStore::Lazy(frames) => frames.as_bytes().to_vec(),
        }
    }

    /// Same frames, materialized one object per frame.
    pub fn to_eager(&self) -> FrameStore {
        FrameStore::Eager(self.iter().collect())
    }

    /// Same frames, packed into a single buffer of `frame_width`-byte frames.
    pub fn to_lazy(&self, frame_width: usize) -> Result<FrameStore> {
        match self {
            FrameStore::Lazy(frames) if frames.frame_width() == frame_width => {
                Ok(FrameStore::Lazy(frames.clone()))
            }
            _ => {
                let mut frames = DataFrames::new(Vec::new(), frame_width)?;
                for frame in self.iter() {
                    frames.push_frame(frame)?;
                }
                Ok(FrameStore::Lazy(frames))
            }
        }
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        FrameStore::Eager(Vec::new())
    }
}

impl PartialEq for FrameStore {
    /// Frame-by-frame equality, independent of representation.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FrameStore::Lazy(a), FrameStore::Lazy(b)) if a.frame_width() == b.frame_width() => {
                a.as_bytes() == b.as_bytes()
            }
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}

impl Eq for FrameStore {}

/// Iterator over the frames of a [`FrameStore`].
pub enum FrameIter<'a> {
    Eager(std::slice::Iter<'a, Frame>),
    Lazy { chunks: std::slice::Chunks<'a, u8> },
}

impl Iterator for FrameIter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        match self {
            FrameIter::Eager(iter) => iter.next().cloned(),
            FrameIter::Lazy { chunks } => chunks.next().map(Frame::from_bytes),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            FrameIter::Eager(iter) => iter.size_hint(),
            FrameIter::Lazy { chunks } => chunks.size_hint(),
        }
    }
}

impl DoubleEndedIterator for FrameIter<'_> {
    fn next_back(&mut self) -> Option<Frame> {
        match self {
            FrameIter::Eager(iter) => iter.next_back().cloned(),
            FrameIter::Lazy { chunks } => chunks.next_back().map(Frame::from_bytes),
        }
    }
}

impl ExactSizeIterator for FrameIter<'_> {}
