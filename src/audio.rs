//! The user-facing audio buffer.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::{Add, Bound, Mul, RangeBounds};
use std::path::Path;

use crate::codec::{Codec, CodecRegistry, WAVE, WavCodec};
use crate::data_frames::DataFrames;
use crate::error::{PaudError, Result};
use crate::frame::{Frame, sample_width_for};
use crate::playback::{CommandPlayer, Platform, Player};
use crate::store::{FrameIter, FrameStore};
use crate::timestamp::{ms_to_frame_index, parse_timestamp};

/// Compression type recorded in [`Params`]; always uncompressed.
pub const COMPRESSION_TYPE: &str = "NONE";
/// Compression name recorded in [`Params`].
pub const COMPRESSION_NAME: &str = "Uncompressed";

/// PCM layout shared by every frame of an [`Audio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    /// Interleaved channels per frame.
    pub channels: u16,
    /// Bytes per sample of one channel.
    pub sample_width: u16,
    /// Frames per second.
    pub frame_rate: u32,
}

impl Format {
    pub fn new(channels: u16, sample_width: u16, frame_rate: u32) -> Self {
        Format {
            channels,
            sample_width,
            frame_rate,
        }
    }

    /// Bytes per frame: `channels * sample_width`.
    pub fn frame_width(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.sample_width == 0 || self.frame_rate == 0 {
            return Err(PaudError::InvalidConfiguration(format!(
                "channels, sample width and frame rate must be non-zero, got {self:?}"
            )));
        }
        Ok(())
    }

    fn key(&self) -> (u16, u16, u32) {
        (self.channels, self.sample_width, self.frame_rate)
    }
}

impl Default for Format {
    /// Mono, 16-bit, 44.1 kHz.
    fn default() -> Self {
        Format::new(1, 2, 44_100)
    }
}

/// The six header fields of an uncompressed PCM container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Params {
    pub channels: u16,
    pub sample_width: u16,
    pub frame_rate: u32,
    pub frame_count: usize,
    pub compression_type: &'static str,
    pub compression_name: &'static str,
}

impl Params {
    pub fn new(format: Format, frame_count: usize) -> Self {
        Params {
            channels: format.channels,
            sample_width: format.sample_width,
            frame_rate: format.frame_rate,
            frame_count,
            compression_type: COMPRESSION_TYPE,
            compression_name: COMPRESSION_NAME,
        }
    }

    pub fn format(&self) -> Format {
        Format::new(self.channels, self.sample_width, self.frame_rate)
    }

    pub fn frame_width(&self) -> usize {
        self.format().frame_width()
    }
}

/// The ways an [`Audio`] can be built.
#[derive(Debug, Clone)]
pub enum AudioInit {
    /// An explicit list of frames, stored eagerly.
    FromFrames(Vec<Frame>),
    /// A raw payload of `frame_width`-byte frames, stored lazily.
    FromBuffer { data: Vec<u8>, frame_width: usize },
    /// No frames yet, just a layout.
    FromParams(Format),
}

/// How [`Audio::open_with`] reads a file.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Keep the payload as one buffer instead of one object per frame.
    pub lazy: bool,
    /// Registry name of the container codec.
    pub codec: String,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            lazy: true,
            codec: WAVE.to_string(),
        }
    }
}

/// A frame position given either as an index or as a timestamp string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position<'a> {
    Frame(usize),
    Timestamp(&'a str),
}

impl From<usize> for Position<'_> {
    fn from(index: usize) -> Self {
        Position::Frame(index)
    }
}

impl<'a> From<&'a str> for Position<'a> {
    fn from(timestamp: &'a str) -> Self {
        Position::Timestamp(timestamp)
    }
}

/// An in-memory PCM buffer: frames plus their format.
///
/// Slicing and arithmetic always allocate fresh storage, so editing a derived
/// buffer never shows through in its source.
#[derive(Debug, Clone, Default)]
pub struct Audio {
    frames: FrameStore,
    format: Format,
}

impl Audio {
    /// Build audio from one of the construction modes.
    ///
    /// An explicit `format` must agree with the data; without one the format
    /// is inferred (see [`Audio::from_frames`]).
    pub fn new(init: AudioInit, format: Option<Format>) -> Result<Audio> {
        match (init, format) {
            (AudioInit::FromFrames(frames), Some(format)) => Audio::with_format(frames, format),
            (AudioInit::FromFrames(frames), None) => Audio::from_frames(frames),
            (AudioInit::FromBuffer { data, frame_width }, format) => {
                let frames = DataFrames::new(data, frame_width)?;
                let format = match format {
                    Some(format) => format,
                    None => Format {
                        sample_width: sample_width_for(frame_width)?,
                        ..Format::default()
                    },
                };
                Audio::from_data_frames(frames, format)
            }
            (AudioInit::FromParams(own), other) => {
                if let Some(other) = other.filter(|other| *other != own) {
                    return Err(PaudError::InvalidConfiguration(format!(
                        "conflicting formats {own:?} and {other:?}"
                    )));
                }
                Audio::empty(own)
            }
        }
    }

    /// Eager audio from explicit frames and format. Every frame must be
    /// exactly `format.frame_width()` bytes.
    pub fn with_format(frames: Vec<Frame>, format: Format) -> Result<Audio> {
        format.validate()?;
        for frame in &frames {
            check_width(frame, format.frame_width())?;
        }
        Ok(Audio {
            frames: FrameStore::Eager(frames),
            format,
        })
    }

    /// Eager audio with the format inferred from the frames: mono, 44.1 kHz,
    /// and a sample width equal to the byte width of the largest frame.
    /// With no frames at all the default format is used.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Audio> {
        let format = match frames.iter().max() {
            Some(max) => Format {
                sample_width: sample_width_for(max.len())?,
                ..Format::default()
            },
            None => Format::default(),
        };
        Audio::with_format(frames, format)
    }

    /// Lazy audio over an existing buffer.
    pub fn from_data_frames(frames: DataFrames, format: Format) -> Result<Audio> {
        format.validate()?;
        if frames.frame_width() != format.frame_width() {
            return Err(PaudError::InvalidConfiguration(format!(
                "buffer frames are {} bytes wide but the format needs {}",
                frames.frame_width(),
                format.frame_width()
            )));
        }
        Ok(Audio {
            frames: FrameStore::Lazy(frames),
            format,
        })
    }

    /// Audio with no frames.
    pub fn empty(format: Format) -> Result<Audio> {
        format.validate()?;
        Ok(Audio {
            frames: FrameStore::Eager(Vec::new()),
            format,
        })
    }

    /// Open a WAV file, keeping the payload lazy.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Audio> {
        Audio::open_with(path, &OpenOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Audio> {
        let registry = CodecRegistry::default();
        let codec = registry.get(&options.codec)?;
        let file = File::open(path)?;
        Audio::read_with(BufReader::new(file), codec, options.lazy)
    }

    /// Decode WAV bytes from any reader.
    pub fn from_reader<R: Read>(reader: R, lazy: bool) -> Result<Audio> {
        Audio::read_with(reader, &WavCodec, lazy)
    }

    /// Decode in-memory WAV bytes.
    pub fn from_bytes(bytes: &[u8], lazy: bool) -> Result<Audio> {
        Audio::decode_with(bytes, &WavCodec, lazy)
    }

    pub fn decode_with(bytes: &[u8], codec: &dyn Codec, lazy: bool) -> Result<Audio> {
        let decoded = codec.decode(bytes, lazy)?;
        Ok(Audio {
            frames: decoded.frames,
            format: decoded.format,
        })
    }

    fn read_with<R: Read>(mut reader: R, codec: &dyn Codec, lazy: bool) -> Result<Audio> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Audio::decode_with(&bytes, codec, lazy)
    }

    /// Write this audio as a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write WAV bytes to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Serialize to WAV bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.encode_with(&WavCodec)
    }

    pub fn encode_with(&self, codec: &dyn Codec) -> Result<Vec<u8>> {
        codec.encode(&self.frames, &self.params())
    }

    /// Hand the encoded audio to the platform player.
    ///
    /// Only encoding errors are reported; playback itself is fire-and-forget.
    pub fn play(&self) -> Result<()> {
        self.play_with(&CommandPlayer::new(), Platform::detect())
    }

    pub fn play_with(&self, player: &dyn Player, platform: Platform) -> Result<()> {
        let bytes = self.to_bytes()?;
        player.play(&bytes, platform);
        Ok(())
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    pub fn sample_width(&self) -> u16 {
        self.format.sample_width
    }

    pub fn frame_rate(&self) -> u32 {
        self.format.frame_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_width(&self) -> usize {
        self.format.frame_width()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.format.frame_rate as f64
    }

    /// Half the number of values one sample can take: `256^sample_width / 2`.
    pub fn peak_amplitude(&self) -> f64 {
        256f64.powi(self.format.sample_width as i32) / 2.0
    }

    pub fn params(&self) -> Params {
        Params::new(self.format, self.frame_count())
    }

    pub fn len(&self) -> usize {
        self.frame_count()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_lazy(&self) -> bool {
        self.frames.is_lazy()
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn into_frames(self) -> FrameStore {
        self.frames
    }

    pub fn iter(&self) -> FrameIter<'_> {
        self.frames.iter()
    }

    /// Same audio with every frame materialized.
    pub fn to_eager(&self) -> Audio {
        Audio {
            frames: self.frames.to_eager(),
            format: self.format,
        }
    }

    /// Same audio packed into one buffer.
    pub fn to_lazy(&self) -> Result<Audio> {
        Ok(Audio {
            frames: self.frames.to_lazy(self.frame_width())?,
            format: self.format,
        })
    }

    /// Frame index of a millisecond offset.
    pub fn ms_pos(&self, ms: u64) -> usize {
        ms_to_frame_index(ms, self.format.frame_rate)
    }

    /// Frame index of a position. Timestamps map to the last frame that
    /// starts at or before them.
    pub fn resolve<'a>(&self, position: impl Into<Position<'a>>) -> Result<usize> {
        match position.into() {
            Position::Frame(index) => Ok(index),
            Position::Timestamp(timestamp) => Ok(self.ms_pos(parse_timestamp(timestamp)?)),
        }
    }

    pub fn get(&self, index: usize) -> Result<Frame> {
        self.frames.get(index)
    }

    /// The frame at an index or timestamp.
    pub fn get_at<'a>(&self, position: impl Into<Position<'a>>) -> Result<Frame> {
        self.get(self.resolve(position)?)
    }

    /// Copy of the frames in `range`, with the same format. Bounds past the
    /// end are clamped.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Audio {
        let (start, stop) = self.bounds(&range);
        log::trace!("slicing frames {start}..{stop} of {}", self.frame_count());
        Audio {
            frames: self.frames.slice(start, stop),
            format: self.format,
        }
    }

    /// Like [`Audio::slice`], with index or timestamp endpoints. `None` means
    /// the start or end of the audio.
    pub fn slice_at(&self, start: Option<Position<'_>>, stop: Option<Position<'_>>) -> Result<Audio> {
        let start = match start {
            Some(position) => Bound::Included(self.resolve(position)?),
            None => Bound::Unbounded,
        };
        let stop = match stop {
            Some(position) => Bound::Excluded(self.resolve(position)?),
            None => Bound::Unbounded,
        };
        Ok(self.slice((start, stop)))
    }

    /// Replace the frame at `index`.
    pub fn set(&mut self, index: usize, frame: Frame) -> Result<()> {
        self.check_frame(&frame)?;
        self.frames.set(index, frame)
    }

    /// Replace the frames in `range` with `frames`, which may be a different
    /// number of frames.
    pub fn set_range<R: RangeBounds<usize>>(&mut self, range: R, frames: Vec<Frame>) -> Result<()> {
        for frame in &frames {
            self.check_frame(frame)?;
        }
        let (start, stop) = self.bounds(&range);
        self.frames.splice(start, stop, frames);
        Ok(())
    }

    pub fn append(&mut self, frame: Frame) -> Result<()> {
        self.check_frame(&frame)?;
        self.frames.push(frame)
    }

    /// Append every frame, or none of them if any has the wrong width.
    pub fn extend<I: IntoIterator<Item = Frame>>(&mut self, frames: I) -> Result<()> {
        let frames: Vec<Frame> = frames.into_iter().collect();
        for frame in &frames {
            self.check_frame(frame)?;
        }
        for frame in frames {
            self.frames.push(frame)?;
        }
        Ok(())
    }

    /// The frame with the highest numeric value.
    pub fn max(&self) -> Option<Frame> {
        self.iter().max()
    }

    /// `self + other`: frames of both, in the format of `self`.
    ///
    /// Adding empty audio changes nothing.
    pub fn concat(&self, other: &Audio) -> Result<Audio> {
        self.clone().absorb(other.clone())
    }

    /// `self + frame`.
    pub fn with_frame(&self, frame: Frame) -> Result<Audio> {
        let mut out = self.clone();
        out.append(frame)?;
        Ok(out)
    }

    /// `self * times`: the frame sequence repeated.
    pub fn repeat(&self, times: i64) -> Result<Audio> {
        let times = usize::try_from(times).map_err(|_| {
            PaudError::InvalidOperand(format!("can't repeat audio {times} times"))
        })?;
        self * times
    }

    /// Frame order reversed, same format.
    pub fn reversed(&self) -> Audio {
        Audio {
            frames: self.frames.reversed(),
            format: self.format,
        }
    }

    /// Split into `n` contiguous chunks of `ceil(frame_count / n)` frames; the
    /// last may be shorter and there are fewer chunks when frames run out.
    pub fn separate(&self, n: usize) -> Result<Vec<Audio>> {
        if n == 0 {
            return Err(PaudError::InvalidArgument(
                "can't separate audio into 0 parts".into(),
            ));
        }
        let count = self.frame_count();
        let chunk = count.div_ceil(n).max(1);
        let parts: Vec<Audio> = (0..count)
            .step_by(chunk)
            .map(|start| self.slice(start..start + chunk))
            .collect();
        log::trace!("separated {count} frames into {} parts of {chunk}", parts.len());
        Ok(parts)
    }

    /// Consume `other` onto the end of `self`.
    fn absorb(mut self, other: Audio) -> Result<Audio> {
        if other.is_empty() {
            return Ok(self);
        }
        if other.frame_width() != self.frame_width() {
            return Err(PaudError::TypeMismatch(format!(
                "can't join {}-byte frames onto {}-byte frames",
                other.frame_width(),
                self.frame_width()
            )));
        }
        if other.format != self.format {
            log::warn!(
                "joining audio with format {:?} onto {:?}; keeping the left format",
                other.format,
                self.format
            );
        }
        if self.is_empty() {
            self.frames = other.frames;
            return Ok(self);
        }
        match (&mut self.frames, other.frames) {
            (FrameStore::Lazy(left), FrameStore::Lazy(right)) => left.append_buffer(&right),
            (left, right) => {
                for frame in right.iter() {
                    left.push(frame)?;
                }
            }
        }
        Ok(self)
    }

    fn bounds<R: RangeBounds<usize>>(&self, range: &R) -> (usize, usize) {
        let len = self.frame_count();
        let start = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let stop = match range.end_bound() {
            Bound::Included(&i) => i.saturating_add(1),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => len,
        };
        let stop = stop.min(len);
        (start.min(stop), stop)
    }

    fn check_frame(&self, frame: &Frame) -> Result<()> {
        check_width(frame, self.frame_width())
    }
}

fn check_width(frame: &Frame, frame_width: usize) -> Result<()> {
    if frame.len() != frame_width {
        return Err(PaudError::TypeMismatch(format!(
            "frame is {} bytes wide, audio frames are {frame_width}",
            frame.len()
        )));
    }
    Ok(())
}

impl PartialEq for Audio {
    /// Same frames and same params.
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.frames == other.frames
    }
}

impl Eq for Audio {}

impl PartialOrd for Audio {
    /// Frame sequences compare lexicographically; the format only breaks ties.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.iter()
                .cmp(other.iter())
                .then_with(|| self.format.key().cmp(&other.format.key())),
        )
    }
}

impl Mul<usize> for &Audio {
    type Output = Result<Audio>;

    fn mul(self, times: usize) -> Result<Audio> {
        Ok(Audio {
            frames: self.frames.repeated(times)?,
            format: self.format,
        })
    }
}

impl Add<&Audio> for &Audio {
    type Output = Result<Audio>;

    fn add(self, other: &Audio) -> Result<Audio> {
        self.concat(other)
    }
}

impl Add<Frame> for &Audio {
    type Output = Result<Audio>;

    fn add(self, frame: Frame) -> Result<Audio> {
        self.with_frame(frame)
    }
}

impl std::iter::Sum<Audio> for Result<Audio> {
    /// Fold-style concatenation. The first part seeds the total, so its
    /// format wins; an empty iterator gives empty default audio.
    fn sum<I: Iterator<Item = Audio>>(mut iter: I) -> Self {
        let total = iter.try_fold(None, |total: Option<Audio>, part| match total {
            None => Ok(Some(part)),
            Some(total) => total.absorb(part).map(Some),
        })?;
        Ok(total.unwrap_or_default())
    }
}

impl<'a> IntoIterator for &'a Audio {
    type Item = Frame;
    type IntoIter = FrameIter<'a>;

    fn into_iter(self) -> FrameIter<'a> {
        self.iter()
    }
}
