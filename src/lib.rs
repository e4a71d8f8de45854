//! Sample-accurate in-memory PCM audio.
//!
//! An [`Audio`] is a sequence of [`Frame`]s (one interleaved sample per
//! channel) plus its [`Format`]. Frames are held either eagerly, one object
//! per frame, or lazily as a [`DataFrames`] view over a single payload
//! buffer; both behave the same for indexing, slicing, arithmetic and
//! equality. Audio converts to and from uncompressed WAV through a [`Codec`].
//!
//! Positions can be frame indices or timestamps (`"1:30"`, `"0:01:02.5"`).
//!
//! # Example
//!
//! ```no_run
//! use paud_rs::{Audio, Position};
//!
//! let audio = Audio::open("track.wav").unwrap();
//! println!(
//!     "{}ch, {}Hz, {} bytes/sample, {:.2}s",
//!     audio.channels(),
//!     audio.frame_rate(),
//!     audio.sample_width(),
//!     audio.duration()
//! );
//!
//! let intro = audio
//!     .slice_at(None, Some(Position::Timestamp("0:10")))
//!     .unwrap();
//! let looped: paud_rs::Result<Audio> = vec![intro.clone(), intro].into_iter().sum();
//! looped.unwrap().save("intro-twice.wav").unwrap();
//! ```

mod audio;
pub mod codec;
mod data_frames;
pub mod error;
mod frame;
mod header;
mod numeric;
pub mod playback;
mod store;
pub mod timestamp;

pub use num_bigint::BigUint;

pub use audio::{
    Audio, AudioInit, COMPRESSION_NAME, COMPRESSION_TYPE, Format, OpenOptions, Params, Position,
};
pub use codec::{Codec, CodecRegistry, Decoded, WavCodec};
pub use data_frames::DataFrames;
pub use error::{PaudError, Result};
pub use frame::Frame;
pub use header::{HEADER_LEN, WAVE_FORMAT_EXTENSIBLE, WAVE_FORMAT_PCM, WavHeader, parse_header};
pub use numeric::{NumericArray, NumericData, NumericType};
pub use playback::{CommandPlayer, Platform, Player};
pub use store::{FrameIter, FrameSequence, FrameStore};
pub use timestamp::{ms_to_frame_index, parse_timestamp};
