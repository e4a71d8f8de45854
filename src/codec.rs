//! Serialization between frame storage and container bytes.
//!
//! A [`Codec`] is a stateless transform in both directions. Codecs are looked
//! up by name in a [`CodecRegistry`]; the default registry knows `"wave"`.

use std::collections::BTreeMap;

use crate::audio::{Format, Params};
use crate::data_frames::DataFrames;
use crate::error::{PaudError, Result};
use crate::frame::Frame;
use crate::header::{self, HEADER_LEN};
use crate::store::FrameStore;

/// Name of the built-in WAV codec.
pub const WAVE: &str = "wave";

/// Frames and format recovered from container bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub frames: FrameStore,
    pub format: Format,
}

impl Decoded {
    pub fn params(&self) -> Params {
        Params::new(self.format, self.frames.len())
    }
}

/// A container format.
pub trait Codec {
    /// Registry key for this codec.
    fn name(&self) -> &'static str;

    /// Serialize `params.frame_count` frames behind a header built from `params`.
    fn encode(&self, frames: &FrameStore, params: &Params) -> Result<Vec<u8>>;

    /// Parse container bytes.
    ///
    /// With `lazy` the payload is wrapped as one [`DataFrames`] buffer; otherwise
    /// every frame is materialized up front.
    fn decode(&self, bytes: &[u8], lazy: bool) -> Result<Decoded>;
}

/// Uncompressed PCM in a RIFF/WAVE container.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl Codec for WavCodec {
    fn name(&self) -> &'static str {
        WAVE
    }

    fn encode(&self, frames: &FrameStore, params: &Params) -> Result<Vec<u8>> {
        let format = params.format();
        format.validate()?;
        let frame_width = format.frame_width();

        if params.frame_count > frames.len() {
            return Err(PaudError::IndexOutOfRange {
                index: params.frame_count,
                len: frames.len(),
            });
        }

        let payload = match frames {
            FrameStore::Lazy(data) if data.frame_width() == frame_width => {
                let bytes = data.as_bytes();
                let end = params.frame_count * frame_width;
                if bytes.len() < end {
                    return Err(PaudError::TypeMismatch(
                        "buffer ends with a partial frame".into(),
                    ));
                }
                bytes[..end].to_vec()
            }
            _ => {
                let mut payload = Vec::with_capacity(params.frame_count * frame_width);
                for (index, frame) in frames.iter().take(params.frame_count).enumerate() {
                    if frame.len() != frame_width {
                        return Err(PaudError::TypeMismatch(format!(
                            "frame {index} is {} bytes wide, expected {frame_width}",
                            frame.len()
                        )));
                    }
                    payload.extend_from_slice(frame.as_bytes());
                }
                payload
            }
        };

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + 1);
        header::write_header(&mut out, &format, payload.len())?;
        out.extend_from_slice(&payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }

        log::debug!(
            "encoded WAV: {}ch, {} bytes/sample, {}Hz, {} frames",
            format.channels,
            format.sample_width,
            format.frame_rate,
            params.frame_count
        );
        Ok(out)
    }

    fn decode(&self, bytes: &[u8], lazy: bool) -> Result<Decoded> {
        let header = header::parse_header(bytes)?;
        let format = header.format();
        let frame_width = header.frame_width();
        let frame_count = header.frame_count();

        let start = header.data_offset;
        let payload = &bytes[start..start + frame_count * frame_width];

        let frames = if lazy {
            FrameStore::Lazy(DataFrames::new(payload, frame_width)?)
        } else {
            FrameStore::Eager(payload.chunks_exact(frame_width).map(Frame::from_bytes).collect())
        };

        log::debug!(
            "decoded WAV: {}ch, {} bytes/sample, {}Hz, {} frames ({})",
            format.channels,
            format.sample_width,
            format.frame_rate,
            frame_count,
            if lazy { "lazy" } else { "eager" }
        );
        Ok(Decoded { frames, format })
    }
}

/// Codecs keyed by name, resolved at call time.
pub struct CodecRegistry {
    codecs: BTreeMap<&'static str, Box<dyn Codec>>,
}

impl CodecRegistry {
    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: BTreeMap::new(),
        }
    }

    /// Add `codec`, replacing any codec registered under the same name.
    pub fn register(&mut self, codec: Box<dyn Codec>) {
        self.codecs.insert(codec.name(), codec);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Codec> {
        self.codecs
            .get(name)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| PaudError::UnsupportedFormat(format!("no codec named {name:?}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codecs.keys().copied()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry::empty();
        registry.register(Box::new(WavCodec));
        registry
    }
}
