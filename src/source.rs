// src/source.rs
use crate::error::EngineError;
use crate::parse::RawInput;

/// Something that yields raw input chunks on demand.
pub trait SampleSource {
    fn next_input(&mut self) -> Result<Option<RawInput>, EngineError>;
}

/// Replays a recorded session chunk by chunk, the way a headset transport
/// would have delivered it.
pub struct ReplaySource {
    chunks: std::vec::IntoIter<RawInput>,
}

impl ReplaySource {
    /// Chunks are delivered exactly as given, malformed ones included.
    pub fn from_inputs(chunks: Vec<RawInput>) -> Self {
        Self {
            chunks: chunks.into_iter(),
        }
    }

    /// Cuts decoded samples into packets of `chunk_len` (the last may be short).
    pub fn chunked(samples: &[f64], chunk_len: usize) -> Self {
        let packets = samples
            .chunks(chunk_len.max(1))
            .map(|packet| match packet {
                [single] => RawInput::Sample(*single),
                many => RawInput::Samples(many.to_vec()),
            })
            .collect();
        Self::from_inputs(packets)
    }
}

impl SampleSource for ReplaySource {
    fn next_input(&mut self) -> Result<Option<RawInput>, EngineError> {
        Ok(self.chunks.next())
    }
}
