// src/pipeline.rs
use crate::engine::ThetaEngine;
use crate::error::EngineError;
use crate::source::SampleSource;
use crate::types::FeaturePayload;

/// Pulls chunks from a source into the engine ring and emits features once
/// every `stride` new samples.
pub struct LivePipeline<S: SampleSource> {
    source: S,
    engine: ThetaEngine,
    stride: usize,
    pending: usize,
}

impl<S: SampleSource> LivePipeline<S> {
    /// Uses the Welch hop as the stride, so consecutive outputs share the overlap.
    pub fn new(source: S, engine: ThetaEngine) -> Self {
        let stride = engine.config().hop();
        Self::with_stride(source, engine, stride)
    }

    pub fn with_stride(source: S, engine: ThetaEngine, stride: usize) -> Self {
        Self {
            source,
            engine,
            stride: stride.max(1),
            pending: 0,
        }
    }

    pub fn engine(&self) -> &ThetaEngine {
        &self.engine
    }

    pub fn into_engine(self) -> ThetaEngine {
        self.engine
    }

    /// Feeds one chunk. `Ok(None)` with an exhausted source is end of stream;
    /// use [`LivePipeline::run`] to drain everything.
    pub fn pump_once(&mut self) -> Result<Option<FeaturePayload>, EngineError> {
        let Some(input) = self.source.next_input()? else {
            return Ok(None);
        };
        self.pending += self.engine.add_input(&input)?;
        if self.pending < self.stride {
            return Ok(None);
        }
        self.pending = 0;
        Ok(self.engine.process_live_data())
    }

    /// Drains the source, collecting every payload produced along the way.
    pub fn run(&mut self) -> Result<Vec<FeaturePayload>, EngineError> {
        let mut payloads = Vec::new();
        loop {
            let Some(input) = self.source.next_input()? else {
                return Ok(payloads);
            };
            self.pending += self.engine.add_input(&input)?;
            if self.pending >= self.stride {
                self.pending = 0;
                payloads.extend(self.engine.process_live_data());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::parse::RawInput;
    use crate::source::ReplaySource;
    use std::f64::consts::PI;

    fn recording(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 20.0 * (2.0 * PI * 10.0 * i as f64 / 512.0).sin())
            .collect()
    }

    #[test]
    fn emits_once_per_stride_after_first_window() {
        let engine = ThetaEngine::new(EngineConfig::default()).unwrap();
        let source = ReplaySource::chunked(&recording(2048), 64);
        let mut pipeline = LivePipeline::new(source, engine);
        let payloads = pipeline.run().unwrap();
        // strides end at 384, 768, ..., 1920; the first is shorter than a window
        assert_eq!(payloads.len(), 4);
        assert!(payloads
            .iter()
            .all(|p| p.band_powers.dominant() == Some("alpha")));
        assert_eq!(pipeline.engine().buffered_len(), 1000);
    }

    #[test]
    fn pump_once_reports_malformed_chunks() {
        let engine = ThetaEngine::new(EngineConfig::default()).unwrap();
        let source = ReplaySource::from_inputs(vec![
            RawInput::Samples(vec![1.0, 2.0]),
            RawInput::Int16Le(vec![0x00]),
        ]);
        let mut pipeline = LivePipeline::with_stride(source, engine, 1);
        assert_eq!(pipeline.pump_once(), Ok(None));
        assert_eq!(
            pipeline.pump_once(),
            Err(EngineError::OddByteCount { len: 1 })
        );
        assert_eq!(pipeline.pump_once(), Ok(None));
        assert_eq!(pipeline.into_engine().buffered_len(), 2);
    }
}
