// src/engine.rs
//! The feature pipeline: scrub, notch, bandpass, Welch PSD, band powers and
//! theta metrics, with the only cross-call state kept in [`EngineState`].
use log::debug;

use crate::buffer::SampleBuffer;
use crate::config::EngineConfig;
use crate::dsp::{
    calculate_theta_metrics, design_notch, filtfilt, scrub_artifacts, BandpassCascade,
    ExponentialSmoother, FilterCoefficients, WelchEstimator,
};
use crate::error::EngineError;
use crate::observer::{FeatureObserver, LogObserver};
use crate::parse::{parse_input, RawInput};
use crate::types::{FeaturePayload, QualityReport};

/// Fewest samples the orchestrator will look at.
pub const MIN_SAMPLES: usize = 3;

/// Why a cycle did or did not produce features.
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessOutcome {
    Features(FeaturePayload),
    InsufficientData { required: usize, available: usize },
    EmptySpectrum,
}

impl ProcessOutcome {
    pub fn into_payload(self) -> Option<FeaturePayload> {
        match self {
            ProcessOutcome::Features(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Everything that survives between calls.
#[derive(Clone, Debug)]
pub struct EngineState {
    pub buffer: SampleBuffer,
    pub smoother: ExponentialSmoother,
}

impl EngineState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            buffer: SampleBuffer::new(config.max_buffer_size),
            smoother: ExponentialSmoother::new(config.smoothing_alpha),
        }
    }
}

/// Single-channel feature engine.
///
/// Not internally synchronized: every mutating call takes `&mut self`. To feed
/// it from several producers, move it onto a worker with
/// [`crate::worker::spawn_worker`].
pub struct ThetaEngine {
    config: EngineConfig,
    notch: FilterCoefficients,
    bandpass: BandpassCascade,
    welch: WelchEstimator,
    state: EngineState,
    observer: Box<dyn FeatureObserver>,
}

impl ThetaEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let fs = config.sample_rate_hz;
        let notch = design_notch(fs, config.notch_hz, config.notch_q);
        let bandpass = BandpassCascade::new(fs, config.bandpass_low_hz, config.bandpass_high_hz);
        let welch = WelchEstimator::new(fs, config.window_size, config.overlap);
        let state = EngineState::new(&config);
        debug!(
            "engine ready: fs={fs} window={} overlap={} buffer={}",
            config.window_size, config.overlap, config.max_buffer_size
        );
        Ok(Self {
            config,
            notch,
            bandpass,
            welch,
            state,
            observer: Box::new(LogObserver),
        })
    }

    pub fn with_observer(mut self, observer: impl FeatureObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn buffered_len(&self) -> usize {
        self.state.buffer.len()
    }

    pub fn smoothed_theta(&self) -> Option<f64> {
        self.state.smoother.value()
    }

    pub fn add_sample(&mut self, value: f64) {
        self.state.buffer.push(value);
    }

    pub fn add_samples(&mut self, values: &[f64]) {
        self.state.buffer.extend(values);
    }

    /// Parses `input` and appends it to the ring. Returns the number of samples added.
    pub fn add_input(&mut self, input: &RawInput) -> Result<usize, EngineError> {
        let samples = parse_input(input, self.config.scaling)?;
        self.state.buffer.extend(&samples);
        Ok(samples.len())
    }

    /// Runs the pipeline over the buffered samples.
    pub fn process_live_data(&mut self) -> Option<FeaturePayload> {
        if self.state.buffer.len() < MIN_SAMPLES {
            self.skip(ProcessOutcome::InsufficientData {
                required: MIN_SAMPLES,
                available: self.state.buffer.len(),
            });
            return None;
        }
        let window = self.state.buffer.snapshot();
        self.process(&window)
    }

    /// Parses a batch and runs the pipeline over it without touching the ring.
    pub fn process_input(
        &mut self,
        input: &RawInput,
    ) -> Result<Option<FeaturePayload>, EngineError> {
        let samples = parse_input(input, self.config.scaling)?;
        Ok(self.process(&samples))
    }

    pub fn process(&mut self, window: &[f64]) -> Option<FeaturePayload> {
        self.process_outcome(window).into_payload()
    }

    pub fn process_outcome(&mut self, window: &[f64]) -> ProcessOutcome {
        let required = MIN_SAMPLES.max(self.config.window_size);
        if window.len() < required {
            return self.skip(ProcessOutcome::InsufficientData {
                required,
                available: window.len(),
            });
        }

        let scrubbed = scrub_artifacts(window, self.config.artifact_window);
        let notched = filtfilt(&scrubbed.samples, &self.notch);
        let filtered = self.bandpass.apply(&notched);

        let psd = self.welch.compute(&filtered);
        if psd.is_empty() {
            return self.skip(ProcessOutcome::EmptySpectrum);
        }

        let metrics =
            calculate_theta_metrics(&psd.power, &psd.frequencies, &filtered, &self.config.bands);
        let smoothed_theta = self.state.smoother.update(metrics.theta_pct);

        let payload = FeaturePayload {
            total_power: metrics.total_power,
            band_powers: metrics.band_powers,
            theta_contribution: metrics.theta_pct,
            theta_relative: metrics.adapted_theta,
            theta_snr_broad: metrics.broadband_snr,
            theta_snr_peak: metrics.peak_snr,
            smoothed_theta,
        };
        let quality = QualityReport {
            window_len: window.len(),
            artifacts_replaced: scrubbed.replaced,
            dc_offset: window.iter().sum::<f64>() / window.len() as f64,
            peak_snr: metrics.peak_snr,
        };
        self.observer.on_features(&payload, &quality);
        ProcessOutcome::Features(payload)
    }

    fn skip(&mut self, outcome: ProcessOutcome) -> ProcessOutcome {
        self.observer.on_skip(&outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScalingPolicy;
    use crate::observer::StatsObserver;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / 512.0).sin())
            .collect()
    }

    fn engine() -> ThetaEngine {
        ThetaEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            sample_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ThetaEngine::new(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn alpha_sine_dominates_alpha_band() {
        let mut engine = engine();
        let payload = engine.process(&sine(10.0, 20.0, 512)).unwrap();
        let bands = payload.band_powers;
        assert_eq!(bands.dominant(), Some("alpha"));
        assert!(bands.alpha > 0.0);
        assert!(bands.gamma < bands.alpha * 1e-3);
        assert!(payload.total_power > 0.0);
    }

    #[test]
    fn theta_sine_is_reported_as_theta() {
        let mut engine = engine();
        let payload = engine.process(&sine(6.0, 20.0, 1024)).unwrap();
        assert_eq!(payload.band_powers.dominant(), Some("theta"));
        assert!(payload.theta_contribution > 10.0);
        assert!(payload.theta_snr_peak > 1.0);
        assert!(payload.theta_relative > 0.5 && payload.theta_relative < 1.0);
        assert!(payload.theta_snr_broad > 1.0);
    }

    #[test]
    fn short_windows_are_skipped() {
        let mut engine = engine();
        assert_eq!(engine.process(&[1.0, 2.0]), None);
        assert_eq!(
            engine.process_outcome(&sine(10.0, 1.0, 511)),
            ProcessOutcome::InsufficientData {
                required: 512,
                available: 511
            }
        );
        assert_eq!(engine.smoothed_theta(), None);
    }

    #[test]
    fn smoothing_carries_across_calls() {
        let mut engine = engine();
        let first = engine.process(&sine(6.0, 20.0, 512)).unwrap();
        assert_eq!(first.smoothed_theta, first.theta_contribution);

        let second = engine.process(&sine(10.0, 20.0, 512)).unwrap();
        let expected = 0.3 * second.theta_contribution + 0.7 * first.smoothed_theta;
        assert!((second.smoothed_theta - expected).abs() < 1e-9);
        assert_eq!(engine.smoothed_theta(), Some(second.smoothed_theta));
    }

    #[test]
    fn live_data_needs_a_full_window() {
        let mut engine = engine();
        engine.add_sample(1.0);
        engine.add_sample(2.0);
        assert_eq!(engine.process_live_data(), None);

        for v in sine(10.0, 20.0, 400) {
            engine.add_sample(v);
        }
        assert_eq!(engine.process_live_data(), None);

        engine.add_samples(&sine(10.0, 20.0, 1200));
        assert_eq!(engine.buffered_len(), 1000);
        let payload = engine.process_live_data().unwrap();
        assert_eq!(payload.band_powers.dominant(), Some("alpha"));
    }

    #[test]
    fn ring_keeps_most_recent_samples() {
        let mut engine = engine();
        for i in 0..1500 {
            engine.add_sample(i as f64);
        }
        let snapshot = engine.state().buffer.snapshot();
        assert_eq!(snapshot.len(), 1000);
        assert_eq!(snapshot[0], 500.0);
        assert_eq!(snapshot[999], 1499.0);
    }

    #[test]
    fn parse_failures_propagate_and_leave_state_alone() {
        let mut engine = engine();
        let err = engine
            .process_input(&RawInput::Int16Le(vec![0x01, 0x02, 0x03]))
            .unwrap_err();
        assert_eq!(err, EngineError::OddByteCount { len: 3 });
        assert!(engine.add_input(&RawInput::Text("1,x".into())).is_err());
        assert_eq!(engine.buffered_len(), 0);
    }

    #[test]
    fn binary_input_is_scaled_before_processing() {
        let config = EngineConfig {
            scaling: ScalingPolicy::Microvolts {
                center: 0.0,
                microvolts_per_count: 0.5,
            },
            ..Default::default()
        };
        let mut scaled = ThetaEngine::new(config).unwrap();
        let mut raw = engine();

        let counts = sine(10.0, 40.0, 512);
        let bytes: Vec<u8> = counts
            .iter()
            .flat_map(|v| (v.round() as i16).to_le_bytes())
            .collect();
        let rounded: Vec<f64> = counts.iter().map(|v| v.round()).collect();

        let scaled_payload = scaled
            .process_input(&RawInput::Int16Le(bytes))
            .unwrap()
            .unwrap();
        let raw_payload = raw.process(&rounded).unwrap();
        let ratio = raw_payload.total_power / scaled_payload.total_power;
        assert!((ratio - 4.0).abs() < 1e-9);
    }

    #[test]
    fn observer_sees_every_cycle() {
        let stats = StatsObserver::new();
        let mut engine = engine().with_observer(stats.clone());
        engine.process(&[0.0; 10]);
        let mut spiky = sine(10.0, 20.0, 512);
        spiky[200] = 5000.0;
        engine.process(&spiky).unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.artifacts_replaced, 1);
        assert!(snapshot.last_band_powers.is_some());
    }
}
