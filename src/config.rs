// src/config.rs
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::FrequencyBands;

/// How raw device counts are turned into sample values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Keep the device value as-is.
    #[default]
    DeviceUnits,
    /// `(raw - center) * microvolts_per_count`.
    Microvolts {
        center: f64,
        microvolts_per_count: f64,
    },
}

impl ScalingPolicy {
    /// ThinkGear-style headsets: 12-bit ADC over 1.8 V with a 2000x amplifier.
    pub fn neurosky_microvolts() -> Self {
        ScalingPolicy::Microvolts {
            center: 0.0,
            microvolts_per_count: 1.8 / 4096.0 / 2000.0 * 1.0e6,
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        match *self {
            ScalingPolicy::DeviceUnits => raw,
            ScalingPolicy::Microvolts {
                center,
                microvolts_per_count,
            } => (raw - center) * microvolts_per_count,
        }
    }
}

/// Construction-time settings; fixed for the lifetime of an engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate_hz: f64,
    /// Welch segment length, also the minimum window the orchestrator accepts.
    pub window_size: usize,
    pub overlap: usize,
    pub max_buffer_size: usize,
    pub bands: FrequencyBands,
    pub notch_hz: f64,
    pub notch_q: f64,
    pub bandpass_low_hz: f64,
    pub bandpass_high_hz: f64,
    /// Half-width of the neighbourhood used for median replacement.
    pub artifact_window: usize,
    pub smoothing_alpha: f64,
    pub scaling: ScalingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 512.0,
            window_size: 512,
            overlap: 128,
            max_buffer_size: 1000,
            bands: FrequencyBands::default(),
            notch_hz: 50.0,
            notch_q: 30.0,
            bandpass_low_hz: 1.0,
            bandpass_high_hz: 45.0,
            artifact_window: 10,
            smoothing_alpha: 0.3,
            scaling: ScalingPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate_hz * 0.5
    }

    /// Samples between consecutive Welch segments.
    pub fn hop(&self) -> usize {
        self.window_size - self.overlap
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            ));
        }
        if self.window_size < 4 || !self.window_size.is_power_of_two() {
            return invalid(format!(
                "window size must be a power of two >= 4, got {}",
                self.window_size
            ));
        }
        if self.overlap >= self.window_size {
            return invalid(format!(
                "overlap {} must be smaller than window size {}",
                self.overlap, self.window_size
            ));
        }
        if self.max_buffer_size < 3 {
            return invalid(format!(
                "max buffer size must hold at least 3 samples, got {}",
                self.max_buffer_size
            ));
        }
        if self.max_buffer_size < self.window_size {
            return invalid(format!(
                "max buffer size {} cannot hold a {}-sample window",
                self.max_buffer_size, self.window_size
            ));
        }
        let nyquist = self.nyquist_hz();
        for (name, hz) in [
            ("notch", self.notch_hz),
            ("bandpass low edge", self.bandpass_low_hz),
            ("bandpass high edge", self.bandpass_high_hz),
        ] {
            if !(hz > 0.0 && hz < nyquist) {
                return invalid(format!(
                    "{name} frequency {hz} Hz must lie in (0, {nyquist})"
                ));
            }
        }
        if !(self.notch_q.is_finite() && self.notch_q > 0.0) {
            return invalid(format!("notch Q must be positive, got {}", self.notch_q));
        }
        if self.bandpass_low_hz >= self.bandpass_high_hz {
            return invalid(format!(
                "bandpass low edge {} must be below high edge {}",
                self.bandpass_low_hz, self.bandpass_high_hz
            ));
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return invalid(format!(
                "smoothing alpha must lie in (0, 1], got {}",
                self.smoothing_alpha
            ));
        }
        if let ScalingPolicy::Microvolts {
            center,
            microvolts_per_count,
        } = self.scaling
        {
            if !(center.is_finite() && microvolts_per_count.is_finite()) {
                return invalid("scaling parameters must be finite".into());
            }
        }
        self.bands.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hop(), 384);
        assert_eq!(config.nyquist_hz(), 256.0);
    }

    #[test]
    fn rejects_non_power_of_two_window() {
        let config = EngineConfig {
            window_size: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_notch_above_nyquist() {
        let config = EngineConfig {
            sample_rate_hz: 80.0,
            bandpass_high_hz: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(msg)) if msg.contains("notch")
        ));
    }

    #[test]
    fn rejects_overlap_equal_to_window() {
        let config = EngineConfig {
            overlap: 512,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_buffer_smaller_than_window() {
        let config: EngineConfig = serde_json::from_str(r#"{"window_size": 1024}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(msg)) if msg.contains("1024")
        ));
        let widened = EngineConfig {
            max_buffer_size: 1024,
            ..config
        };
        assert!(widened.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"sample_rate_hz": 256.0, "window_size": 256}"#).unwrap();
        assert_eq!(config.sample_rate_hz, 256.0);
        assert_eq!(config.overlap, 128);
        assert_eq!(config.scaling, ScalingPolicy::DeviceUnits);
    }

    #[test]
    fn microvolt_scaling_is_centered() {
        let policy = ScalingPolicy::Microvolts {
            center: 2048.0,
            microvolts_per_count: 0.5,
        };
        assert_eq!(policy.apply(2048.0), 0.0);
        assert_eq!(policy.apply(2050.0), 1.0);
        assert_eq!(ScalingPolicy::DeviceUnits.apply(-17.0), -17.0);
    }
}
