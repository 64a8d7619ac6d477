// src/types.rs
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A frequency range in Hz; its name is the [`FrequencyBands`] field holding it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandDefinition {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl BandDefinition {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }
}

/// The five classical EEG bands, fixed for the lifetime of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyBands {
    pub delta: BandDefinition,
    pub theta: BandDefinition,
    pub alpha: BandDefinition,
    pub beta: BandDefinition,
    pub gamma: BandDefinition,
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self {
            delta: BandDefinition::new(0.5, 4.0),
            theta: BandDefinition::new(4.0, 8.0),
            alpha: BandDefinition::new(8.0, 12.0),
            beta: BandDefinition::new(12.0, 30.0),
            gamma: BandDefinition::new(30.0, 45.0),
        }
    }
}

impl FrequencyBands {
    /// Bands in ascending frequency order, paired with their payload key.
    pub fn named(&self) -> [(&'static str, BandDefinition); 5] {
        [
            ("delta", self.delta),
            ("theta", self.theta),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ]
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let mut previous_low = f64::NEG_INFINITY;
        for (name, band) in self.named() {
            if !(band.low_hz.is_finite() && band.high_hz.is_finite()) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} band edges must be finite"
                )));
            }
            if band.low_hz < 0.0 || band.low_hz >= band.high_hz {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} band must satisfy 0 <= low < high, got [{}, {}]",
                    band.low_hz, band.high_hz
                )));
            }
            if band.low_hz <= previous_low {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} band is out of order"
                )));
            }
            previous_low = band.low_hz;
        }
        Ok(())
    }
}

/// Absolute band powers integrated from the PSD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandPowers {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl BandPowers {
    pub fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("delta", self.delta),
            ("theta", self.theta),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ]
    }

    /// Name of the band with the largest power, if any power is non-zero.
    pub fn dominant(&self) -> Option<&'static str> {
        self.as_array()
            .into_iter()
            .filter(|(_, p)| *p > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }
}

/// Per-window features handed to consumers.
///
/// The serialized key names are consumed by downstream analysis tooling and
/// must stay exactly as declared here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeaturePayload {
    /// Population variance of the filtered window.
    #[serde(rename = "totalPower")]
    pub total_power: f64,
    #[serde(rename = "bandPowers")]
    pub band_powers: BandPowers,
    /// Theta power as a percentage of `total_power`.
    #[serde(rename = "thetaContribution")]
    pub theta_contribution: f64,
    /// SNR-weighted theta confidence in `[0, 1)`.
    #[serde(rename = "thetaRelative")]
    pub theta_relative: f64,
    /// `+∞` when only theta carries power.
    #[serde(rename = "thetaSNRBroad", with = "non_finite")]
    pub theta_snr_broad: f64,
    /// NaN without signal or noise bins, `+∞` over a silent noise floor.
    #[serde(rename = "thetaSNRPeak", with = "non_finite")]
    pub theta_snr_peak: f64,
    #[serde(rename = "smoothedTheta")]
    pub smoothed_theta: f64,
}

/// JSON has no literal for infinities or NaN, so they travel as the strings
/// `"Infinity"`, `"-Infinity"` and `"NaN"`. Finite values stay plain numbers.
mod non_finite {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    const POS_INF: &str = "Infinity";
    const NEG_INF: &str = "-Infinity";
    const NAN: &str = "NaN";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_sign_positive() {
            serializer.serialize_str(POS_INF)
        } else {
            serializer.serialize_str(NEG_INF)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Token(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Token(token) => match token.as_str() {
                POS_INF => Ok(f64::INFINITY),
                NEG_INF => Ok(f64::NEG_INFINITY),
                NAN => Ok(f64::NAN),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"Infinity\", \"-Infinity\" or \"NaN\"",
                )),
            },
        }
    }
}

/// Signal quality side channel, reported to observers alongside each payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QualityReport {
    pub window_len: usize,
    pub artifacts_replaced: usize,
    /// Mean of the raw window, in input units.
    pub dc_offset: f64,
    pub peak_snr: f64,
}

impl QualityReport {
    pub fn high_dc_offset(&self, threshold: f64) -> bool {
        self.dc_offset.abs() > threshold
    }
}
