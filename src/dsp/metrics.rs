// src/dsp/metrics.rs
//! Theta-specific quality metrics and exponential smoothing.
use crate::dsp::artifact::variance;
use crate::dsp::bandpower::{bandpower, default_theta_peak_snr};
use crate::types::{BandPowers, FrequencyBands};

/// Below this peak SNR the theta confidence is forced to zero.
pub const MIN_THETA_SNR: f64 = 0.2;

/// Weight of the newest value in [`ExponentialSmoother`].
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThetaMetrics {
    pub band_powers: BandPowers,
    /// Variance of the filtered time-domain window.
    pub total_power: f64,
    pub theta_pct: f64,
    /// `snr / (snr + 1)` when the peak SNR is usable, otherwise 0.
    pub adapted_theta: f64,
    pub peak_snr: f64,
    pub broadband_snr: f64,
}

pub fn band_powers(psd: &[f64], freqs: &[f64], bands: &FrequencyBands) -> BandPowers {
    BandPowers {
        delta: bandpower(psd, freqs, bands.delta),
        theta: bandpower(psd, freqs, bands.theta),
        alpha: bandpower(psd, freqs, bands.alpha),
        beta: bandpower(psd, freqs, bands.beta),
        gamma: bandpower(psd, freqs, bands.gamma),
    }
}

fn confidence_from_snr(snr: f64) -> f64 {
    if snr.is_finite() && snr >= MIN_THETA_SNR {
        snr / (snr + 1.0)
    } else {
        0.0
    }
}

/// Theta power against the other four bands combined.
fn broadband_snr(powers: &BandPowers) -> f64 {
    let rest = powers.delta + powers.alpha + powers.beta + powers.gamma;
    if rest > 0.0 {
        powers.theta / rest
    } else if powers.theta > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

pub fn calculate_theta_metrics(
    psd: &[f64],
    freqs: &[f64],
    time_domain: &[f64],
    bands: &FrequencyBands,
) -> ThetaMetrics {
    let band_powers = band_powers(psd, freqs, bands);
    let total_power = variance(time_domain);
    let theta_pct = if total_power > 0.0 {
        band_powers.theta / total_power * 100.0
    } else {
        0.0
    };
    let peak_snr = default_theta_peak_snr(psd, freqs);
    ThetaMetrics {
        band_powers,
        total_power,
        theta_pct,
        adapted_theta: confidence_from_snr(peak_snr),
        peak_snr,
        broadband_snr: broadband_snr(&band_powers),
    }
}

/// `s = α·v + (1-α)·s_prev`, seeded with the first value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f64,
    state: Option<f64>,
}

impl Default for ExponentialSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA)
    }
}

impl ExponentialSmoother {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.state {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.state = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}
