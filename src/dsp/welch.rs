// src/dsp/welch.rs
//! Welch power spectral density.
//!
//! Overlapping Hann-windowed segments, one-sided periodograms normalized to
//! units²/Hz, averaged across segments:
//!
//! ```text
//! P[k] = |X[k]|² / (fs · Σw²)    (×2 for 0 < k < nfft/2)
//! ```
use crate::dsp::fft::fft;

/// One-sided PSD with its frequency axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PsdResult {
    pub frequencies: Vec<f64>,
    pub power: Vec<f64>,
}

impl PsdResult {
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// Frequency of the largest bin.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| self.frequencies[k])
    }

    /// Spacing between bins in Hz.
    pub fn resolution_hz(&self) -> Option<f64> {
        match self.frequencies.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }
}

/// Hann window, `0.5 * (1 - cos(2πn/(N-1)))`.
pub fn hann_window(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|n| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * n as f64 / denom).cos()))
        .collect()
}

/// Segmented PSD estimator with a precomputed window.
#[derive(Clone, Debug)]
pub struct WelchEstimator {
    sample_rate_hz: f64,
    nperseg: usize,
    noverlap: usize,
    window: Vec<f64>,
    window_power: f64,
}

impl WelchEstimator {
    /// `nperseg` must be a power of two and larger than `noverlap`.
    pub fn new(sample_rate_hz: f64, nperseg: usize, noverlap: usize) -> Self {
        assert!(
            nperseg.is_power_of_two(),
            "segment length {nperseg} is not a power of two"
        );
        assert!(
            noverlap < nperseg,
            "overlap {noverlap} must be smaller than segment length {nperseg}"
        );
        let window = hann_window(nperseg);
        let window_power = window.iter().map(|w| w * w).sum();
        Self {
            sample_rate_hz,
            nperseg,
            noverlap,
            window,
            window_power,
        }
    }

    pub fn nperseg(&self) -> usize {
        self.nperseg
    }

    pub fn nfft(&self) -> usize {
        self.nperseg
    }

    pub fn hop(&self) -> usize {
        self.nperseg - self.noverlap
    }

    /// Number of full segments that fit in `len` samples.
    pub fn num_segments(&self, len: usize) -> usize {
        if len < self.nperseg {
            return 0;
        }
        (len - self.noverlap) / self.hop()
    }

    /// Bin centre frequencies, `k · fs / nfft`.
    pub fn frequencies(&self) -> Vec<f64> {
        let nfft = self.nfft();
        (0..=nfft / 2)
            .map(|k| k as f64 * self.sample_rate_hz / nfft as f64)
            .collect()
    }

    /// Estimates the PSD; returns an empty result when no full segment fits.
    pub fn compute(&self, samples: &[f64]) -> PsdResult {
        let segments = self.num_segments(samples.len());
        if segments == 0 {
            return PsdResult::default();
        }
        let nfft = self.nfft();
        let bins = nfft / 2 + 1;
        let scale = 1.0 / (self.sample_rate_hz * self.window_power);
        let mut power = vec![0.0; bins];
        let mut segment = vec![0.0; self.nperseg];

        for index in 0..segments {
            let start = index * self.hop();
            for ((dst, &x), &w) in segment
                .iter_mut()
                .zip(&samples[start..start + self.nperseg])
                .zip(&self.window)
            {
                *dst = x * w;
            }
            let spectrum = fft(&segment);
            for (k, acc) in power.iter_mut().enumerate() {
                let mut p = spectrum.power(k) * scale;
                if k != 0 && k != nfft / 2 {
                    p *= 2.0;
                }
                *acc += p;
            }
        }

        let count = segments as f64;
        for p in &mut power {
            *p /= count;
        }
        log::trace!(
            "welch: {} samples, {segments} segments, {bins} bins",
            samples.len()
        );
        PsdResult {
            frequencies: self.frequencies(),
            power,
        }
    }
}
