// src/dsp/filter.rs
//! IIR filter design and zero-phase application.
//!
//! The notch is a standard two-pole/two-zero section. High-pass and low-pass
//! stages are single-pole RC designs; a bandpass is one of each, cascaded.
use std::f64::consts::PI;

/// Feed-forward (`b`) and feedback (`a`) coefficients, normalized so `a[0] == 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl FilterCoefficients {
    fn normalized(b: Vec<f64>, a: Vec<f64>) -> Self {
        let a0_inv = 1.0 / a[0];
        let coeffs = Self {
            b: b.iter().map(|v| v * a0_inv).collect(),
            a: a.iter().map(|v| v * a0_inv).collect(),
        };
        assert!(
            coeffs.b.iter().chain(&coeffs.a).all(|v| v.is_finite()),
            "filter design produced non-finite coefficients: {coeffs:?}"
        );
        coeffs
    }

    /// Delay-line length for a direct-form realization.
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()) - 1
    }
}

fn check_frequency(freq_hz: f64, sample_rate_hz: f64) {
    debug_assert!(
        freq_hz > 0.0 && freq_hz < sample_rate_hz * 0.5,
        "filter frequency {freq_hz} Hz outside (0, {})",
        sample_rate_hz * 0.5
    );
}

/// Narrow band-reject section centred on `freq_hz`.
pub fn design_notch(sample_rate_hz: f64, freq_hz: f64, q: f64) -> FilterCoefficients {
    check_frequency(freq_hz, sample_rate_hz);
    debug_assert!(q > 0.0, "notch Q must be positive");
    let w0 = 2.0 * PI * freq_hz / sample_rate_hz;
    let alpha = w0.sin() / (2.0 * q);
    let cos_w0 = w0.cos();
    FilterCoefficients::normalized(
        vec![1.0, -2.0 * cos_w0, 1.0],
        vec![1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha],
    )
}

fn rc_and_dt(sample_rate_hz: f64, cutoff_hz: f64) -> (f64, f64) {
    (1.0 / (2.0 * PI * cutoff_hz), 1.0 / sample_rate_hz)
}

/// Single-pole RC high-pass: `y[n] = k * (y[n-1] + x[n] - x[n-1])`.
pub fn design_highpass(sample_rate_hz: f64, cutoff_hz: f64) -> FilterCoefficients {
    check_frequency(cutoff_hz, sample_rate_hz);
    let (rc, dt) = rc_and_dt(sample_rate_hz, cutoff_hz);
    let k = rc / (rc + dt);
    FilterCoefficients::normalized(vec![k, -k], vec![1.0, -k])
}

/// Single-pole RC low-pass: `y[n] = k * x[n] + (1 - k) * y[n-1]`.
pub fn design_lowpass(sample_rate_hz: f64, cutoff_hz: f64) -> FilterCoefficients {
    check_frequency(cutoff_hz, sample_rate_hz);
    let (rc, dt) = rc_and_dt(sample_rate_hz, cutoff_hz);
    let k = dt / (rc + dt);
    FilterCoefficients::normalized(vec![k, 0.0], vec![1.0, -(1.0 - k)])
}

/// Runs `samples` through the filter once, starting from rest.
///
/// Transposed direct form II with an explicit delay line that is updated
/// sample by sample.
pub fn apply_iir_filter(samples: &[f64], coeffs: &FilterCoefficients) -> Vec<f64> {
    let n = coeffs.b.len().max(coeffs.a.len());
    let mut b = coeffs.b.clone();
    let mut a = coeffs.a.clone();
    b.resize(n, 0.0);
    a.resize(n, 0.0);

    let mut z = vec![0.0; n - 1];
    let mut out = Vec::with_capacity(samples.len());
    for &x in samples {
        let y = b[0] * x + z.first().copied().unwrap_or(0.0);
        for i in 0..z.len() {
            let next = if i + 1 < z.len() { z[i + 1] } else { 0.0 };
            z[i] = b[i + 1] * x + next - a[i + 1] * y;
        }
        out.push(y);
    }
    out
}

/// Forward-backward filtering; the net phase shift cancels out.
///
/// Inputs shorter than the numerator are returned unchanged.
pub fn filtfilt(samples: &[f64], coeffs: &FilterCoefficients) -> Vec<f64> {
    if samples.len() < coeffs.b.len() {
        return samples.to_vec();
    }
    let mut forward = apply_iir_filter(samples, coeffs);
    forward.reverse();
    let mut backward = apply_iir_filter(&forward, coeffs);
    backward.reverse();
    backward
}

/// One high-pass stage followed by one low-pass stage, each zero-phase.
#[derive(Clone, Debug)]
pub struct BandpassCascade {
    highpass: FilterCoefficients,
    lowpass: FilterCoefficients,
}

impl BandpassCascade {
    pub fn new(sample_rate_hz: f64, low_hz: f64, high_hz: f64) -> Self {
        Self {
            highpass: design_highpass(sample_rate_hz, low_hz),
            lowpass: design_lowpass(sample_rate_hz, high_hz),
        }
    }

    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let high_passed = filtfilt(samples, &self.highpass);
        filtfilt(&high_passed, &self.lowpass)
    }
}
