// src/dsp/bandpower.rs
//! Band power integration and theta peak SNR.
use crate::types::BandDefinition;

/// Signal band for the theta peak SNR, in Hz.
pub const THETA_SNR_SIGNAL_BAND: BandDefinition = BandDefinition::new(3.0, 9.0);

/// Flanking reference bands for the theta peak SNR, in Hz.
pub const THETA_SNR_NOISE_BANDS: [BandDefinition; 2] = [
    BandDefinition::new(2.0, 3.0),
    BandDefinition::new(9.0, 10.0),
];

fn in_band(f: f64, band: &BandDefinition) -> bool {
    f >= band.low_hz && f <= band.high_hz
}

/// Composite Simpson's rule over samples `y` at (possibly uneven) abscissae `x`.
///
/// Interval pairs are integrated with the non-uniform parabola formula; when
/// the interval count is odd the final interval uses the trapezoidal rule.
pub fn simpson(y: &[f64], x: &[f64]) -> f64 {
    assert_eq!(y.len(), x.len(), "simpson needs one abscissa per sample");
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    let intervals = n - 1;
    let paired = intervals - intervals % 2;
    let mut total = 0.0;
    let mut i = 0;
    while i < paired {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let hprod = h0 * h1;
        let h0_over_h1 = h0 / h1;
        total += hsum / 6.0
            * (y[i] * (2.0 - 1.0 / h0_over_h1)
                + y[i + 1] * (hsum * hsum / hprod)
                + y[i + 2] * (2.0 - h0_over_h1));
        i += 2;
    }
    if intervals % 2 == 1 {
        total += 0.5 * (x[n - 1] - x[n - 2]) * (y[n - 1] + y[n - 2]);
    }
    total
}

/// Integrated PSD over `[band.low_hz, band.high_hz]` (both edges inclusive).
///
/// No matching bins gives 0 and a single bin is returned as-is.
pub fn bandpower(psd: &[f64], freqs: &[f64], band: BandDefinition) -> f64 {
    let (values, points): (Vec<f64>, Vec<f64>) = psd
        .iter()
        .zip(freqs)
        .filter(|(_, f)| in_band(**f, &band))
        .map(|(p, f)| (*p, *f))
        .unzip();
    match values.len() {
        0 => 0.0,
        1 => values[0],
        _ => simpson(&values, &points),
    }
}

/// Peak-to-flank ratio: `max(signal bins) / mean(noise bins)`.
///
/// NaN when the signal band (or every noise band) has no bins, `+∞` when the
/// noise mean is exactly zero.
pub fn theta_peak_snr(
    psd: &[f64],
    freqs: &[f64],
    signal_band: BandDefinition,
    noise_bands: &[BandDefinition],
) -> f64 {
    let peak = psd
        .iter()
        .zip(freqs)
        .filter(|(_, f)| in_band(**f, &signal_band))
        .map(|(p, _)| *p)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.max(p))));
    let Some(peak) = peak else {
        return f64::NAN;
    };

    let noise: Vec<f64> = noise_bands
        .iter()
        .flat_map(|band| {
            psd.iter()
                .zip(freqs)
                .filter(move |(_, f)| in_band(**f, band))
                .map(|(p, _)| *p)
        })
        .collect();
    if noise.is_empty() {
        return f64::NAN;
    }
    let noise_mean = noise.iter().sum::<f64>() / noise.len() as f64;
    if noise_mean == 0.0 {
        return f64::INFINITY;
    }
    peak / noise_mean
}

/// [`theta_peak_snr`] with the default 3-9 Hz signal band and 2-3/9-10 Hz flanks.
pub fn default_theta_peak_snr(psd: &[f64], freqs: &[f64]) -> f64 {
    theta_peak_snr(psd, freqs, THETA_SNR_SIGNAL_BAND, &THETA_SNR_NOISE_BANDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(len: usize, df: f64) -> Vec<f64> {
        (0..len).map(|k| k as f64 * df).collect()
    }

    #[test]
    fn empty_band_is_zero() {
        let freqs = axis(10, 1.0);
        let psd = vec![1.0; 10];
        assert_eq!(bandpower(&psd, &freqs, BandDefinition::new(20.0, 30.0)), 0.0);
    }

    #[test]
    fn single_bin_is_returned_verbatim() {
        let freqs = axis(10, 1.0);
        let psd: Vec<f64> = (0..10).map(|k| k as f64 * 1.5).collect();
        assert_eq!(bandpower(&psd, &freqs, BandDefinition::new(3.5, 4.5)), 6.0);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let freqs = axis(10, 1.0);
        let psd = vec![2.0; 10];
        // bins 4..=8 -> four intervals of constant 2
        assert!((bandpower(&psd, &freqs, BandDefinition::new(4.0, 8.0)) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn simpson_is_exact_for_quadratics() {
        let x = axis(9, 0.5);
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v * v - v + 2.0).collect();
        // ∫0^4 (3x² - x + 2) dx = 64 - 8 + 8
        assert!((simpson(&y, &x) - 64.0).abs() < 1e-10);
    }

    #[test]
    fn simpson_handles_uneven_spacing() {
        let x = [0.0, 0.5, 2.0, 2.5, 4.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        assert!((simpson(&y, &x) - 64.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn simpson_adds_trapezoid_for_odd_interval_count() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        // linear integrand: both rules are exact
        assert!((simpson(&y, &x) - 4.5).abs() < 1e-12);
        assert_eq!(simpson(&[1.0, 3.0], &[0.0, 2.0]), 4.0);
    }

    #[test]
    fn snr_without_signal_bins_is_nan() {
        let freqs = vec![20.0, 21.0, 22.0];
        let psd = vec![1.0, 1.0, 1.0];
        assert!(default_theta_peak_snr(&psd, &freqs).is_nan());
    }

    #[test]
    fn snr_with_silent_noise_is_infinite() {
        let freqs = axis(12, 1.0);
        let mut psd = vec![0.0; 12];
        psd[6] = 4.0;
        assert_eq!(default_theta_peak_snr(&psd, &freqs), f64::INFINITY);
    }

    #[test]
    fn snr_is_peak_over_mean_noise() {
        let freqs = axis(12, 1.0);
        let mut psd = vec![1.0; 12];
        psd[6] = 10.0;
        psd[2] = 3.0;
        // noise bins 2, 3 (edge of 2-3) and 9, 10: mean (3 + 1 + 1 + 1) / 4
        assert!((default_theta_peak_snr(&psd, &freqs) - 10.0 / 1.5).abs() < 1e-12);
    }
}
