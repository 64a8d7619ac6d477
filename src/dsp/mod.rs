// src/dsp/mod.rs
// Numerical stages of the feature pipeline; each one is a pure function of its input.
pub mod artifact;
pub mod bandpower;
pub mod fft;
pub mod filter;
pub mod metrics;
pub mod welch;

pub use artifact::{remove_artifacts, scrub_artifacts, Scrubbed, DEFAULT_ARTIFACT_WINDOW};
pub use bandpower::{
    bandpower, default_theta_peak_snr, simpson, theta_peak_snr, THETA_SNR_NOISE_BANDS,
    THETA_SNR_SIGNAL_BAND,
};
pub use fft::{fft, Spectrum};
pub use filter::{
    apply_iir_filter, design_highpass, design_lowpass, design_notch, filtfilt, BandpassCascade,
    FilterCoefficients,
};
pub use metrics::{calculate_theta_metrics, ExponentialSmoother, ThetaMetrics};
pub use welch::{hann_window, PsdResult, WelchEstimator};
