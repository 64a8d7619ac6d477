// src/observer.rs
//! Hooks for reporting per-window results and skipped cycles.
use std::sync::{Arc, Mutex};

use log::{debug, trace};

use crate::engine::ProcessOutcome;
use crate::types::{BandPowers, FeaturePayload, QualityReport};

/// Receives every engine outcome. Implementations must be cheap; they run
/// inline on the processing path.
pub trait FeatureObserver: Send {
    fn on_features(&mut self, payload: &FeaturePayload, quality: &QualityReport);
    fn on_skip(&mut self, outcome: &ProcessOutcome);
}

/// Emits one structured `log` line per outcome.
#[derive(Debug, Default)]
pub struct LogObserver;

impl FeatureObserver for LogObserver {
    fn on_features(&mut self, payload: &FeaturePayload, quality: &QualityReport) {
        let bands = &payload.band_powers;
        debug!(
            concat!(
                "features window={} artifacts={} dc={:.3} total={:.4} ",
                "delta={:.4} theta={:.4} alpha={:.4} beta={:.4} gamma={:.4} ",
                "theta_pct={:.2} theta_rel={:.3} snr_peak={:.3} snr_broad={:.3} smoothed={:.2}"
            ),
            quality.window_len,
            quality.artifacts_replaced,
            quality.dc_offset,
            payload.total_power,
            bands.delta,
            bands.theta,
            bands.alpha,
            bands.beta,
            bands.gamma,
            payload.theta_contribution,
            payload.theta_relative,
            payload.theta_snr_peak,
            payload.theta_snr_broad,
            payload.smoothed_theta,
        );
    }

    fn on_skip(&mut self, outcome: &ProcessOutcome) {
        trace!("cycle skipped: {outcome:?}");
    }
}

/// Counters and last-value gauges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureStats {
    pub processed: u64,
    pub skipped: u64,
    pub artifacts_replaced: u64,
    pub last_peak_snr: Option<f64>,
    pub last_band_powers: Option<BandPowers>,
    pub last_dc_offset: Option<f64>,
}

/// Accumulates [`FeatureStats`] behind a shared handle so the owner can read
/// them while the engine holds the observer.
#[derive(Clone, Debug, Default)]
pub struct StatsObserver {
    stats: Arc<Mutex<FeatureStats>>,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FeatureStats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn with_stats(&self, f: impl FnOnce(&mut FeatureStats)) {
        match self.stats.lock() {
            Ok(mut stats) => f(&mut *stats),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

impl FeatureObserver for StatsObserver {
    fn on_features(&mut self, payload: &FeaturePayload, quality: &QualityReport) {
        self.with_stats(|stats| {
            stats.processed += 1;
            stats.artifacts_replaced += quality.artifacts_replaced as u64;
            stats.last_peak_snr = Some(payload.theta_snr_peak);
            stats.last_band_powers = Some(payload.band_powers);
            stats.last_dc_offset = Some(quality.dc_offset);
        });
    }

    fn on_skip(&mut self, _outcome: &ProcessOutcome) {
        self.with_stats(|stats| stats.skipped += 1);
    }
}
