// src/dsp/artifact.rs
//! Amplitude outlier scrubbing.
//!
//! A sample is an outlier when it deviates from the window mean by more than
//! three population standard deviations. Outliers are replaced by the median
//! of the clean samples around them. Statistics come from the original series
//! and the scan runs once.

/// Default half-width of the replacement neighbourhood.
pub const DEFAULT_ARTIFACT_WINDOW: usize = 10;

const THRESHOLD_STDS: f64 = 3.0;

/// Result of a scrubbing pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Scrubbed {
    pub samples: Vec<f64>,
    pub replaced: usize,
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance.
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values
        .iter()
        .map(|v| {
            let delta = v - mean;
            delta * delta
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Median; averages the two middle values for even lengths.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    })
}

/// Replaces outliers with local medians and reports how many were touched.
pub fn scrub_artifacts(samples: &[f64], window: usize) -> Scrubbed {
    if samples.len() < 2 {
        return Scrubbed {
            samples: samples.to_vec(),
            replaced: 0,
        };
    }
    let mean = mean(samples);
    let threshold = THRESHOLD_STDS * variance(samples).sqrt();
    if threshold <= 0.0 {
        return Scrubbed {
            samples: samples.to_vec(),
            replaced: 0,
        };
    }

    let is_outlier: Vec<bool> = samples
        .iter()
        .map(|v| (v - mean).abs() > threshold)
        .collect();
    let mut global_median = None;
    let mut out = samples.to_vec();
    let mut replaced = 0;
    let mut neighbours = Vec::with_capacity(2 * window + 1);
    for (i, slot) in out.iter_mut().enumerate() {
        if !is_outlier[i] {
            continue;
        }
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(samples.len());
        neighbours.clear();
        neighbours.extend(
            (start..end)
                .filter(|&j| !is_outlier[j])
                .map(|j| samples[j]),
        );
        let replacement = match median(&neighbours) {
            Some(local) => local,
            None => *global_median.get_or_insert_with(|| median(samples).unwrap_or(mean)),
        };
        *slot = replacement;
        replaced += 1;
    }
    if replaced > 0 {
        log::trace!("artifact scrub replaced {replaced} of {} samples", samples.len());
    }
    Scrubbed {
        samples: out,
        replaced,
    }
}

/// Convenience wrapper returning only the cleaned series.
pub fn remove_artifacts(samples: &[f64], window: usize) -> Vec<f64> {
    scrub_artifacts(samples, window).samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn clean_signal_is_untouched() {
        let mut rng = StdRng::seed_from_u64(7);
        let signal: Vec<f64> = (0..512)
            .map(|i| (i as f64 * 0.1).sin() * 10.0 + rng.gen_range(-0.5..0.5))
            .collect();
        let scrubbed = scrub_artifacts(&signal, DEFAULT_ARTIFACT_WINDOW);
        assert_eq!(scrubbed.replaced, 0);
        assert_eq!(scrubbed.samples, signal);
    }

    #[test]
    fn spike_is_replaced_by_local_median() {
        let mut signal: Vec<f64> = (0..200).map(|i| (i % 5) as f64).collect();
        signal[100] = 500.0;
        let scrubbed = scrub_artifacts(&signal, 10);
        assert_eq!(scrubbed.replaced, 1);
        // neighbours 90..=110 minus the spike: four copies each of 0..=4
        assert_eq!(scrubbed.samples[100], 2.0);
        assert_eq!(scrubbed.samples[99], signal[99]);
    }

    #[test]
    fn negative_spike_is_replaced() {
        let mut signal = vec![1.0; 100];
        for (i, v) in signal.iter_mut().enumerate() {
            *v += (i % 2) as f64;
        }
        signal[40] = -300.0;
        let out = remove_artifacts(&signal, 3);
        assert!(out[40] >= 1.0 && out[40] <= 2.0);
    }

    #[test]
    fn falls_back_to_global_median_when_neighbourhood_is_dirty() {
        let mut signal = vec![0.0; 60];
        for (i, v) in signal.iter_mut().enumerate() {
            *v = (i % 3) as f64;
        }
        signal[30] = 400.0;
        signal[31] = 400.0;
        let out = remove_artifacts(&signal, 0);
        let expected = median(&signal).unwrap();
        assert_eq!(out[30], expected);
        assert_eq!(out[31], expected);
    }

    #[test]
    fn degenerate_inputs_pass_through() {
        assert!(remove_artifacts(&[], 10).is_empty());
        assert_eq!(remove_artifacts(&[42.0], 10), vec![42.0]);
        assert_eq!(remove_artifacts(&[3.0; 16], 10), vec![3.0; 16]);
    }

    #[test]
    fn median_handles_even_lengths() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[]), None);
    }
}
