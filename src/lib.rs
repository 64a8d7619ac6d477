//! Single-channel EEG feature engine.
//!
//! Raw samples from a wearable headset go through artifact scrubbing, a
//! powerline notch, a zero-phase bandpass and a Welch PSD. The spectrum is
//! integrated into the classical EEG bands and reduced to theta metrics
//! (contribution, SNR-weighted confidence, smoothed trend).
//!
//! ```no_run
//! use neurotheta::{EngineConfig, ThetaEngine};
//!
//! let mut engine = ThetaEngine::new(EngineConfig::default())?;
//! for sample in [0.0_f64; 1024] {
//!     engine.add_sample(sample);
//! }
//! if let Some(features) = engine.process_live_data() {
//!     println!("theta {:.1}%", features.theta_contribution);
//! }
//! # Ok::<(), neurotheta::EngineError>(())
//! ```
pub mod buffer;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod observer;
pub mod parse;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod worker;

pub use buffer::SampleBuffer;
pub use config::{EngineConfig, ScalingPolicy};
pub use engine::{EngineState, ProcessOutcome, ThetaEngine, MIN_SAMPLES};
pub use error::EngineError;
pub use observer::{FeatureObserver, FeatureStats, LogObserver, StatsObserver};
pub use parse::{parse_input, RawInput};
pub use pipeline::LivePipeline;
pub use source::{ReplaySource, SampleSource};
pub use types::{BandDefinition, BandPowers, FeaturePayload, FrequencyBands, QualityReport};
pub use worker::{spawn_worker, EngineCommand, EngineEvent, WorkerHandle};
