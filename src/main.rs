// src/main.rs
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use neurotheta::{
    EngineConfig, FeaturePayload, LivePipeline, RawInput, ReplaySource, ScalingPolicy,
    StatsObserver, ThetaEngine,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Delimited numbers (comma, semicolon or whitespace)
    Text,
    /// Little-endian signed 16-bit device counts
    Int16le,
}

#[derive(Parser, Debug)]
#[command(
    name = "neurotheta",
    version,
    about = "Extract EEG band powers and theta metrics from a single-channel recording"
)]
struct Cli {
    /// Recording to analyse
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Text)]
    format: InputFormat,

    /// Convert device counts to microvolts (ThinkGear scale)
    #[arg(long)]
    microvolts: bool,

    /// JSON file with engine settings; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay the file sample by sample through the streaming buffer
    #[arg(long)]
    stream: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if cli.microvolts {
        config.scaling = ScalingPolicy::neurosky_microvolts();
    }
    Ok(config)
}

fn load_input(cli: &Cli) -> Result<RawInput> {
    let bytes = fs::read(&cli.file).with_context(|| format!("reading {}", cli.file.display()))?;
    Ok(match cli.format {
        InputFormat::Int16le => RawInput::Int16Le(bytes),
        InputFormat::Text => RawInput::Text(
            String::from_utf8(bytes).context("text recordings must be UTF-8")?,
        ),
    })
}

fn emit(out: &mut impl Write, payload: &FeaturePayload) -> Result<()> {
    serde_json::to_writer(&mut *out, payload)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let config = load_config(&cli)?;
    let input = load_input(&cli)?;
    let stats = StatsObserver::new();
    let mut engine = ThetaEngine::new(config)?.with_observer(stats.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.stream {
        // the engine applies the configured scaling when samples are added
        let raw = neurotheta::parse_input(&input, ScalingPolicy::DeviceUnits)?;
        log::info!("streaming {} samples", raw.len());
        let mut pipeline = LivePipeline::new(ReplaySource::chunked(&raw, 1), engine);
        for payload in pipeline.run()? {
            emit(&mut out, &payload)?;
        }
    } else {
        match engine.process_input(&input)? {
            Some(payload) => emit(&mut out, &payload)?,
            None => bail!(
                "recording is shorter than one analysis window ({} samples)",
                engine.config().window_size
            ),
        }
    }

    let summary = stats.snapshot();
    log::info!(
        "done: {} windows processed, {} skipped, {} artifact samples replaced",
        summary.processed,
        summary.skipped,
        summary.artifacts_replaced
    );
    Ok(())
}
