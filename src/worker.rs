// src/worker.rs
//! Dedicated processing thread that owns one engine.
//!
//! Transport callbacks push samples and timers request processing through the
//! same command channel, so the engine only ever has one writer.
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::engine::ThetaEngine;
use crate::error::EngineError;
use crate::parse::RawInput;
use crate::types::FeaturePayload;

/// Commands sent to the worker.
#[derive(Clone, Debug)]
pub enum EngineCommand {
    AddSample(f64),
    AddInput(RawInput),
    /// Run the pipeline over the buffered samples.
    Process,
    Shutdown,
}

/// Messages sent back from the worker.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Features(FeaturePayload),
    Skipped { buffered: usize },
    ParseFailed(EngineError),
}

pub struct WorkerHandle {
    commands: Sender<EngineCommand>,
    join: JoinHandle<ThetaEngine>,
}

impl WorkerHandle {
    pub fn sender(&self) -> Sender<EngineCommand> {
        self.commands.clone()
    }

    /// Stops the worker after it drains queued commands and hands the engine back.
    pub fn shutdown(self) -> thread::Result<ThetaEngine> {
        self.commands.send(EngineCommand::Shutdown).ok();
        self.join.join()
    }
}

/// Moves `engine` onto its own thread. Events are delivered on the returned receiver.
pub fn spawn_worker(engine: ThetaEngine) -> (WorkerHandle, Receiver<EngineEvent>) {
    let (tx_cmd, rx_cmd) = mpsc::channel();
    let (tx_event, rx_event) = mpsc::channel();
    let join = thread::spawn(move || run(engine, rx_cmd, tx_event));
    (
        WorkerHandle {
            commands: tx_cmd,
            join,
        },
        rx_event,
    )
}

fn run(
    mut engine: ThetaEngine,
    rx_cmd: Receiver<EngineCommand>,
    tx: Sender<EngineEvent>,
) -> ThetaEngine {
    debug!("feature worker started");
    while let Ok(command) = rx_cmd.recv() {
        match command {
            EngineCommand::AddSample(value) => engine.add_sample(value),
            EngineCommand::AddInput(input) => {
                if let Err(err) = engine.add_input(&input) {
                    warn!("dropping malformed input: {err}");
                    tx.send(EngineEvent::ParseFailed(err)).ok();
                }
            }
            EngineCommand::Process => {
                let event = match engine.process_live_data() {
                    Some(payload) => EngineEvent::Features(payload),
                    None => EngineEvent::Skipped {
                        buffered: engine.buffered_len(),
                    },
                };
                tx.send(event).ok();
            }
            EngineCommand::Shutdown => break,
        }
    }
    debug!("feature worker stopped");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::f64::consts::PI;

    #[test]
    fn worker_processes_streamed_samples() {
        let engine = ThetaEngine::new(EngineConfig::default()).unwrap();
        let (handle, events) = spawn_worker(engine);
        let producer = handle.sender();

        producer.send(EngineCommand::Process).unwrap();
        for i in 0..600 {
            let v = 20.0 * (2.0 * PI * 10.0 * i as f64 / 512.0).sin();
            producer.send(EngineCommand::AddSample(v)).unwrap();
        }
        producer
            .send(EngineCommand::AddInput(RawInput::Text("1,oops".into())))
            .unwrap();
        producer.send(EngineCommand::Process).unwrap();

        assert_eq!(events.recv().unwrap(), EngineEvent::Skipped { buffered: 0 });
        assert!(matches!(
            events.recv().unwrap(),
            EngineEvent::ParseFailed(EngineError::InvalidToken { index: 1, .. })
        ));
        match events.recv().unwrap() {
            EngineEvent::Features(payload) => {
                assert_eq!(payload.band_powers.dominant(), Some("alpha"))
            }
            other => panic!("expected features, got {other:?}"),
        }

        let engine = handle.shutdown().unwrap();
        assert_eq!(engine.buffered_len(), 600);
        assert!(engine.smoothed_theta().is_some());
    }
}
