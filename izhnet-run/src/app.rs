// Application state for a single run: engine plus output location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::backend::Engine;
use crate::sink;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub neurons: usize,
    pub connections: usize,
    pub spikes: usize,
    /// Spikes per neuron per second
    pub mean_rate_hz: f64,
    pub spike_path: PathBuf,
    pub trace_path: PathBuf,
}

pub struct App<B: Engine> {
    pub backend: B,
    pub out_dir: PathBuf,
}

impl<B: Engine> App<B> {
    pub fn new(backend: B, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            out_dir: out_dir.into(),
        }
    }

    /// Simulate once, then hand both streams to the sink.
    pub fn run(&mut self) -> Result<RunSummary> {
        let cfg = *self.backend.config();
        let out = self.backend.run().context("simulation failed")?;

        let neurons = cfg.num_neurons();
        let mean_rate_hz = out.mean_firing_rate(neurons, cfg.duration());
        let (spike_path, trace_path) = sink::persist(&self.out_dir, &out)?;

        let summary = RunSummary {
            neurons,
            connections: self.backend.connections(),
            spikes: out.spikes.len(),
            mean_rate_hz,
            spike_path,
            trace_path,
        };
        info!(
            neurons = summary.neurons,
            connections = summary.connections,
            spikes = summary.spikes,
            mean_rate_hz = summary.mean_rate_hz,
            spikes_file = %summary.spike_path.display(),
            trace_file = %summary.trace_path.display(),
            "run complete"
        );
        Ok(summary)
    }
}
