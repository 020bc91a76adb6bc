//! Spike and mean-potential output streams

use crate::error::{SimError, SimResult};

/// A spike at continuous time `t * h`. `neuron_id` is 0-based.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeEvent {
    pub neuron_id: u32,
    pub time: f64,
}

/// Append-only, in detection order (time, then neuron index).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpikeLog {
    events: Vec<SpikeEvent>,
}

impl SpikeLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: SpikeEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[SpikeEvent] {
        &self.events
    }

    pub fn iter(&self) -> core::slice::Iter<'_, SpikeEvent> {
        self.events.iter()
    }

    /// Spikes emitted by neuron `n`.
    pub fn count_for(&self, n: u32) -> usize {
        self.events.iter().filter(|e| e.neuron_id == n).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceSample {
    pub time: f64,
    pub mean_potential: f64,
}

/// One sample per time step, time-ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceLog {
    samples: Vec<TraceSample>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for one sample per step up front.
    pub fn with_capacity(steps: usize) -> SimResult<Self> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(steps)
            .map_err(|_| SimError::Capacity { cells: steps as u128 })?;
        Ok(Self { samples })
    }

    /// Appends the mean of `potentials` (summed in index order) at `time`.
    pub fn push_mean(&mut self, time: f64, potentials: &[f64]) {
        let sum: f64 = potentials.iter().sum();
        self.samples.push(TraceSample {
            time,
            mean_potential: sum / potentials.len() as f64,
        });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TraceSample> {
        self.samples.iter()
    }
}

/// Both streams of a finished run, handed to the sink unmodified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationOutput {
    pub spikes: SpikeLog,
    pub trace: TraceLog,
}

impl SimulationOutput {
    /// Average spikes per neuron per second over `duration_ms`.
    pub fn mean_firing_rate(&self, num_neurons: usize, duration_ms: f64) -> f64 {
        if num_neurons == 0 || duration_ms <= 0.0 {
            return 0.0;
        }
        self.spikes.len() as f64 / num_neurons as f64 / (duration_ms / 1000.0)
    }
}
