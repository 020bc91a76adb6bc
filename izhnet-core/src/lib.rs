//! izhnet-core: Izhikevich spiking network with random E/I wiring
//!
//! Per step: neurons integrate on last step's synaptic current, spikes are
//! detected on the pre-update potential, then every connection's trace is
//! decayed/bumped and the synaptic current for the next step is accumulated.

pub mod config;
pub mod error;
pub mod log;
pub mod neuron;
pub mod simulator;
pub mod synapse;
pub mod topology;

// Re-exports
pub use config::{IzhikevichParams, NetworkConfig};
pub use error::{SimError, SimResult};
pub use log::{SimulationOutput, SpikeEvent, SpikeLog, TraceLog, TraceSample};
pub use neuron::{draw_external_currents, integrate, NeuronPopulation};
pub use simulator::{RunState, Simulator};
pub use synapse::{step_trace, SynapseBank};
pub use topology::{generate, generate_for, Connection, NeuronRole};
