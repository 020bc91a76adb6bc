// Engine abstraction so the runner can drive either simulator.

use izhnet_core::{NetworkConfig, SimResult, SimulationOutput, Simulator};
use izhnet_core_plus::CompactSimulator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Common interface for anything that turns a configured network into output streams.
pub trait Engine {
    /// Run the whole simulation once.
    fn run(&mut self) -> SimResult<SimulationOutput>;
    fn config(&self) -> &NetworkConfig;
    fn connections(&self) -> usize;
}

impl Engine for Simulator {
    fn run(&mut self) -> SimResult<SimulationOutput> {
        Simulator::run(self)
    }

    fn config(&self) -> &NetworkConfig {
        Simulator::config(self)
    }

    fn connections(&self) -> usize {
        self.synapses().len()
    }
}

impl Engine for CompactSimulator {
    fn run(&mut self) -> SimResult<SimulationOutput> {
        CompactSimulator::run(self)
    }

    fn config(&self) -> &NetworkConfig {
        CompactSimulator::config(self)
    }

    fn connections(&self) -> usize {
        CompactSimulator::connections(self).len()
    }
}

/// Full-history engine, wired and initialized from `seed`.
pub fn full_engine(config: NetworkConfig, seed: u64) -> SimResult<Simulator> {
    Simulator::new(config, &mut ChaCha8Rng::seed_from_u64(seed))
}

/// Depth-2 engine; identical output to [`full_engine`] for the same seed.
pub fn compact_engine(config: NetworkConfig, seed: u64) -> SimResult<CompactSimulator> {
    CompactSimulator::new(config, &mut ChaCha8Rng::seed_from_u64(seed))
}
