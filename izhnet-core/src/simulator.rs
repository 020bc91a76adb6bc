//! Simulator: owns the population and synapse bank and drives the time loop.

use rand::Rng;
use tracing::{info, trace};

use crate::config::NetworkConfig;
use crate::error::{SimError, SimResult};
use crate::log::{SimulationOutput, SpikeLog, TraceLog};
use crate::neuron::NeuronPopulation;
use crate::synapse::SynapseBank;
use crate::topology::{self, Connection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
}

pub struct Simulator {
    config: NetworkConfig,
    population: NeuronPopulation,
    synapses: SynapseBank,
    state: RunState,
}

impl Simulator {
    /// Validates `config`, then draws the wiring followed by the external
    /// currents from `rng`. No randomness is consumed after this returns.
    pub fn new<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> SimResult<Self> {
        config.validate()?;
        config.validate_history()?;
        let conns = topology::generate_for(&config, rng)?;
        let population = NeuronPopulation::initialize_for(&config, rng)?;
        Self::from_parts(config, conns, population)
    }

    /// Assembles a simulator from explicit wiring and an initialized population.
    pub fn from_parts(
        config: NetworkConfig,
        conns: Vec<Connection>,
        population: NeuronPopulation,
    ) -> SimResult<Self> {
        config.validate()?;
        config.validate_history()?;
        let n = config.num_neurons();
        if population.len() != n {
            return Err(SimError::InvalidConfiguration(format!(
                "population has {} neurons, config expects {}",
                population.len(),
                n
            )));
        }
        if population.steps() != config.steps {
            return Err(SimError::InvalidConfiguration(format!(
                "population sized for {} steps, config expects {}",
                population.steps(),
                config.steps
            )));
        }
        for c in &conns {
            let bad = (c.pre as usize).max(c.post as usize);
            if bad >= n {
                return Err(SimError::InvalidIndex { index: bad, len: n });
            }
        }
        let synapses = SynapseBank::new(conns, config.steps, config.expire_coeff())?;
        Ok(Self {
            config,
            population,
            synapses,
            state: RunState::NotStarted,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn population(&self) -> &NeuronPopulation {
        &self.population
    }

    pub fn synapses(&self) -> &SynapseBank {
        &self.synapses
    }

    pub fn potential(&self, n: usize, t: usize) -> Option<f64> {
        self.population.potential(n, t)
    }

    pub fn recovery(&self, n: usize, t: usize) -> Option<f64> {
        self.population.recovery(n, t)
    }

    pub fn trace(&self, c: usize, t: usize) -> Option<f64> {
        self.synapses.trace(c, t)
    }

    /// I_syn(n) as left by the last step (what step `steps` would consume).
    pub fn synaptic_current(&self, n: usize) -> Option<f64> {
        self.population.synaptic_current(n)
    }

    /// Integrates t = 1 .. steps-1. Per step the population advances on the
    /// previous step's I_syn, then the synapse bank rebuilds I_syn from the
    /// previous step's spikes for use at t + 1.
    ///
    /// The trace stream is computed afterwards from the complete V history,
    /// one sample per t in [0, steps).
    pub fn run(&mut self) -> SimResult<SimulationOutput> {
        if self.state != RunState::NotStarted {
            return Err(SimError::AlreadyRun);
        }
        let h = self.config.h;
        let steps = self.config.steps;
        let mut trace_log = TraceLog::with_capacity(steps)?;
        self.state = RunState::Running;
        info!(
            neurons = self.population.len(),
            connections = self.synapses.len(),
            steps,
            h,
            "starting simulation"
        );

        let mut spikes = SpikeLog::new();
        for t in 1..steps {
            let fired = self.population.advance(t, h, &mut spikes);
            let (pre_fired, i_syn) = self.population.synaptic_io();
            self.synapses.advance(t, pre_fired, i_syn);
            trace!(t, fired, "step");
        }

        for t in 0..steps {
            if let Some(row) = self.population.potentials_at(t) {
                trace_log.push_mean(t as f64 * h, row);
            }
        }

        self.state = RunState::Finished;
        info!(spikes = spikes.len(), "simulation finished");
        Ok(SimulationOutput { spikes, trace: trace_log })
    }
}
