//! Random directed wiring between excitatory and inhibitory neurons.

use rand::Rng;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::error::{SimError, SimResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeuronRole {
    Excitatory,
    Inhibitory,
}

impl NeuronRole {
    /// Indices below `num_excitatory` are excitatory, the rest inhibitory.
    #[inline]
    pub fn of(index: usize, num_excitatory: usize) -> Self {
        if index < num_excitatory {
            NeuronRole::Excitatory
        } else {
            NeuronRole::Inhibitory
        }
    }
}

/// Directed synapse. The evolving trace y(t) lives in [`crate::SynapseBank`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub pre: u32,
    pub post: u32,
    /// Signed: negative iff `pre` is inhibitory.
    pub weight: f64,
}

/// Draws `connection_count` connections independently and with replacement.
///
/// Per connection the draws are: presynaptic index, postsynaptic index, weight
/// magnitude in `[min_weight, max_weight]`. Self-connections and duplicate
/// pairs are kept.
pub fn generate<R: Rng + ?Sized>(
    num_neurons: usize,
    num_excitatory: usize,
    connection_count: usize,
    min_weight: f64,
    max_weight: f64,
    rng: &mut R,
) -> SimResult<Vec<Connection>> {
    if num_excitatory > num_neurons {
        return Err(SimError::InvalidConfiguration(format!(
            "excitatory count {} exceeds population {}",
            num_excitatory, num_neurons
        )));
    }
    if num_neurons > u32::MAX as usize {
        return Err(SimError::InvalidConfiguration(format!(
            "population {} exceeds u32 neuron ids",
            num_neurons
        )));
    }
    if connection_count > 0 && num_neurons == 0 {
        return Err(SimError::InvalidConfiguration(
            "cannot wire connections in an empty population".to_string(),
        ));
    }
    if !(min_weight.is_finite() && max_weight.is_finite())
        || min_weight < 0.0
        || min_weight > max_weight
    {
        return Err(SimError::InvalidConfiguration(format!(
            "weight bounds [{}, {}] are not a non-negative interval",
            min_weight, max_weight
        )));
    }

    let mut conns = Vec::new();
    conns
        .try_reserve_exact(connection_count)
        .map_err(|_| SimError::Capacity { cells: connection_count as u128 })?;
    let mut inhibitory = 0usize;
    for _ in 0..connection_count {
        let pre = rng.gen_range(0..num_neurons);
        let post = rng.gen_range(0..num_neurons);
        let magnitude = rng.gen_range(min_weight..=max_weight);
        let weight = match NeuronRole::of(pre, num_excitatory) {
            NeuronRole::Excitatory => magnitude,
            NeuronRole::Inhibitory => {
                inhibitory += 1;
                -magnitude
            }
        };
        conns.push(Connection { pre: pre as u32, post: post as u32, weight });
    }

    debug!(
        connections = conns.len(),
        inhibitory,
        num_neurons,
        "generated random topology"
    );
    Ok(conns)
}

/// [`generate`] with the sizes and bounds taken from `cfg`.
pub fn generate_for<R: Rng + ?Sized>(
    cfg: &NetworkConfig,
    rng: &mut R,
) -> SimResult<Vec<Connection>> {
    generate(
        cfg.num_neurons(),
        cfg.excitatory,
        cfg.connection_count,
        cfg.min_weight,
        cfg.max_weight,
        rng,
    )
}
