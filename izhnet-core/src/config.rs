//! Network and neuron parameters.
//!
//! Everything the engine needs is carried by [`NetworkConfig`]; nothing is
//! compiled in. `Default` reproduces the reference network: 100 excitatory and
//! 25 inhibitory neurons, 10% connection probability, 1 s at h = 0.5 ms.

use crate::error::{SimError, SimResult};

/// Izhikevich neuron constants (capacitance-scaled form).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IzhikevichParams {
    /// Time scale of the recovery variable
    pub a: f64,
    /// Sensitivity of recovery to sub-threshold potential
    pub b: f64,
    /// Reset potential after a spike
    pub c: f64,
    /// Recovery jump after a spike
    pub d: f64,
    pub k: f64,
    /// Resting potential
    pub vr: f64,
    /// Instantaneous threshold potential
    pub vt: f64,
    /// Spike cutoff; a potential above this is reset on the next step
    pub vpeak: f64,
    pub v0: f64,
    pub u0: f64,
    /// Membrane capacitance, pF
    pub cm: f64,
}

impl Default for IzhikevichParams {
    fn default() -> Self {
        Self {
            a: 0.02,
            b: 0.5,
            c: -40.0,
            d: 100.0,
            k: 0.5,
            vr: -60.0,
            vt: -45.0,
            vpeak: 35.0,
            v0: -60.0,
            u0: 0.0,
            cm: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Integration step, ms
    pub h: f64,
    /// Number of discrete time points (Tsim); t runs over [0, steps)
    pub steps: usize,
    pub excitatory: usize,
    pub inhibitory: usize,
    pub connection_count: usize,
    /// Weight magnitude bounds, pA
    pub min_weight: f64,
    pub max_weight: f64,
    /// Postsynaptic current decay time constant, ms
    pub psc_decay_time: f64,
    /// External drive is drawn from [0, max_external_current), pA
    pub max_external_current: f64,
    pub neuron: IzhikevichParams,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let cfg = Self {
            h: 0.5,
            steps: 2000,
            excitatory: 100,
            inhibitory: 25,
            connection_count: 0,
            min_weight: 50.0,
            max_weight: 100.0,
            psc_decay_time: 4.0,
            max_external_current: 40.0,
            neuron: IzhikevichParams::default(),
        };
        cfg.with_connection_probability(0.1)
    }
}

impl NetworkConfig {
    #[inline]
    pub fn num_neurons(&self) -> usize {
        self.excitatory.saturating_add(self.inhibitory)
    }

    /// Simulated time span in ms (steps * h).
    pub fn duration(&self) -> f64 {
        self.steps as f64 * self.h
    }

    /// Per-step multiplicative decay of a synaptic trace.
    pub fn expire_coeff(&self) -> f64 {
        (-self.h / self.psc_decay_time).exp()
    }

    /// Sets `connection_count` to floor(N^2 * p).
    pub fn with_connection_probability(mut self, p: f64) -> Self {
        let n = self.num_neurons() as f64;
        self.connection_count = (n * n * p).max(0.0) as usize;
        self
    }

    /// Rejects parameter combinations the integrator cannot be sized or run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.excitatory.checked_add(self.inhibitory).is_none() {
            return Err(invalid("excitatory + inhibitory overflows usize"));
        }
        if self.steps == 0 {
            return Err(invalid("steps must be positive"));
        }
        if !self.h.is_finite() || self.h <= 0.0 {
            return Err(invalid("integration step h must be positive and finite"));
        }
        if self.num_neurons() == 0 {
            return Err(invalid("population must contain at least one neuron"));
        }
        if !self.psc_decay_time.is_finite() || self.psc_decay_time <= 0.0 {
            return Err(invalid("psc_decay_time must be positive and finite"));
        }
        if !self.min_weight.is_finite() || !self.max_weight.is_finite() {
            return Err(invalid("weight bounds must be finite"));
        }
        if self.min_weight < 0.0 || self.min_weight > self.max_weight {
            return Err(invalid("weight bounds must satisfy 0 <= min_weight <= max_weight"));
        }
        if !self.max_external_current.is_finite() || self.max_external_current < 0.0 {
            return Err(invalid("max_external_current must be non-negative and finite"));
        }
        if self.neuron.cm == 0.0 {
            return Err(invalid("membrane capacitance cm must be non-zero"));
        }
        Ok(())
    }

    /// Checks that full per-step history of V, U and every trace is addressable.
    pub fn validate_history(&self) -> SimResult<()> {
        let steps = self.steps as u128;
        let cells = (self.num_neurons() as u128 * 2 + self.connection_count as u128) * steps;
        let limit = isize::MAX as u128 / core::mem::size_of::<f64>() as u128;
        if cells > limit {
            return Err(SimError::Capacity { cells });
        }
        Ok(())
    }
}

/// Zero-filled history buffer of `cells` values, or `Capacity` if the
/// allocator refuses it.
pub(crate) fn alloc_history(cells: usize) -> SimResult<Vec<f64>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(cells).map_err(|_| SimError::Capacity { cells: cells as u128 })?;
    buf.resize(cells, 0.0);
    Ok(buf)
}

fn invalid(msg: &str) -> SimError {
    SimError::InvalidConfiguration(msg.to_string())
}
