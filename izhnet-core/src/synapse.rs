//! Per-connection synaptic traces and postsynaptic current accumulation.
//!
//! Each connection carries a trace y that decays by `expire_coeff` per step and
//! jumps by 1.0 on the step after its presynaptic neuron fires. The current a
//! connection delivers is `y * weight`.

use crate::config::alloc_history;
use crate::error::{SimError, SimResult};
use crate::topology::Connection;

/// One trace update: exponential decay plus a unit jump on a presynaptic spike.
#[inline]
pub fn step_trace(prev: f64, expire_coeff: f64, pre_fired: bool) -> f64 {
    let y = prev * expire_coeff;
    if pre_fired {
        y + 1.0
    } else {
        y
    }
}

pub struct SynapseBank {
    conns: Vec<Connection>,
    expire_coeff: f64,
    steps: usize,
    /// Trace history, row-major by time step: `y[t * conns.len() + c]`
    y: Vec<f64>,
}

impl SynapseBank {
    /// All traces start at zero.
    pub fn new(conns: Vec<Connection>, steps: usize, expire_coeff: f64) -> SimResult<Self> {
        let cells = conns
            .len()
            .checked_mul(steps)
            .ok_or(SimError::Capacity { cells: conns.len() as u128 * steps as u128 })?;
        Ok(Self {
            conns,
            expire_coeff,
            steps,
            y: alloc_history(cells)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.conns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.conns
    }

    pub fn expire_coeff(&self) -> f64 {
        self.expire_coeff
    }

    pub fn trace(&self, c: usize, t: usize) -> Option<f64> {
        (c < self.conns.len() && t < self.steps).then(|| self.y[t * self.conns.len() + c])
    }

    /// Computes trace row `t` from row `t - 1` and adds every connection's
    /// contribution into `i_syn[post]`.
    ///
    /// `pre_fired[n]` must reflect V(n, t-1) > vpeak. `i_syn` must already be
    /// zeroed for all neurons; the values written here are consumed by the
    /// population at step `t + 1`.
    pub fn advance(&mut self, t: usize, pre_fired: &[bool], i_syn: &mut [f64]) {
        debug_assert!(t >= 1 && t < self.steps);
        let width = self.conns.len();
        let (past, rest) = self.y.split_at_mut(t * width);
        let prev = &past[(t - 1) * width..];
        let cur = &mut rest[..width];

        for (c, conn) in self.conns.iter().enumerate() {
            let y = step_trace(prev[c], self.expire_coeff, pre_fired[conn.pre as usize]);
            cur[c] = y;
            i_syn[conn.post as usize] += y * conn.weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(pre: u32, post: u32, weight: f64) -> Connection {
        Connection { pre, post, weight }
    }

    #[test]
    fn trace_decays_and_jumps() {
        let k = (-0.125f64).exp();
        assert_eq!(step_trace(0.0, k, false), 0.0);
        assert_eq!(step_trace(0.0, k, true), 1.0);
        assert!((step_trace(1.0, k, false) - k).abs() < 1e-15);
        assert!((step_trace(1.0, k, true) - (k + 1.0)).abs() < 1e-15);
    }

    #[test]
    fn traces_start_at_zero() {
        let bank = SynapseBank::new(vec![conn(0, 1, 60.0), conn(1, 0, -70.0)], 4, 0.9).unwrap();
        assert_eq!(bank.trace(0, 0), Some(0.0));
        assert_eq!(bank.trace(1, 0), Some(0.0));
        assert_eq!(bank.trace(2, 0), None);
    }

    #[test]
    fn unallocatable_history_is_a_capacity_error() {
        let conns = vec![conn(0, 1, 60.0); 1000];
        let res = SynapseBank::new(conns, 1_000_000_000_000, 0.9);
        assert!(matches!(res, Err(SimError::Capacity { .. })));
    }

    #[test]
    fn accumulates_signed_currents_per_postsynaptic_neuron() {
        // two connections into neuron 2, one excitatory, one inhibitory
        let conns = vec![conn(0, 2, 60.0), conn(1, 2, -20.0), conn(0, 1, 50.0)];
        let mut bank = SynapseBank::new(conns, 3, 0.5).unwrap();
        let mut i_syn = vec![0.0; 3];

        bank.advance(1, &[true, true, false], &mut i_syn);
        assert_eq!(i_syn, vec![0.0, 50.0, 40.0]);

        i_syn.fill(0.0);
        bank.advance(2, &[false, false, false], &mut i_syn);
        assert_eq!(bank.trace(0, 2), Some(0.5));
        assert_eq!(i_syn, vec![0.0, 25.0, 20.0]);
    }

    #[test]
    fn self_and_duplicate_connections_both_count() {
        let conns = vec![conn(0, 0, 10.0), conn(0, 0, 10.0)];
        let mut bank = SynapseBank::new(conns, 2, 0.5).unwrap();
        let mut i_syn = vec![0.0];
        bank.advance(1, &[true], &mut i_syn);
        assert_eq!(i_syn, vec![20.0]);
    }

    #[test]
    fn empty_bank_leaves_current_untouched() {
        let mut bank = SynapseBank::new(Vec::new(), 3, 0.5).unwrap();
        let mut i_syn = vec![0.0; 2];
        bank.advance(1, &[true, true], &mut i_syn);
        assert!(bank.is_empty());
        assert_eq!(i_syn, vec![0.0, 0.0]);
    }
}
