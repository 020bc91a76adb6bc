//! Izhikevich population with forward-Euler integration and full V/U history.

use rand::Rng;
use tracing::debug;

use crate::config::{alloc_history, IzhikevichParams, NetworkConfig};
use crate::error::{SimError, SimResult};
use crate::log::{SpikeEvent, SpikeLog};

/// Advances one neuron by one step. Returns `(v, u, fired)`.
///
/// `fired` is decided on the incoming potential `v`, not on the Euler result.
/// On fire the state is overridden with `(c, u + d)`, where `u` is the
/// pre-step recovery value. This deviates from the canonical Izhikevich reset
/// (which jumps from the advanced recovery) and is kept on purpose.
#[inline]
pub fn integrate(
    p: &IzhikevichParams,
    h: f64,
    v: f64,
    u: f64,
    i_ext: f64,
    i_syn: f64,
) -> (f64, f64, bool) {
    if v > p.vpeak {
        return (p.c, u + p.d, true);
    }
    let dv = (p.k * (v - p.vr) * (v - p.vt) - u + i_ext + i_syn) / p.cm;
    let du = p.a * (p.b * (v - p.vr) - u);
    (v + h * dv, u + h * du, false)
}

/// One draw per neuron, in index order, each in `[0, max_external_current)`.
pub fn draw_external_currents<R: Rng + ?Sized>(
    num_neurons: usize,
    max_external_current: f64,
    rng: &mut R,
) -> Vec<f64> {
    (0..num_neurons)
        .map(|_| max_external_current * rng.gen::<f64>())
        .collect()
}

pub struct NeuronPopulation {
    params: IzhikevichParams,
    len: usize,
    steps: usize,
    /// V history, row-major by time step: `v[t * len + n]`
    v: Vec<f64>,
    u: Vec<f64>,
    i_ext: Vec<f64>,
    /// Synaptic current to be consumed by the next `advance`
    i_syn: Vec<f64>,
    /// Whether each neuron fired on the most recent `advance`
    fired: Vec<bool>,
}

impl NeuronPopulation {
    /// Sets V(0) = v0 and U(0) = u0 for every neuron and draws one external
    /// current per neuron, in index order, from `[0, max_external_current)`.
    pub fn initialize<R: Rng + ?Sized>(
        num_neurons: usize,
        steps: usize,
        params: IzhikevichParams,
        max_external_current: f64,
        rng: &mut R,
    ) -> SimResult<Self> {
        if steps == 0 {
            return Err(SimError::InvalidConfiguration("steps must be positive".to_string()));
        }
        let cells = num_neurons
            .checked_mul(steps)
            .ok_or(SimError::Capacity { cells: num_neurons as u128 * steps as u128 })?;

        let mut v = alloc_history(cells)?;
        let mut u = alloc_history(cells)?;
        v[..num_neurons].fill(params.v0);
        u[..num_neurons].fill(params.u0);

        let i_ext = draw_external_currents(num_neurons, max_external_current, rng);

        debug!(num_neurons, steps, max_external_current, "initialized population");
        Ok(Self {
            params,
            len: num_neurons,
            steps,
            v,
            u,
            i_ext,
            i_syn: vec![0.0; num_neurons],
            fired: vec![false; num_neurons],
        })
    }

    pub fn initialize_for<R: Rng + ?Sized>(cfg: &NetworkConfig, rng: &mut R) -> SimResult<Self> {
        Self::initialize(cfg.num_neurons(), cfg.steps, cfg.neuron, cfg.max_external_current, rng)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn params(&self) -> &IzhikevichParams {
        &self.params
    }

    fn check(&self, n: usize) -> SimResult<()> {
        if n >= self.len {
            return Err(SimError::InvalidIndex { index: n, len: self.len });
        }
        Ok(())
    }

    /// Overrides V(n, 0) and U(n, 0).
    pub fn set_initial_state(&mut self, n: usize, v: f64, u: f64) -> SimResult<()> {
        self.check(n)?;
        self.v[n] = v;
        self.u[n] = u;
        Ok(())
    }

    pub fn set_external_current(&mut self, n: usize, i_ext: f64) -> SimResult<()> {
        self.check(n)?;
        self.i_ext[n] = i_ext;
        Ok(())
    }

    pub fn external_current(&self, n: usize) -> Option<f64> {
        self.i_ext.get(n).copied()
    }

    pub fn external_currents(&self) -> &[f64] {
        &self.i_ext
    }

    pub fn potential(&self, n: usize, t: usize) -> Option<f64> {
        (n < self.len && t < self.steps).then(|| self.v[t * self.len + n])
    }

    pub fn recovery(&self, n: usize, t: usize) -> Option<f64> {
        (n < self.len && t < self.steps).then(|| self.u[t * self.len + n])
    }

    /// V(., t) for all neurons, `None` past the last step.
    pub fn potentials_at(&self, t: usize) -> Option<&[f64]> {
        if t >= self.steps {
            return None;
        }
        Some(&self.v[t * self.len..(t + 1) * self.len])
    }

    pub fn synaptic_current(&self, n: usize) -> Option<f64> {
        self.i_syn.get(n).copied()
    }

    pub fn fired(&self) -> &[bool] {
        &self.fired
    }

    /// Fire flags from the last step alongside the (zeroed) synaptic current
    /// buffer the synapse bank fills for the next step.
    pub fn synaptic_io(&mut self) -> (&[bool], &mut [f64]) {
        (&self.fired, &mut self.i_syn)
    }

    /// Computes row `t` from row `t - 1`, consuming the accumulated I_syn.
    /// Spikes are appended to `spikes` in neuron-index order, stamped `t * h`.
    /// Returns the number of neurons that fired.
    pub fn advance(&mut self, t: usize, h: f64, spikes: &mut SpikeLog) -> usize {
        debug_assert!(t >= 1 && t < self.steps);
        let prev = (t - 1) * self.len;
        let cur = t * self.len;
        let mut count = 0;

        for n in 0..self.len {
            let i_syn = core::mem::take(&mut self.i_syn[n]);
            let (v, u, fired) = integrate(
                &self.params,
                h,
                self.v[prev + n],
                self.u[prev + n],
                self.i_ext[n],
                i_syn,
            );
            self.v[cur + n] = v;
            self.u[cur + n] = u;
            self.fired[n] = fired;
            if fired {
                spikes.push(SpikeEvent { neuron_id: n as u32, time: t as f64 * h });
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet(n: usize, steps: usize) -> NeuronPopulation {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        NeuronPopulation::initialize(n, steps, IzhikevichParams::default(), 0.0, &mut rng).unwrap()
    }

    #[test]
    fn euler_step_matches_hand_computation() {
        let p = IzhikevichParams::default();
        let (v, u, fired) = integrate(&p, 0.5, -60.0, 0.0, 40.0, 0.0);
        assert!(!fired);
        assert!((v - (-59.6)).abs() < 1e-12);
        assert_eq!(u, 0.0);

        let (v, u, _) = integrate(&p, 0.5, v, u, 40.0, 0.0);
        assert!((v - (-59.2292)).abs() < 1e-12);
        assert!((u - 0.002).abs() < 1e-12);
    }

    #[test]
    fn reset_uses_pre_step_recovery() {
        let p = IzhikevichParams::default();
        let (v, u, fired) = integrate(&p, 0.5, p.vpeak + 1.0, 7.0, 40.0, 1000.0);
        assert!(fired);
        assert_eq!(v, p.c);
        assert_eq!(u, 7.0 + p.d);
    }

    #[test]
    fn potential_at_peak_does_not_fire() {
        let p = IzhikevichParams::default();
        let (_, _, fired) = integrate(&p, 0.5, p.vpeak, 0.0, 0.0, 0.0);
        assert!(!fired);
    }

    #[test]
    fn initial_rows_hold_v0_u0() {
        let pop = quiet(3, 5);
        for n in 0..3 {
            assert_eq!(pop.potential(n, 0), Some(-60.0));
            assert_eq!(pop.recovery(n, 0), Some(0.0));
        }
        assert_eq!(pop.potential(3, 0), None);
        assert_eq!(pop.potential(0, 5), None);
    }

    #[test]
    fn potential_rows_stop_at_last_step() {
        let pop = quiet(3, 5);
        assert_eq!(pop.potentials_at(0), Some(&[-60.0; 3][..]));
        assert_eq!(pop.potentials_at(4).map(<[f64]>::len), Some(3));
        assert_eq!(pop.potentials_at(5), None);
        assert_eq!(pop.potentials_at(usize::MAX), None);
    }

    #[test]
    fn unallocatable_history_is_reported_not_aborted() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let params = IzhikevichParams::default();
        let res = NeuronPopulation::initialize(125, 1_000_000_000_000, params, 40.0, &mut rng);
        assert!(matches!(res, Err(SimError::Capacity { .. })));
    }

    #[test]
    fn overrides_reject_out_of_range_neuron() {
        let mut pop = quiet(2, 3);
        assert_eq!(
            pop.set_initial_state(2, 0.0, 0.0),
            Err(SimError::InvalidIndex { index: 2, len: 2 })
        );
        assert!(pop.set_external_current(5, 1.0).is_err());
        assert!(pop.set_external_current(1, 1.0).is_ok());
        assert_eq!(pop.external_current(1), Some(1.0));
    }

    #[test]
    fn advance_records_spike_and_consumes_synaptic_current() {
        let mut pop = quiet(3, 3);
        pop.set_initial_state(1, 36.0, 0.0).unwrap();
        pop.i_syn[2] = 25.0;

        let mut spikes = SpikeLog::new();
        let fired = pop.advance(1, 0.5, &mut spikes);

        assert_eq!(fired, 1);
        assert_eq!(spikes.as_slice(), &[SpikeEvent { neuron_id: 1, time: 0.5 }]);
        assert_eq!(pop.fired(), &[false, true, false]);
        assert_eq!(pop.potential(1, 1), Some(-40.0));
        assert_eq!(pop.recovery(1, 1), Some(100.0));
        // 25 pA over 50 pF for half a step
        assert!((pop.potential(2, 1).unwrap() - (-60.0 + 0.25)).abs() < 1e-12);
        assert!(pop.i_syn.iter().all(|&i| i == 0.0));
    }

    #[test]
    fn resting_neuron_without_drive_stays_at_rest() {
        let mut pop = quiet(1, 4);
        let mut spikes = SpikeLog::new();
        for t in 1..4 {
            pop.advance(t, 0.5, &mut spikes);
        }
        assert!(spikes.is_empty());
        assert_eq!(pop.potential(0, 3), Some(-60.0));
    }

    proptest! {
        #[test]
        fn external_currents_lie_in_half_open_range(
            seed in any::<u64>(),
            n in 1usize..200,
            max in 0.0f64..100.0,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let params = IzhikevichParams::default();
            let pop = NeuronPopulation::initialize(n, 1, params, max, &mut rng).unwrap();
            for &i in pop.external_currents() {
                prop_assert!(i >= 0.0);
                prop_assert!(i < max || (max == 0.0 && i == 0.0));
            }
        }
    }
}
