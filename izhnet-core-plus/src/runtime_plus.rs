//! Compact runtime that composes izhnet-core and adds:
//! - a depth-2 ring of neuron state instead of full V/U history
//! - in-place synaptic traces (only y(t-1) is ever read)
//! - a source -> connections index so spike bumps skip silent neurons
//!
//! Semantics match `izhnet_core::Simulator` exactly: same draw order, same
//! per-step ordering, same summation order, so both produce identical streams.

use rand::Rng;
use tracing::{info, trace};

use izhnet_core::{
    draw_external_currents, integrate, step_trace, topology, Connection, NetworkConfig, RunState,
    SimError, SimResult, SimulationOutput, SpikeEvent, SpikeLog, TraceLog,
};

pub struct CompactSimulator {
    config: NetworkConfig,
    conns: Vec<Connection>,
    // Adjacency: for each presynaptic neuron -> connection indices leaving it
    source_to_conns: Vec<Vec<u32>>,
    i_ext: Vec<f64>,
    /// V and U for steps t-1 and t, slot = t % 2
    v: [Vec<f64>; 2],
    u: [Vec<f64>; 2],
    y: Vec<f64>,
    i_syn: Vec<f64>,
    fired: Vec<bool>,
    state: RunState,
}

impl CompactSimulator {
    /// Draws wiring then external currents, in the same order as the core.
    pub fn new<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> SimResult<Self> {
        config.validate()?;
        let conns = topology::generate_for(&config, rng)?;
        let i_ext = draw_external_currents(config.num_neurons(), config.max_external_current, rng);
        Self::from_parts(config, conns, i_ext)
    }

    pub fn from_parts(
        config: NetworkConfig,
        conns: Vec<Connection>,
        i_ext: Vec<f64>,
    ) -> SimResult<Self> {
        config.validate()?;
        let n = config.num_neurons();
        if i_ext.len() != n {
            return Err(SimError::InvalidConfiguration(format!(
                "{} external currents for {} neurons",
                i_ext.len(),
                n
            )));
        }
        for c in &conns {
            let bad = (c.pre as usize).max(c.post as usize);
            if bad >= n {
                return Err(SimError::InvalidIndex { index: bad, len: n });
            }
        }

        let mut me = Self {
            config,
            y: vec![0.0; conns.len()],
            conns,
            source_to_conns: Vec::new(),
            i_ext,
            v: [vec![config.neuron.v0; n], vec![0.0; n]],
            u: [vec![config.neuron.u0; n], vec![0.0; n]],
            i_syn: vec![0.0; n],
            fired: vec![false; n],
            state: RunState::NotStarted,
        };
        me.rebuild_adjacency();
        Ok(me)
    }

    fn rebuild_adjacency(&mut self) {
        let mut adj: Vec<Vec<u32>> = vec![Vec::new(); self.config.num_neurons()];
        for (idx, c) in self.conns.iter().enumerate() {
            adj[c.pre as usize].push(idx as u32);
        }
        self.source_to_conns = adj;
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn connections(&self) -> &[Connection] {
        &self.conns
    }

    /// Connection indices whose presynaptic neuron is `n`.
    pub fn outgoing(&self, n: usize) -> &[u32] {
        self.source_to_conns.get(n).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn external_currents(&self) -> &[f64] {
        &self.i_ext
    }

    /// Overrides V(n, 0) and U(n, 0). Only valid before `run`.
    pub fn set_initial_state(&mut self, n: usize, v: f64, u: f64) -> SimResult<()> {
        if self.state != RunState::NotStarted {
            return Err(SimError::AlreadyRun);
        }
        let len = self.i_ext.len();
        if n >= len {
            return Err(SimError::InvalidIndex { index: n, len });
        }
        self.v[0][n] = v;
        self.u[0][n] = u;
        Ok(())
    }

    /// V(., t) for the last computed step.
    pub fn potentials(&self) -> &[f64] {
        &self.v[self.last_slot()]
    }

    pub fn recoveries(&self) -> &[f64] {
        &self.u[self.last_slot()]
    }

    pub fn traces(&self) -> &[f64] {
        &self.y
    }

    pub fn synaptic_currents(&self) -> &[f64] {
        &self.i_syn
    }

    fn last_slot(&self) -> usize {
        match self.state {
            RunState::Finished => (self.config.steps - 1) % 2,
            _ => 0,
        }
    }

    /// Runs t = 1 .. steps-1, streaming the mean potential as each row completes.
    pub fn run(&mut self) -> SimResult<SimulationOutput> {
        if self.state != RunState::NotStarted {
            return Err(SimError::AlreadyRun);
        }
        let h = self.config.h;
        let steps = self.config.steps;
        let params = self.config.neuron;
        let expire = self.config.expire_coeff();
        let mut trace_log = TraceLog::with_capacity(steps)?;
        self.state = RunState::Running;
        info!(
            neurons = self.i_ext.len(),
            connections = self.conns.len(),
            steps,
            h,
            "starting compact simulation"
        );

        let mut spikes = SpikeLog::new();
        trace_log.push_mean(0.0, &self.v[0]);

        for t in 1..steps {
            let odd = t % 2 == 1;
            let [v0, v1] = &mut self.v;
            let (v_prev, v_cur) = if odd { (&*v0, v1) } else { (&*v1, v0) };
            let [u0, u1] = &mut self.u;
            let (u_prev, u_cur) = if odd { (&*u0, u1) } else { (&*u1, u0) };

            let mut fired_count = 0;
            for n in 0..self.i_ext.len() {
                let i_syn = core::mem::take(&mut self.i_syn[n]);
                let (v, u, fired) =
                    integrate(&params, h, v_prev[n], u_prev[n], self.i_ext[n], i_syn);
                v_cur[n] = v;
                u_cur[n] = u;
                self.fired[n] = fired;
                if fired {
                    spikes.push(SpikeEvent { neuron_id: n as u32, time: t as f64 * h });
                    fired_count += 1;
                }
            }
            trace_log.push_mean(t as f64 * h, v_cur);

            for y in self.y.iter_mut() {
                *y = step_trace(*y, expire, false);
            }
            for n in 0..self.fired.len() {
                if !self.fired[n] {
                    continue;
                }
                for &c in &self.source_to_conns[n] {
                    self.y[c as usize] += 1.0;
                }
            }
            for (c, conn) in self.conns.iter().enumerate() {
                self.i_syn[conn.post as usize] += self.y[c] * conn.weight;
            }
            trace!(t, fired = fired_count, "step");
        }

        self.state = RunState::Finished;
        info!(spikes = spikes.len(), "compact simulation finished");
        Ok(SimulationOutput { spikes, trace: trace_log })
    }
}
