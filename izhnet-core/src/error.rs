use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid index: {index} (len {len})")]
    InvalidIndex { index: usize, len: usize },
    /// History or output buffers could not be addressed or allocated.
    #[error("capacity exceeded: {cells} history cells requested")]
    Capacity { cells: u128 },
    #[error("simulation already run")]
    AlreadyRun,
}

pub type SimResult<T, E = SimError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            format!("{}", SimError::InvalidConfiguration("steps must be positive".into())),
            "invalid configuration: steps must be positive"
        );
        assert_eq!(
            format!("{}", SimError::InvalidIndex { index: 7, len: 3 }),
            "invalid index: 7 (len 3)"
        );
        assert_eq!(
            format!("{}", SimError::Capacity { cells: 10 }),
            "capacity exceeded: 10 history cells requested"
        );
        assert_eq!(format!("{}", SimError::AlreadyRun), "simulation already run");
    }

    #[test]
    fn boxed_errors_downcast_back_to_sim_error() {
        use crate::{NetworkConfig, Simulator};
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        fn run(cfg: NetworkConfig) -> Result<usize, Box<dyn std::error::Error>> {
            let mut sim = Simulator::new(cfg, &mut ChaCha8Rng::seed_from_u64(0))?;
            Ok(sim.run()?.spikes.len())
        }

        let err = run(NetworkConfig { h: 0.0, ..NetworkConfig::default() }).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::InvalidConfiguration(_))
        ));
        let err = run(NetworkConfig { steps: usize::MAX, ..NetworkConfig::default() }).unwrap_err();
        assert!(matches!(err.downcast_ref::<SimError>(), Some(SimError::Capacity { .. })));
        assert!(run(NetworkConfig { steps: 3, ..NetworkConfig::default() }).is_ok());
    }
}
