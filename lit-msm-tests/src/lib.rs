//! Integration and property tests for lit-msm
//!
//! Everything here needs `std` and heavier dependencies that must stay out
//! of the core `no_std` build.

#![cfg(test)]

pub mod integration;

/// Common test utilities and fixtures
pub mod common {
    use std::collections::HashMap;

    use lit_msm_core::test_utils::fixture::TestMachine;
    use lit_msm_core::StateMachine;

    /// Setup tracing for tests
    pub fn setup_tracing() {
        use tracing_subscriber::{EnvFilter, fmt};

        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Entry and exit counts per state name, accumulated across steps.
    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    pub struct ActionTally {
        pub entries: HashMap<&'static str, i64>,
        pub exits: HashMap<&'static str, i64>,
    }

    impl ActionTally {
        /// Fold the machine's action log into the tally and clear it.
        pub fn absorb(&mut self, m: &mut TestMachine) {
            for &what in m.log() {
                if let Some(state) = what.strip_suffix("-entry") {
                    *self.entries.entry(state).or_default() += 1;
                } else if let Some(state) = what.strip_suffix("-exit") {
                    *self.exits.entry(state).or_default() += 1;
                }
            }
            m.clear_log();
        }

        pub fn balance(&self, state: &str) -> i64 {
            self.entries.get(state).copied().unwrap_or(0) - self.exits.get(state).copied().unwrap_or(0)
        }
    }

    /// Initialized fixture machine with its init actions already tallied.
    pub fn started() -> (TestMachine, ActionTally) {
        let mut m = TestMachine::new();
        m.init();
        let mut tally = ActionTally::default();
        tally.absorb(&mut m);
        (m, tally)
    }
}
