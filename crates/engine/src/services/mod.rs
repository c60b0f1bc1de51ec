pub mod distributor;
pub mod ledger;
pub mod registry;
pub mod schedule;
pub mod writer;

use std::sync::Arc;

use crate::clock::Clock;
use crate::models::DEFAULT_TOTAL_ROUNDS;
use crate::repository::{MatchStore, ScheduleStore};

pub use ledger::{RecordOutcome, ScoringLedger};
pub use registry::MatchRegistry;
pub use schedule::ScheduleService;
pub use writer::{MatchWriter, RetryPolicy};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub total_rounds: u8,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            retry: RetryPolicy::default(),
        }
    }
}

/// The services wired over one set of stores. Built once at start-up.
pub struct Engine {
    pub registry: MatchRegistry,
    pub ledger: ScoringLedger,
    pub schedules: ScheduleService,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        schedules: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let writer = Arc::new(MatchWriter::new(matches, clock.clone(), config.retry));

        Self {
            registry: MatchRegistry::new(writer.clone(), schedules.clone(), config.total_rounds),
            ledger: ScoringLedger::new(writer),
            schedules: ScheduleService::new(schedules, clock.clone()),
            clock,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
