use parking_lot::Mutex;
use tracing::error;

use crate::exec::AggregateExecutionError;
use crate::model::ResultGroup;

/// Outcome of a dispatched query, stored between completion and resumption.
pub enum Outcome {
    Result(ResultGroup),
    Error(AggregateExecutionError),
}

enum Slot {
    Empty,
    Ready(Outcome),
    Taken,
}

/// Single-write, single-read cell bridging the two request phases.
pub struct OutcomeCell(Mutex<Slot>);

impl OutcomeCell {
    pub fn new() -> Self {
        Self(Mutex::new(Slot::Empty))
    }

    /// Stores the outcome. A second write is a controller bug; the first
    /// value is kept and the duplicate dropped.
    pub fn set(&self, outcome: Outcome) {
        let mut slot = self.0.lock();
        match &*slot {
            Slot::Empty => *slot = Slot::Ready(outcome),
            _ => {
                error!(
                    target: "tsgate::dispatch",
                    "pending outcome written twice; keeping the first value"
                );
            }
        }
    }

    /// Takes the stored outcome. `None` when nothing was stored or it was
    /// already read.
    pub fn take(&self) -> Option<Outcome> {
        let mut slot = self.0.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(outcome) => Some(outcome),
            Slot::Empty => {
                *slot = Slot::Empty;
                None
            }
            Slot::Taken => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(&*self.0.lock(), Slot::Ready(_))
    }
}

impl Default for OutcomeCell {
    fn default() -> Self {
        Self::new()
    }
}
