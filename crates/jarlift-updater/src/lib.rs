mod sequencer;
mod types;

pub use sequencer::UpdateSequencer;
pub use types::{UpdateOutcome, UpdateState, UpdateStatus, UpdateStep};
