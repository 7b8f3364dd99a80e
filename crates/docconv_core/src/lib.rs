//! Conversion core: pure job lifecycle state machine.
mod effect;
mod msg;
mod state;
mod update;

pub use effect::{Effect, Outcome};
pub use msg::Msg;
pub use state::{ConversionState, JobState, Phase, PollPolicy};
pub use update::update;
