//! The todobot agent loop.
//!
//! Each user line runs an inner **think → act → observe** cycle:
//!
//! 1. **Send** the whole conversation to the provider
//! 2. **Parse** the reply as a single JSON envelope
//! 3. **If action**: run the tool, append the observation, go to step 1
//! 4. **If output**: hand the answer back to the session
//!
//! Every failure ends the current turn only; the session keeps reading
//! lines. Model calls per line are bounded by `max_steps`.

pub mod loop_runner;
pub mod prompt;
pub mod session;

pub use loop_runner::{AgentLoop, TurnOutcome};
pub use prompt::system_prompt;
pub use session::Session;
