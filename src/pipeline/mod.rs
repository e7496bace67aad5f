//! The capture-to-transcript pipeline: shared types, the segment queue,
//! the transcription worker, and the session controller that wires them
//! together across threads.

pub mod queue;
pub mod session;
pub mod types;
pub mod worker;
