//! Speech-to-text: the `TranscriptionBackend` trait and its Whisper
//! implementation.

pub mod backend;
pub mod whisper;
