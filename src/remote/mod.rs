//! Remote evaluation and transcription client
//!
//! Wraps the five remote operations the session depends on behind one
//! trait with a uniform failure contract:
//! - generate a role-specific question
//! - evaluate a typed answer
//! - evaluate a transcribed answer
//! - improve an answer
//! - transcribe a recorded answer

pub mod client;
pub mod messages;

pub use client::{EvaluationClient, HttpEvaluationClient};
pub use messages::Transcription;
