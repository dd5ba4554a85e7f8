//! Interview session management
//!
//! This module provides the `InterviewSession` coordinator that manages:
//! - The session state machine (question → answer → feedback → improve)
//! - The recording/transcription pipeline for spoken answers
//! - Serialization of operations behind a single busy gate
//! - Persistence of completed text evaluations

mod model;
mod record;
mod session;

pub use model::{Role, SentimentLabel, Session, SessionPhase};
pub use record::{
    EvaluationRecord, IdentityProvider, JsonlRecordSink, RecordSink, StaticIdentity,
};
pub use session::{InterviewSession, RecordingControl};
