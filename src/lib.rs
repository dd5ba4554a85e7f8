pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod feedback;
pub mod remote;
pub mod session;

pub use audio::{
    AudioCapture, AudioFrame, CaptureConfig, CpalMicrophone, MicrophoneBackend,
    MicrophoneFactory, RecordingOutcome,
};
pub use config::Config;
pub use error::{CaptureError, CoachError, RemoteError};
pub use remote::{EvaluationClient, HttpEvaluationClient, Transcription};
pub use session::{
    EvaluationRecord, IdentityProvider, InterviewSession, JsonlRecordSink, RecordSink,
    RecordingControl, Role, SentimentLabel, Session, SessionPhase, StaticIdentity,
};
