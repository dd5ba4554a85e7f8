//! Microphone capture
//!
//! Owns the microphone lifecycle: device acquisition, frame buffering, the
//! hard recording deadline, WAV finalization, and the handoff of the
//! finished blob to the transcription operation.

pub mod backend;
pub mod capture;
pub mod cpal_backend;

pub use backend::{AudioFrame, CaptureConfig, MicrophoneBackend, MicrophoneFactory};
pub use capture::{AudioCapture, RecordingOutcome};
pub use cpal_backend::CpalMicrophone;
