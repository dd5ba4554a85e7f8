use thiserror::Error;

/// Failure of one of the remote operations (question generation, answer
/// evaluation, improvement, transcription).
///
/// Deliberately a single opaque kind: callers treat transport failures,
/// non-success statuses and malformed payloads identically (report and
/// allow a retry of the same operation).
#[derive(Debug, Clone, Error)]
#[error("remote service failure: {message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors raised while acquiring the microphone.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    DeviceUnavailable,
}

/// The error contract of the interview session.
///
/// Every operation catches at its own boundary: on failure the prior
/// session state is left untouched and exactly one of these is returned.
/// None of them are fatal; the session remains usable afterwards.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("no authenticated user")]
    Unauthenticated,

    #[error("another operation is already in flight")]
    Busy,
}
