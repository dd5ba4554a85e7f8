use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::messages::{
    AnswerRequest, FeedbackResponse, ImproveResponse, QuestionRequest, QuestionResponse,
    Transcription, TranscriptionResponse,
};
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::session::Role;

/// The remote operations the session depends on.
///
/// Each call is a single attempt with no retry; the caller decides whether
/// to retry. All five surface exactly one error kind.
#[async_trait::async_trait]
pub trait EvaluationClient: Send + Sync {
    /// Generate a role-specific interview question.
    async fn generate_question(&self, role: Role) -> Result<String, RemoteError>;

    /// Evaluate a typed answer; returns raw feedback text.
    async fn evaluate_answer(&self, answer: &str) -> Result<String, RemoteError>;

    /// Evaluate a transcribed (spoken) answer; returns raw feedback text.
    async fn evaluate_audio_answer(&self, answer: &str) -> Result<String, RemoteError>;

    /// Rewrite an answer into an improved version.
    async fn improve_answer(&self, answer: &str) -> Result<String, RemoteError>;

    /// Transcribe a WAV-encoded recording.
    async fn transcribe(&self, wav: Vec<u8>) -> Result<Transcription, RemoteError>;
}

/// HTTP implementation of [`EvaluationClient`].
///
/// The four text operations POST JSON against the evaluation service; the
/// transcription operation POSTs the audio blob as a multipart form with a
/// `file` field named `audio.wav`.
pub struct HttpEvaluationClient {
    http: reqwest::Client,
    evaluation_url: String,
    transcription_url: String,
}

impl HttpEvaluationClient {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            evaluation_url: config.evaluation_url.trim_end_matches('/').to_string(),
            transcription_url: config.transcription_url.clone(),
        }
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        let url = format!("{}/{}", self.evaluation_url, path);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<R>().await?)
    }
}

#[async_trait::async_trait]
impl EvaluationClient for HttpEvaluationClient {
    async fn generate_question(&self, role: Role) -> Result<String, RemoteError> {
        info!("Requesting question for role: {}", role);

        let response: QuestionResponse = self
            .post_json("question", &QuestionRequest { role: role.as_str() })
            .await?;

        Ok(response.question)
    }

    async fn evaluate_answer(&self, answer: &str) -> Result<String, RemoteError> {
        let response: FeedbackResponse = self
            .post_json("evaluate", &AnswerRequest { answer })
            .await?;

        Ok(response.feedback)
    }

    async fn evaluate_audio_answer(&self, answer: &str) -> Result<String, RemoteError> {
        let response: FeedbackResponse = self
            .post_json("evaluate-audio", &AnswerRequest { answer })
            .await?;

        Ok(response.feedback)
    }

    async fn improve_answer(&self, answer: &str) -> Result<String, RemoteError> {
        let response: ImproveResponse = self
            .post_json("improve", &AnswerRequest { answer })
            .await?;

        Ok(response.improved)
    }

    async fn transcribe(&self, wav: Vec<u8>) -> Result<Transcription, RemoteError> {
        info!("Posting {} byte recording for transcription", wav.len());

        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| RemoteError::new(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.transcription_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let payload = response.json::<TranscriptionResponse>().await?;

        Ok(payload.into())
    }
}
