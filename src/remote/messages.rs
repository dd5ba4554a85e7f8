use serde::{Deserialize, Serialize};

use crate::session::SentimentLabel;

/// Result of transcribing one recorded answer.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub sentiment: Option<SentimentLabel>,
}

#[derive(Debug, Serialize)]
pub struct QuestionRequest<'a> {
    pub role: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerRequest<'a> {
    pub answer: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct ImproveResponse {
    pub improved: String,
}

/// Wire shape of the transcription endpoint response:
/// `{ "text": ..., "sentiment": { "label": "Positive" } }`, sentiment
/// optional. Unknown fields (e.g. raw sentiment scores) are ignored.
#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub sentiment: Option<SentimentInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SentimentInfo {
    pub label: SentimentLabel,
}

impl From<TranscriptionResponse> for Transcription {
    fn from(response: TranscriptionResponse) -> Self {
        Self {
            text: response.text,
            sentiment: response.sentiment.map(|s| s.label),
        }
    }
}
