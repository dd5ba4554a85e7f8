use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interview role the questions are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Business Analyst")]
    BusinessAnalyst,
    #[serde(rename = "Product Manager")]
    ProductManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "Software Engineer",
            Role::BusinessAnalyst => "Business Analyst",
            Role::ProductManager => "Product Manager",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::SoftwareEngineer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "software engineer" => Ok(Role::SoftwareEngineer),
            "business analyst" => Ok(Role::BusinessAnalyst),
            "product manager" => Ok(Role::ProductManager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Tone detected on a transcribed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Where the session currently is in the practice flow.
///
/// ```text
/// Idle → QuestionLoading → QuestionReady → AnswerSubmitting → FeedbackReady
///                                │                                 │
///                                │                          ImproveLoading
///                                ▼                                 │
///                            Recording → Transcribing → FeedbackReady
/// ```
///
/// Failed operations return to the last good phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    QuestionLoading,
    QuestionReady,
    AnswerSubmitting,
    FeedbackReady,
    ImproveLoading,
    Recording,
    Transcribing,
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording | Self::Transcribing)
    }
}

/// The mutable state of one interview practice round.
///
/// Exactly one is live per `InterviewSession`; it is replaced when a new
/// question is requested and mutated in place through the flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,

    /// Current question, empty until one is generated.
    pub question: String,

    /// The candidate's answer (typed, or transcribed from audio).
    pub answer: String,

    /// Feedback points derived from the last raw feedback string.
    /// Always produced by `feedback::parse`, never hand-edited.
    pub feedback_points: Vec<String>,

    /// Improved rewrite of the answer, empty until requested.
    pub improved_answer: String,

    /// Tone detected on the transcribed answer, if any.
    pub sentiment: Option<SentimentLabel>,
}

impl Session {
    /// Fresh session for a role: question set, everything else cleared.
    pub fn with_question(role: Role, question: String) -> Self {
        Self {
            role,
            question,
            answer: String::new(),
            feedback_points: Vec::new(),
            improved_answer: String::new(),
            sentiment: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            role: Role::default(),
            question: String::new(),
            answer: String::new(),
            feedback_points: Vec::new(),
            improved_answer: String::new(),
            sentiment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_strings() {
        assert_eq!(Role::SoftwareEngineer.as_str(), "Software Engineer");
        assert_eq!(Role::BusinessAnalyst.as_str(), "Business Analyst");
        assert_eq!(Role::ProductManager.as_str(), "Product Manager");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("software-engineer".parse::<Role>().unwrap(), Role::SoftwareEngineer);
        assert_eq!("Product Manager".parse::<Role>().unwrap(), Role::ProductManager);
        assert!("barista".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_as_display_string() {
        let json = serde_json::to_string(&Role::BusinessAnalyst).unwrap();
        assert_eq!(json, "\"Business Analyst\"");
    }

    #[test]
    fn test_with_question_clears_previous_round() {
        let session = Session::with_question(Role::ProductManager, "Why PM?".to_string());
        assert_eq!(session.question, "Why PM?");
        assert!(session.answer.is_empty());
        assert!(session.feedback_points.is_empty());
        assert!(session.improved_answer.is_empty());
        assert!(session.sentiment.is_none());
    }
}
