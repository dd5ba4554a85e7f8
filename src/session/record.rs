use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::model::Role;

/// Immutable snapshot of one completed text-answer evaluation, appended to
/// the record sink. Created once per successful typed submission; audio
/// answers are not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub user_id: String,
    pub role: Role,
    pub question: String,
    pub answer: String,
    pub raw_feedback: String,
    pub improved_answer: String,
    pub created_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn new(
        user_id: String,
        role: Role,
        question: String,
        answer: String,
        raw_feedback: String,
    ) -> Self {
        Self {
            user_id,
            role,
            question,
            answer,
            raw_feedback,
            improved_answer: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only sink the session persists evaluations through.
///
/// The session only requires eventual durability: a failed append is
/// reported but does not roll back feedback already shown.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &EvaluationRecord) -> Result<()>;
}

/// Record sink writing one JSON line per record to a local file.
pub struct JsonlRecordSink {
    path: PathBuf,
}

impl JsonlRecordSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create records directory: {}", dir.display()))?;
        }

        Ok(Self { path })
    }
}

#[async_trait::async_trait]
impl RecordSink for JsonlRecordSink {
    async fn append(&self, record: &EvaluationRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open records file: {}", self.path.display()))?;

        writeln!(file, "{line}").context("Failed to append record")?;

        info!("Appended evaluation record to {}", self.path.display());

        Ok(())
    }
}

/// Supplies the stable user identifier of the current actor.
/// Without one, submitting an answer fails before any remote call.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// Identity fixed at startup (from configuration).
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        self.user_id.clone()
    }
}
