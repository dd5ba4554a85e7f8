use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::model::{Role, Session, SessionPhase};
use super::record::{EvaluationRecord, IdentityProvider, RecordSink};
use crate::audio::AudioCapture;
use crate::error::{CoachError, RemoteError};
use crate::feedback;
use crate::remote::{EvaluationClient, Transcription};

/// Handle on an in-flight recording pipeline.
#[derive(Debug)]
pub struct RecordingControl {
    pub handle: Uuid,
    /// Resolves once the transcription/evaluation pipeline completes,
    /// with the feedback points or the error that ended it.
    pub done: oneshot::Receiver<Result<Vec<String>, CoachError>>,
}

struct SessionCore {
    session: Session,
    phase: SessionPhase,
}

/// The interview practice coordinator: owns the session state, sequences
/// calls to the remote services and the audio capture, and persists
/// completed text evaluations through the record sink.
///
/// One logical session per instance. All operations are serialized behind
/// a single busy gate: while any of them is in flight, competing
/// operations are rejected with [`CoachError::Busy`], so at most one
/// remote call is outstanding and feedback always reflects the most
/// recently completed evaluation.
pub struct InterviewSession {
    core: Arc<Mutex<SessionCore>>,

    /// Set while a remote operation is in flight.
    busy: Arc<AtomicBool>,

    /// Set from the start of a recording until its transcription/
    /// evaluation pipeline completes.
    recording: Arc<AtomicBool>,

    client: Arc<dyn EvaluationClient>,
    sink: Arc<dyn RecordSink>,
    identity: Arc<dyn IdentityProvider>,
    capture: AudioCapture,

    /// Identifier of the live recording, if any.
    active_handle: Arc<Mutex<Option<Uuid>>>,
}

/// Holds the busy flag for the duration of one operation; released on
/// every exit path when dropped.
struct OpGuard {
    flag: Arc<AtomicBool>,
}

impl OpGuard {
    fn acquire(busy: &Arc<AtomicBool>, recording: &AtomicBool) -> Result<Self, CoachError> {
        if recording.load(Ordering::SeqCst) {
            return Err(CoachError::Busy);
        }

        if busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoachError::Busy);
        }

        Ok(Self {
            flag: Arc::clone(busy),
        })
    }
}

impl Drop for OpGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl InterviewSession {
    pub fn new(
        client: Arc<dyn EvaluationClient>,
        sink: Arc<dyn RecordSink>,
        identity: Arc<dyn IdentityProvider>,
        capture: AudioCapture,
    ) -> Self {
        Self {
            core: Arc::new(Mutex::new(SessionCore {
                session: Session::default(),
                phase: SessionPhase::Idle,
            })),
            busy: Arc::new(AtomicBool::new(false)),
            recording: Arc::new(AtomicBool::new(false)),
            client,
            sink,
            identity,
            capture,
            active_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Request a new question for `role` and begin a fresh round.
    ///
    /// On success the previous session is replaced: question set; answer,
    /// feedback, improved answer and sentiment cleared. On failure nothing
    /// is overwritten and the prior phase is restored.
    pub async fn start_interview(&self, role: Role) -> Result<String, CoachError> {
        let _guard = self.begin_op()?;

        let prior = self.enter_phase(SessionPhase::QuestionLoading).await;

        info!("Starting interview for role: {}", role);

        match self.client.generate_question(role).await {
            Ok(question) => {
                let mut core = self.core.lock().await;
                core.session = Session::with_question(role, question.clone());
                core.phase = SessionPhase::QuestionReady;
                Ok(question)
            }
            Err(e) => {
                warn!("Question generation failed: {}", e);
                self.core.lock().await.phase = prior;
                Err(e.into())
            }
        }
    }

    /// Submit a typed answer for evaluation.
    ///
    /// Rejects empty input before any remote call. On success the parsed
    /// feedback points are stored and exactly one [`EvaluationRecord`] is
    /// appended to the sink. Evaluation failure leaves all session fields
    /// untouched and writes no record.
    pub async fn submit_answer(&self, answer: &str) -> Result<Vec<String>, CoachError> {
        let _guard = self.begin_op()?;

        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Err(CoachError::Validation("answer must not be empty"));
        }

        // The evaluation is persisted under the user's id, so the identity
        // check happens before anything leaves the process.
        let user_id = self
            .identity
            .current_user()
            .ok_or(CoachError::Unauthenticated)?;

        let prior = self.enter_phase(SessionPhase::AnswerSubmitting).await;

        let raw = match self.client.evaluate_answer(trimmed).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Answer evaluation failed: {}", e);
                self.core.lock().await.phase = prior;
                return Err(e.into());
            }
        };

        let points = feedback::parse(&raw);

        let (role, question) = {
            let mut core = self.core.lock().await;
            core.session.answer = trimmed.to_string();
            core.session.feedback_points = points.clone();
            core.phase = SessionPhase::FeedbackReady;
            (core.session.role, core.session.question.clone())
        };

        let record = EvaluationRecord::new(user_id, role, question, trimmed.to_string(), raw);
        if let Err(e) = self.sink.append(&record).await {
            // Eventual durability only: the feedback already shown stays.
            error!("Failed to persist evaluation record: {}", e);
        }

        Ok(points)
    }

    /// Request an improved rewrite of the current answer.
    ///
    /// Valid only when an answer exists. Replaces the improved answer on
    /// success; leaves it untouched on failure. Never writes a record.
    pub async fn improve_answer(&self) -> Result<String, CoachError> {
        let _guard = self.begin_op()?;

        let answer = { self.core.lock().await.session.answer.clone() };
        if answer.trim().is_empty() {
            return Err(CoachError::Validation("no answer to improve"));
        }

        let prior = self.enter_phase(SessionPhase::ImproveLoading).await;

        match self.client.improve_answer(&answer).await {
            Ok(improved) => {
                let mut core = self.core.lock().await;
                core.session.improved_answer = improved.clone();
                core.phase = SessionPhase::FeedbackReady;
                Ok(improved)
            }
            Err(e) => {
                warn!("Answer improvement failed: {}", e);
                self.core.lock().await.phase = prior;
                Err(e.into())
            }
        }
    }

    /// Start recording a spoken answer.
    ///
    /// On transcription completion the pipeline stores the transcribed
    /// text and sentiment, evaluates through the audio path and parses
    /// feedback exactly like [`submit_answer`](Self::submit_answer), but
    /// writes no record. The returned control's `done` channel resolves
    /// with the outcome whether the recording was stopped explicitly or by
    /// the deadline.
    pub async fn start_recording(&self) -> Result<RecordingControl, CoachError> {
        let guard = self.begin_op()?;

        {
            let core = self.core.lock().await;
            if core.session.question.is_empty() {
                return Err(CoachError::Validation("no question loaded"));
            }
        }

        let outcome = self.capture.start().await?;

        // The recording flag takes over from the busy guard released when
        // this method returns; it stays set until the pipeline completes.
        self.recording.store(true, Ordering::SeqCst);
        self.core.lock().await.phase = SessionPhase::Recording;
        *self.active_handle.lock().await = Some(outcome.handle);

        let (done_tx, done_rx) = oneshot::channel();

        let core = Arc::clone(&self.core);
        let recording = Arc::clone(&self.recording);
        let active_handle = Arc::clone(&self.active_handle);
        let client = Arc::clone(&self.client);
        let handle = outcome.handle;
        let finalized = outcome.finalized;
        let done = outcome.done;

        tokio::spawn(async move {
            if finalized.await.is_ok() {
                core.lock().await.phase = SessionPhase::Transcribing;
            }

            let result = Self::finish_audio_answer(&core, &client, done).await;

            if let Err(e) = &result {
                warn!("Recording pipeline {} failed: {}", handle, e);
                core.lock().await.phase = SessionPhase::QuestionReady;
            }

            active_handle.lock().await.take();
            recording.store(false, Ordering::SeqCst);

            let _ = done_tx.send(result);
        });

        drop(guard);

        info!("Recording {} started", handle);

        Ok(RecordingControl {
            handle,
            done: done_rx,
        })
    }

    /// Stop the live recording, if any.
    ///
    /// A late or duplicate stop is a no-op; the recording may already have
    /// been finalized by the deadline.
    pub async fn stop_recording(&self) -> Result<(), CoachError> {
        let handle = { *self.active_handle.lock().await };

        if let Some(handle) = handle {
            if self.capture.stop(handle).await {
                info!("Stop signaled for recording {}", handle);
            }
        }

        Ok(())
    }

    /// Read-only copy of the current session, for an external renderer.
    pub async fn snapshot(&self) -> Session {
        self.core.lock().await.session.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.core.lock().await.phase
    }

    /// Whether an operation (or the recording pipeline) is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) || self.recording.load(Ordering::SeqCst)
    }

    fn begin_op(&self) -> Result<OpGuard, CoachError> {
        OpGuard::acquire(&self.busy, &self.recording)
    }

    async fn enter_phase(&self, phase: SessionPhase) -> SessionPhase {
        let mut core = self.core.lock().await;
        let prior = core.phase;
        core.phase = phase;
        prior
    }

    async fn finish_audio_answer(
        core: &Arc<Mutex<SessionCore>>,
        client: &Arc<dyn EvaluationClient>,
        done: oneshot::Receiver<Result<Transcription, CoachError>>,
    ) -> Result<Vec<String>, CoachError> {
        let transcription = done
            .await
            .map_err(|_| CoachError::Remote(RemoteError::new("recording pipeline dropped")))??;

        info!("Transcription received ({} chars)", transcription.text.len());

        {
            let mut core = core.lock().await;
            core.session.answer = transcription.text.clone();
            core.session.sentiment = transcription.sentiment;
        }

        let raw = client.evaluate_audio_answer(&transcription.text).await?;
        let points = feedback::parse(&raw);

        {
            let mut core = core.lock().await;
            core.session.feedback_points = points.clone();
            core.phase = SessionPhase::FeedbackReady;
        }

        // Spoken answers are evaluated but not persisted; only typed
        // submissions append an evaluation record.
        Ok(points)
    }
}
