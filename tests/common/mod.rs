#![allow(dead_code)]

// Shared test doubles for the integration suites: a scripted microphone
// backend, a stubbed evaluation client, and an in-memory record sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use interview_coach::{
    AudioCapture, AudioFrame, CaptureConfig, CaptureError, EvaluationClient, EvaluationRecord,
    MicrophoneBackend, RecordSink, RemoteError, Role, Transcription,
};

/// Microphone backend fed from a script of frames. Counts device
/// acquisitions and releases so tests can assert nothing leaks.
pub struct ScriptedMicrophone {
    frames: Vec<AudioFrame>,
    tx: Option<mpsc::Sender<AudioFrame>>,
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    capturing: bool,
}

impl ScriptedMicrophone {
    pub fn new(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames,
            tx: None,
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
            capturing: false,
        }
    }

    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::clone(&self.acquired), Arc::clone(&self.released))
    }
}

#[async_trait::async_trait]
impl MicrophoneBackend for ScriptedMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let (tx, rx) = mpsc::channel(256);

        for frame in self.frames.clone() {
            let _ = tx.try_send(frame);
        }

        // Keeping a sender alive holds the stream open until stop()
        self.tx = Some(tx);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.capturing = true;

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.tx.take();
        if self.capturing {
            self.released.fetch_add(1, Ordering::SeqCst);
            self.capturing = false;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted-microphone"
    }
}

/// Microphone backend whose acquisition always fails.
pub struct FailingMicrophone {
    pub error: CaptureError,
}

#[async_trait::async_trait]
impl MicrophoneBackend for FailingMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        Err(self.error.clone())
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "failing-microphone"
    }
}

/// Canned responses for the five remote operations, with per-operation
/// failure switches, an optional artificial delay, and call counters.
pub struct StubEvaluationClient {
    pub question: Mutex<String>,
    pub feedback: Mutex<String>,
    pub audio_feedback: Mutex<String>,
    pub improved: Mutex<String>,
    /// `None` makes `transcribe` fail.
    pub transcription: Mutex<Option<Transcription>>,

    pub fail_question: Mutex<bool>,
    pub fail_evaluate: Mutex<bool>,
    pub fail_improve: Mutex<bool>,

    /// Applied to every operation, to widen the busy window in tests.
    pub delay: Mutex<Duration>,

    pub evaluate_calls: AtomicUsize,
    pub audio_evaluate_calls: AtomicUsize,
    pub improve_calls: AtomicUsize,
    pub transcribe_calls: AtomicUsize,

    /// Last blob posted for transcription.
    pub last_blob: Mutex<Option<Vec<u8>>>,
}

impl StubEvaluationClient {
    pub fn new() -> Self {
        Self {
            question: Mutex::new("Explain REST".to_string()),
            feedback: Mutex::new("- Good start\n- Add example".to_string()),
            audio_feedback: Mutex::new("- Clear delivery".to_string()),
            improved: Mutex::new("A fuller answer.".to_string()),
            transcription: Mutex::new(Some(Transcription {
                text: "Spoken answer".to_string(),
                sentiment: None,
            })),
            fail_question: Mutex::new(false),
            fail_evaluate: Mutex::new(false),
            fail_improve: Mutex::new(false),
            delay: Mutex::new(Duration::ZERO),
            evaluate_calls: AtomicUsize::new(0),
            audio_evaluate_calls: AtomicUsize::new(0),
            improve_calls: AtomicUsize::new(0),
            transcribe_calls: AtomicUsize::new(0),
            last_blob: Mutex::new(None),
        }
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl EvaluationClient for StubEvaluationClient {
    async fn generate_question(&self, _role: Role) -> Result<String, RemoteError> {
        self.pause().await;
        if *self.fail_question.lock().unwrap() {
            return Err(RemoteError::new("question service down"));
        }
        Ok(self.question.lock().unwrap().clone())
    }

    async fn evaluate_answer(&self, _answer: &str) -> Result<String, RemoteError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if *self.fail_evaluate.lock().unwrap() {
            return Err(RemoteError::new("evaluation service down"));
        }
        Ok(self.feedback.lock().unwrap().clone())
    }

    async fn evaluate_audio_answer(&self, _answer: &str) -> Result<String, RemoteError> {
        self.audio_evaluate_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if *self.fail_evaluate.lock().unwrap() {
            return Err(RemoteError::new("evaluation service down"));
        }
        Ok(self.audio_feedback.lock().unwrap().clone())
    }

    async fn improve_answer(&self, _answer: &str) -> Result<String, RemoteError> {
        self.improve_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if *self.fail_improve.lock().unwrap() {
            return Err(RemoteError::new("improvement service down"));
        }
        Ok(self.improved.lock().unwrap().clone())
    }

    async fn transcribe(&self, wav: Vec<u8>) -> Result<Transcription, RemoteError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_blob.lock().unwrap() = Some(wav);
        self.pause().await;
        self.transcription
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteError::new("transcription service down"))
    }
}

/// Record sink collecting appended records in memory.
pub struct MemorySink {
    pub records: Mutex<Vec<EvaluationRecord>>,
    pub fail: Mutex<bool>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, record: &EvaluationRecord) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("sink unavailable");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Frames of 10ms of audio at 16kHz mono.
pub fn frames(count: usize) -> Vec<AudioFrame> {
    (0..count)
        .map(|i| AudioFrame {
            samples: vec![7i16; 160],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: (i * 10) as u64,
        })
        .collect()
}

pub fn make_capture(
    mic: impl MicrophoneBackend + 'static,
    client: Arc<StubEvaluationClient>,
    max_duration: Duration,
) -> AudioCapture {
    let client: Arc<dyn EvaluationClient> = client;
    AudioCapture::new(
        Box::new(mic),
        client,
        CaptureConfig {
            sample_rate: 16000,
            channels: 1,
            max_duration,
        },
    )
}
