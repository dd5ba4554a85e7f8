use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use super::backend::{CaptureConfig, MicrophoneBackend};
use crate::error::{CaptureError, CoachError, RemoteError};
use crate::remote::{EvaluationClient, Transcription};

/// The live resource representing one in-progress capture. At most one
/// exists at a time, exclusively owned by [`AudioCapture`]; discarded on
/// finalization and never reused.
struct RecordingHandle {
    id: Uuid,
    stop_tx: Option<oneshot::Sender<()>>,
}

/// Returned by [`AudioCapture::start`]: the handle identifier plus the
/// channels delivering the recording's outcome.
#[derive(Debug)]
pub struct RecordingOutcome {
    pub handle: Uuid,
    /// Fires once the audio is finalized and transcription begins.
    pub finalized: oneshot::Receiver<()>,
    /// Resolves with the transcription outcome.
    pub done: oneshot::Receiver<Result<Transcription, CoachError>>,
}

/// Owns the microphone lifecycle and enforces the maximum recording
/// duration.
///
/// A recording ends on the first of: explicit [`stop`](Self::stop), the
/// deadline firing, or the backend closing the stream. Every path releases
/// the device, finalizes the buffered samples into a single WAV blob, and
/// hands the blob to the transcription operation.
pub struct AudioCapture {
    backend: Arc<Mutex<Box<dyn MicrophoneBackend>>>,
    client: Arc<dyn EvaluationClient>,
    config: CaptureConfig,
    active: Arc<Mutex<Option<RecordingHandle>>>,
}

impl AudioCapture {
    pub fn new(
        backend: Box<dyn MicrophoneBackend>,
        client: Arc<dyn EvaluationClient>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            client,
            config,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a recording is currently live.
    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Acquire the microphone and start recording.
    ///
    /// Arms the deadline timer; the recording is bounded in length
    /// regardless of whether the caller ever stops it.
    pub async fn start(&self) -> Result<RecordingOutcome, CaptureError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            warn!("A recording is already live");
            return Err(CaptureError::DeviceUnavailable);
        }

        let mut frames = {
            let mut backend = self.backend.lock().await;
            backend.start().await?
        };

        let id = Uuid::new_v4();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (finalized_tx, finalized_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        *active = Some(RecordingHandle {
            id,
            stop_tx: Some(stop_tx),
        });
        drop(active);

        info!("Recording {} started (cap {:?})", id, self.config.max_duration);

        let backend = Arc::clone(&self.backend);
        let client = Arc::clone(&self.client);
        let active = Arc::clone(&self.active);
        let config = self.config.clone();

        tokio::spawn(async move {
            let mut samples: Vec<i16> = Vec::new();
            let mut sample_rate = config.sample_rate;
            let mut channels = config.channels;

            // The deadline lives and dies with this recording: stopping
            // early drops it with the select.
            let deadline = tokio::time::sleep(config.max_duration);
            tokio::pin!(deadline);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    frame = frames.recv() => match frame {
                        Some(frame) => {
                            sample_rate = frame.sample_rate;
                            channels = frame.channels;
                            samples.extend_from_slice(&frame.samples);
                        }
                        None => {
                            warn!("Recording {}: audio stream closed by backend", id);
                            break;
                        }
                    },
                    _ = &mut stop_rx => {
                        info!("Recording {} stopped", id);
                        break;
                    }
                    _ = &mut deadline => {
                        info!(
                            "Recording {} reached the {:?} cap, auto-stopping",
                            id, config.max_duration
                        );
                        break;
                    }
                }
            }

            // Release the device on every exit path
            if let Err(e) = backend.lock().await.stop().await {
                warn!("Failed to release microphone: {}", e);
            }

            // Collect frames the backend flushed before releasing
            while let Ok(frame) = frames.try_recv() {
                sample_rate = frame.sample_rate;
                channels = frame.channels;
                samples.extend_from_slice(&frame.samples);
            }

            // The handle is discarded before transcription resolves; it is
            // never reused.
            active.lock().await.take();

            let blob = match encode_wav(&samples, sample_rate, channels) {
                Ok(blob) => blob,
                Err(e) => {
                    warn!("Recording {}: failed to encode WAV: {}", id, e);
                    let _ = done_tx.send(Err(CoachError::Remote(RemoteError::new(
                        "recording could not be encoded",
                    ))));
                    return;
                }
            };

            info!(
                "Recording {} finalized: {} samples, {} bytes",
                id,
                samples.len(),
                blob.len()
            );

            let _ = finalized_tx.send(());

            let outcome = client.transcribe(blob).await.map_err(CoachError::from);
            let _ = done_tx.send(outcome);
        });

        Ok(RecordingOutcome {
            handle: id,
            finalized: finalized_rx,
            done: done_rx,
        })
    }

    /// Signal the live recording to finalize.
    ///
    /// Returns whether a live recording was signaled. Calling this with no
    /// active recording, a stale handle, or twice for the same handle is a
    /// no-op, tolerating late and duplicate stop signals.
    pub async fn stop(&self, handle: Uuid) -> bool {
        let mut active = self.active.lock().await;
        match active.as_mut() {
            Some(recording) if recording.id == handle => match recording.stop_tx.take() {
                Some(tx) => {
                    let _ = tx.send(());
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

/// Finalize buffered samples into a single in-memory WAV blob
/// (16-bit PCM).
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_round_trip() {
        let samples: Vec<i16> = (0..1600).map(|i| (i % 100) as i16).collect();
        let blob = encode_wav(&samples, 16000, 1).unwrap();

        let reader = hound::WavReader::new(Cursor::new(blob)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_encode_wav_empty_recording() {
        let blob = encode_wav(&[], 16000, 1).unwrap();

        let reader = hound::WavReader::new(Cursor::new(blob)).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
