// Microphone capture via cpal. The cpal stream is !Send, so a dedicated
// thread owns it for the lifetime of the capture and frames are forwarded
// over a channel.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureConfig, MicrophoneBackend};
use crate::error::CaptureError;

pub struct CpalMicrophone {
    config: CaptureConfig,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
    capturing: bool,
}

impl CpalMicrophone {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl MicrophoneBackend for CpalMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.capturing {
            warn!("Microphone already capturing");
            return Err(CaptureError::DeviceUnavailable);
        }

        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), CaptureError>>();

        let stop_flag = Arc::new(AtomicBool::new(false));
        self.stop_flag = Arc::clone(&stop_flag);

        let target_rate = self.config.sample_rate;
        let thread = std::thread::spawn(move || {
            run_capture(frame_tx, ready_tx, stop_flag, target_rate);
        });

        // Wait for the device acquisition outcome off the async runtime.
        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|_| CaptureError::DeviceUnavailable)?
            .map_err(|_| CaptureError::DeviceUnavailable)?;
        ready?;

        self.thread = Some(thread);
        self.capturing = true;

        info!("Microphone capture started ({}Hz target)", target_rate);

        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.capturing {
            return Ok(());
        }

        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(thread) = self.thread.take() {
            let _ = tokio::task::spawn_blocking(move || thread.join()).await;
        }

        self.capturing = false;
        info!("Microphone released");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

fn run_capture(
    frames: mpsc::Sender<AudioFrame>,
    ready: std::sync::mpsc::Sender<Result<(), CaptureError>>,
    stop: Arc<AtomicBool>,
    target_rate: u32,
) {
    let host = cpal::default_host();

    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready.send(Err(CaptureError::DeviceUnavailable));
            return;
        }
    };

    let supported = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready.send(Err(map_device_error(&e.to_string())));
            return;
        }
    };

    let device_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let started = Instant::now();

    let stream = device.build_input_stream(
        &supported.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Downmix to mono i16
            let mono: Vec<i16> = data
                .chunks(channels)
                .map(|chunk| {
                    let avg = chunk.iter().sum::<f32>() / channels as f32;
                    (avg.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                })
                .collect();

            // Decimate to the target rate when the device rate is an
            // integer multiple (e.g. 48kHz -> 16kHz)
            let (samples, sample_rate) =
                if device_rate > target_rate && device_rate % target_rate == 0 {
                    let ratio = (device_rate / target_rate) as usize;
                    (mono.iter().step_by(ratio).copied().collect(), target_rate)
                } else {
                    (mono, device_rate)
                };

            if samples.is_empty() {
                return;
            }

            let frame = AudioFrame {
                samples,
                sample_rate,
                channels: 1,
                timestamp_ms: started.elapsed().as_millis() as u64,
            };

            // Drop the frame rather than block the audio callback
            let _ = frames.try_send(frame);
        },
        |err| warn!("Input stream error: {}", err),
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(map_device_error(&e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(map_device_error(&e.to_string())));
        return;
    }

    let _ = ready.send(Ok(()));

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(20));
    }

    // Dropping the stream releases the device
    drop(stream);
}

fn map_device_error(message: &str) -> CaptureError {
    let lowered = message.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") || lowered.contains("access") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::DeviceUnavailable
    }
}
