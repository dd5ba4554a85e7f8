use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Configuration for a capture session
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate written to the WAV header when no frames arrived
    pub sample_rate: u32,
    /// Channel count written to the WAV header when no frames arrived
    pub channels: u16,
    /// Hard cap on recording length; the deadline auto-stops the capture
    pub max_duration: std::time::Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, what the transcription model expects
            channels: 1,        // Mono
            max_duration: std::time::Duration::from_secs(30),
        }
    }
}

/// Microphone capture backend trait
///
/// Implementations:
/// - `CpalMicrophone`: real device capture via cpal
/// - scripted backends in tests
#[async_trait::async_trait]
pub trait MicrophoneBackend: Send + Sync {
    /// Acquire the device and start capturing
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Microphone backend factory
pub struct MicrophoneFactory;

impl MicrophoneFactory {
    /// Create the platform microphone backend
    pub fn create(config: CaptureConfig) -> Box<dyn MicrophoneBackend> {
        Box::new(super::cpal_backend::CpalMicrophone::new(config))
    }
}
