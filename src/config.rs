use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub remote: RemoteConfig,
    pub audio: AudioSettings,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the evaluation service (question generation, answer
    /// evaluation, improvement).
    pub evaluation_url: String,
    /// Full URL of the transcription endpoint.
    pub transcription_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// Hard cap on recording length in seconds.
    pub max_record_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// File the evaluation records are appended to (one JSON line each).
    pub records_path: String,
}

#[derive(Debug, Deserialize)]
pub struct IdentityConfig {
    /// Stable identifier of the current user. Submitting an answer
    /// requires one.
    pub user_id: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
