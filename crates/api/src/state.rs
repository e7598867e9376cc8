use std::sync::Arc;

use anyhow::Context;
use reelsmith_blob::{BlobStore, VercelBlobApi};
use reelsmith_runway::{GenerationProvider, RunwayApi, RunwayConfig};
use reelsmith_speech::{OpenAiSpeech, SpeechSynthesizer};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Nothing in it is
/// mutated after startup. A provider is `None` when its credential was not
/// configured.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Image/video generation backend.
    pub generation: Option<Arc<dyn GenerationProvider>>,
    /// Storage for user-uploaded seed images.
    pub blob_store: Option<Arc<dyn BlobStore>>,
    /// Voiceover synthesis backend.
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
}

impl AppState {
    /// Build provider clients from the configured credentials.
    ///
    /// Fails only on malformed provider URLs; missing credentials simply
    /// leave the provider unset.
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let providers = &config.providers;

        let generation = match &providers.runway_api_key {
            Some(key) => {
                let api = RunwayApi::new(RunwayConfig {
                    api_key: key.clone(),
                    api_url: providers.runway_api_url.clone(),
                    api_version: providers.runway_api_version.clone(),
                })
                .context("Invalid Runway configuration")?;
                Some(Arc::new(api) as Arc<dyn GenerationProvider>)
            }
            None => None,
        };

        let blob_store = match &providers.blob_token {
            Some(token) => {
                let api = VercelBlobApi::new(&providers.blob_api_url, token.clone())
                    .context("Invalid blob storage configuration")?;
                Some(Arc::new(api) as Arc<dyn BlobStore>)
            }
            None => None,
        };

        let speech = match &providers.openai_api_key {
            Some(key) => {
                let api = OpenAiSpeech::new(&providers.openai_api_url, key.clone())
                    .context("Invalid speech configuration")?;
                Some(Arc::new(api) as Arc<dyn SpeechSynthesizer>)
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            generation,
            blob_store,
            speech,
        })
    }

    /// The generation provider, or a configuration error.
    pub fn generation(&self) -> AppResult<&dyn GenerationProvider> {
        self.generation
            .as_deref()
            .ok_or(AppError::MissingConfig("RUNWAY_API_KEY"))
    }

    /// The blob store, or a configuration error.
    pub fn blob_store(&self) -> AppResult<&dyn BlobStore> {
        self.blob_store
            .as_deref()
            .ok_or(AppError::MissingConfig("BLOB_READ_WRITE_TOKEN"))
    }

    /// The speech synthesizer, or a configuration error.
    pub fn speech(&self) -> AppResult<&dyn SpeechSynthesizer> {
        self.speech
            .as_deref()
            .ok_or(AppError::MissingConfig("OPENAI_API_KEY"))
    }
}
