#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use reelsmith_api::config::{ProviderConfig, ServerConfig};
use reelsmith_api::router::build_app_router;
use reelsmith_api::state::AppState;
use reelsmith_blob::{BlobApiError, BlobStore, StoredBlob};
use reelsmith_core::poll::PollConfig;
use reelsmith_runway::{
    CreatedTask, GenerationProvider, ImageToVideoRequest, RunwayApiError, TaskRecord,
    TextToImageRequest,
};
use reelsmith_speech::{SpeechApiError, SpeechSynthesizer};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Poll attempts allowed in tests. Polling never sleeps.
pub const TEST_POLL_ATTEMPTS: u32 = 3;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024,
        poll: PollConfig::immediate(TEST_POLL_ATTEMPTS),
        providers: ProviderConfig::unconfigured(),
    }
}

/// Fake providers to plug into the app. `None` leaves a provider unconfigured.
#[derive(Default)]
pub struct Providers {
    pub runway: Option<Arc<FakeRunway>>,
    pub blob: Option<Arc<FakeBlob>>,
    pub speech: Option<Arc<FakeSpeech>>,
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(providers: Providers) -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        generation: providers
            .runway
            .map(|p| p as Arc<dyn GenerationProvider>),
        blob_store: providers.blob.map(|p| p as Arc<dyn BlobStore>),
        speech: providers.speech.map(|p| p as Arc<dyn SpeechSynthesizer>),
    };
    build_app_router(state, &config)
}

/// App with no provider configured.
pub fn build_unconfigured_app() -> Router {
    build_test_app(Providers::default())
}

// ---------------------------------------------------------------------------
// Fake generation provider
// ---------------------------------------------------------------------------

/// Scripted generation provider.
///
/// Each `get_task` call pops the next scripted payload; the last one repeats
/// once the script runs out. Created task ids are `task-1`, `task-2`, ...
#[derive(Default)]
pub struct FakeRunway {
    statuses: Mutex<VecDeque<Value>>,
    create_error: Mutex<Option<(u16, String)>>,
    pub image_requests: Mutex<Vec<TextToImageRequest>>,
    pub video_requests: Mutex<Vec<ImageToVideoRequest>>,
    pub task_lookups: Mutex<Vec<String>>,
    created: Mutex<u32>,
}

impl FakeRunway {
    pub fn with_statuses(statuses: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        })
    }

    /// Every task succeeds immediately with `url` as its output.
    pub fn succeeding(url: &str) -> Arc<Self> {
        Self::with_statuses(vec![json!({"status": "SUCCEEDED", "output": [url]})])
    }

    /// Task creation answers with the given upstream status and body.
    pub fn rejecting(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            create_error: Mutex::new(Some((status, body.to_string()))),
            ..Self::default()
        })
    }

    pub fn lookups(&self) -> usize {
        self.task_lookups.lock().unwrap().len()
    }

    fn next_id(&self) -> Result<CreatedTask, RunwayApiError> {
        if let Some((status, body)) = self.create_error.lock().unwrap().clone() {
            return Err(RunwayApiError::Api { status, body });
        }
        let mut created = self.created.lock().unwrap();
        *created += 1;
        Ok(CreatedTask {
            id: format!("task-{created}"),
        })
    }
}

#[async_trait]
impl GenerationProvider for FakeRunway {
    async fn text_to_image(
        &self,
        request: &TextToImageRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        self.image_requests.lock().unwrap().push(request.clone());
        self.next_id()
    }

    async fn image_to_video(
        &self,
        request: &ImageToVideoRequest,
    ) -> Result<CreatedTask, RunwayApiError> {
        self.video_requests.lock().unwrap().push(request.clone());
        self.next_id()
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, RunwayApiError> {
        self.task_lookups.lock().unwrap().push(task_id.to_string());
        let mut statuses = self.statuses.lock().unwrap();
        let mut payload = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| json!({"status": "RUNNING"}))
        };
        payload["id"] = json!(task_id);
        TaskRecord::from_raw(payload)
    }
}

// ---------------------------------------------------------------------------
// Fake blob store and speech synthesizer
// ---------------------------------------------------------------------------

/// Records uploads and serves them from `https://blob.test/<filename>`.
#[derive(Default)]
pub struct FakeBlob {
    pub uploads: Mutex<Vec<(String, String, Bytes)>>,
}

#[async_trait]
impl BlobStore for FakeBlob {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredBlob, BlobApiError> {
        self.uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), content_type.to_string(), body));
        Ok(StoredBlob {
            url: format!("https://blob.test/{filename}"),
        })
    }
}

/// Returns fixed audio bytes, or a scripted upstream rejection.
#[derive(Default)]
pub struct FakeSpeech {
    pub requests: Mutex<Vec<(String, String)>>,
    pub reject: Option<(u16, String)>,
}

pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3";

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, SpeechApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        match &self.reject {
            Some((status, body)) => Err(SpeechApiError::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(Bytes::from_static(FAKE_AUDIO)),
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, json: Value) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(json.to_string())).await
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}
