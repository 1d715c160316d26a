//! In-process stand-ins for the file host, the Crystal API and the result
//! download, served by axum on a background tokio runtime so the blocking
//! client under test can talk to them from the test thread.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use crystal_core::{encode_png, ImageTensor};
use crystal_node::{Endpoints, Timeouts, UpscalerConfig};

/// Placeholder replaced with the server's base URL in JSON replies
pub const BASE: &str = "{base}";

#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
    Bytes(StatusCode, Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub upload: Reply,
    pub upload_delay: Option<Duration>,
    pub transform: Reply,
    pub transform_delay: Option<Duration>,
    pub download: Reply,
    pub download_delay: Option<Duration>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            upload: Reply::Json(StatusCode::OK, json!({ "url": format!("{BASE}/files/input.png") })),
            upload_delay: None,
            transform: Reply::Json(
                StatusCode::OK,
                json!({ "status": 200, "message": format!("{BASE}/files/out.png") }),
            ),
            transform_delay: None,
            download: Reply::Bytes(StatusCode::OK, red_png(4, 4)),
            download_delay: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransformCall {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub payload: Value,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub uploads: Vec<UploadedFile>,
    pub transforms: Vec<TransformCall>,
    pub downloads: Vec<String>,
}

impl Recorded {
    pub fn total_calls(&self) -> usize {
        self.uploads.len() + self.transforms.len() + self.downloads.len()
    }
}

struct MockState {
    base: String,
    behavior: Behavior,
    recorded: Mutex<Recorded>,
}

impl MockState {
    fn render(&self, reply: &Reply) -> Response {
        match reply {
            Reply::Json(status, value) => {
                let text = value.to_string().replace(BASE, &self.base);
                (*status, [(CONTENT_TYPE, "application/json")], text).into_response()
            }
            Reply::Text(status, text) => (*status, text.clone()).into_response(),
            Reply::Bytes(status, bytes) => {
                (*status, [(CONTENT_TYPE, "image/png")], bytes.clone()).into_response()
            }
        }
    }
}

pub struct MockServer {
    state: Arc<MockState>,
    // Dropping the runtime stops the server
    _runtime: Runtime,
}

impl MockServer {
    pub fn start(behavior: Behavior) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to build runtime");

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind");
        let addr: SocketAddr = listener.local_addr().expect("No local address");

        let state = Arc::new(MockState {
            base: format!("http://{}", addr),
            behavior,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/put_crystal", post(upload))
            .route("/crystal", post(transform))
            .route("/files/{name}", get(download))
            .with_state(state.clone());

        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self { state, _runtime: runtime }
    }

    pub fn base(&self) -> &str {
        &self.state.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.state.base, path)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            upload_url: self.url("/put_crystal"),
            transform_url: self.url("/crystal"),
        }
    }

    /// Config pointed at this server, with no API key
    pub fn config(&self) -> UpscalerConfig {
        UpscalerConfig::default()
            .with_endpoints(self.endpoints())
            .with_timeouts(Timeouts {
                upload: Duration::from_secs(5),
                transform: Duration::from_secs(5),
                download: Duration::from_secs(5),
            })
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.recorded.lock().expect("Recorder poisoned")
    }
}

async fn upload(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let file = UploadedFile {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.map(|b| b.to_vec()).unwrap_or_default(),
        };
        state.recorded.lock().expect("Recorder poisoned").uploads.push(file);
    }

    pause(state.behavior.upload_delay).await;
    state.render(&state.behavior.upload)
}

async fn transform(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let call = TransformCall {
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        payload: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.recorded.lock().expect("Recorder poisoned").transforms.push(call);

    pause(state.behavior.transform_delay).await;
    state.render(&state.behavior.transform)
}

async fn download(State(state): State<Arc<MockState>>, Path(name): Path<String>) -> Response {
    state.recorded.lock().expect("Recorder poisoned").downloads.push(name);
    pause(state.behavior.download_delay).await;
    state.render(&state.behavior.download)
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// URL on a local port nothing listens on
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}{}", addr, path)
}

/// PNG bytes of a solid red `width` x `height` image
pub fn red_png(width: u32, height: u32) -> Vec<u8> {
    let data = (0..width * height).flat_map(|_| [1.0, 0.0, 0.0]).collect();
    let tensor = ImageTensor::new(height, width, 3, data).expect("Valid tensor");
    encode_png(&tensor).expect("PNG encoding")
}
