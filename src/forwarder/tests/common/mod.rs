use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use insights_forwarder::config::{Config, Protocol};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request target as received; absolute-form when sent through a proxy
    pub target: String,
    pub path: String,
    pub insert_key: Option<String>,
    pub proxy_authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct CollectorState {
    status: StatusCode,
    response_body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local stand-in for the Insights collector that records every request
pub struct MockCollector {
    addr: SocketAddr,
    state: Arc<CollectorState>,
    handle: JoinHandle<()>,
}

async fn record(
    State(state): State<Arc<CollectorState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        target: uri.to_string(),
        path: uri.path().to_string(),
        insert_key: header("x-insert-key"),
        proxy_authorization: header("proxy-authorization"),
        content_type: header("content-type"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    (state.status, state.response_body.clone())
}

impl MockCollector {
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, r#"{"success":true}"#).await
    }

    pub async fn start_with(status: StatusCode, response_body: &str) -> Self {
        let state = Arc::new(CollectorState {
            status,
            response_body: response_body.to_string(),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(record).with_state(state.clone());

        // 0: means port will be picked by the OS
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockCollector {
            addr,
            state,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// A plain-http config pointed at this collector
    pub fn config(&self) -> Config {
        Config {
            protocol: Protocol::Http,
            collector_host: self.addr.to_string(),
            request_timeout_seconds: 5.0,
            ..Config::new("284929", "test-insert-key")
        }
    }
}

impl Drop for MockCollector {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
