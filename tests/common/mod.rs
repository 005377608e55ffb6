#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;

use vendor_services::{
    build_app,
    config::Config,
    dashboard::{Dashboard, ProxyClient},
    error::AppError,
    models::{RowRecord, Sheet, SheetCollection},
    services::{sheet_store::classify_ack, SheetStore, UpdateOutcome},
    AppState,
};

pub fn row(pairs: &[(&str, &str)]) -> RowRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub sheet: Option<String>,
    pub key_value: String,
    pub fields: RowRecord,
}

/// In-memory store that answers with a fixed acknowledgment.
pub struct FakeStore {
    pub rows: Mutex<Vec<RowRecord>>,
    pub ack: Mutex<Value>,
    pub fail: Mutex<bool>,
    pub fetches: Mutex<usize>,
    pub updates: Mutex<Vec<RecordedUpdate>>,
}

impl FakeStore {
    pub fn new(rows: Vec<RowRecord>, ack: Value) -> Self {
        Self {
            rows: Mutex::new(rows),
            ack: Mutex::new(ack),
            fail: Mutex::new(false),
            fetches: Mutex::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().len()
    }
}

#[async_trait]
impl SheetStore for FakeStore {
    async fn fetch_all(&self) -> Result<SheetCollection, AppError> {
        *self.fetches.lock() += 1;
        if *self.fail.lock() {
            return Err(AppError::UpstreamFailure("connection reset by peer".into()));
        }
        Ok(SheetCollection::new(vec![Sheet {
            name: "Sheet1".into(),
            rows: self.rows.lock().clone(),
        }]))
    }

    async fn update_row(
        &self,
        sheet: Option<&str>,
        key_value: &str,
        fields: &RowRecord,
    ) -> Result<UpdateOutcome, AppError> {
        self.updates.lock().push(RecordedUpdate {
            sheet: sheet.map(str::to_string),
            key_value: key_value.to_string(),
            fields: fields.clone(),
        });
        if *self.fail.lock() {
            return Err(AppError::UpstreamFailure("connection reset by peer".into()));
        }
        let body = self.ack.lock().clone();
        Ok(UpdateOutcome {
            status: classify_ack(&body),
            body,
        })
    }
}

pub fn test_config(proxy_url: &str) -> Config {
    let proxy_url = proxy_url.to_string();
    Config::from_vars(move |key| match key {
        "PROXY_URL" => Some(proxy_url.clone()),
        _ => None,
    })
    .expect("test config")
}

/// Router over `store`, whose dashboard reads from `proxy_url`.
pub fn app_with(store: Arc<FakeStore>, proxy_url: &str) -> Router {
    let config = test_config(proxy_url);
    let api = Arc::new(ProxyClient::new(config.proxy_url.clone()));
    let dashboard = Dashboard::new(api, Duration::from_millis(300)).expect("dashboard");
    build_app(Arc::new(AppState::new(config, store, dashboard)))
}

/// Serves `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

/// Serves the full application against `store`, with the dashboard reading
/// through the proxy on the same server.
pub async fn serve_full_app(store: Arc<FakeStore>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = app_with(store, &format!("http://{}/api/vendors", addr));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}
