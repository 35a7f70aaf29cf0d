//! HTTP + WebSocket API for botcheck
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /detectors - Registered detectors in order
//! - POST /evaluate - Evaluate a snapshot, returns the report
//! - WS /ws/reports - Live report stream

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

use crate::core::{aggregator, append_audit_record, EvaluationEngine, FailurePolicy};
use crate::types::{EvaluationReport, Snapshot};

/// App state
pub struct AppState {
    pub engine: EvaluationEngine,
    pub audit_log: Option<PathBuf>,
    pub evaluations: AtomicU64,
    pub report_tx: broadcast::Sender<EvaluationReport>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub detectors_registered: usize,
    pub evaluations_total: u64,
}

/// Detector listing response
#[derive(Debug, Serialize)]
pub struct DetectorsResponse {
    pub detectors: Vec<String>,
    pub failure_policy: FailurePolicy,
}

/// Create the API router
pub fn create_router(engine: EvaluationEngine, audit_log: Option<PathBuf>) -> Router {
    let (report_tx, _) = broadcast::channel(100);
    let state = Arc::new(AppState {
        engine,
        audit_log,
        evaluations: AtomicU64::new(0),
        report_tx,
    });

    Router::new()
        .route("/health", get(health))
        .route("/detectors", get(list_detectors))
        .route("/evaluate", post(evaluate))
        .route("/ws/reports", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        detectors_registered: state.engine.registry().len(),
        evaluations_total: state.evaluations.load(Ordering::Relaxed),
    })
}

/// List registered detectors
async fn list_detectors(State(state): State<Arc<AppState>>) -> Json<DetectorsResponse> {
    Json(DetectorsResponse {
        detectors: state.engine.registry().names().map(str::to_string).collect(),
        failure_policy: state.engine.policy(),
    })
}

/// Evaluate a snapshot
async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<Snapshot>,
) -> Json<EvaluationReport> {
    let evaluation = state.engine.evaluate_with_diagnostics(&snapshot);
    let report = aggregator::report(evaluation, &snapshot);
    state.evaluations.fetch_add(1, Ordering::Relaxed);

    // Audit failures must not fail the request
    if let Some(path) = state.audit_log.clone() {
        let record = report.clone();
        let written = tokio::task::spawn_blocking(move || {
            append_audit_record(&record, &path).map_err(|e| (e, path))
        })
        .await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err((e, path))) => {
                tracing::error!(error = %e, path = %path.display(), "Failed to append audit record");
            }
            Err(e) => tracing::error!(error = %e, "Audit write task failed"),
        }
    }

    // No subscribers is fine
    let _ = state.report_tx.send(report.clone());

    Json(report)
}

/// WebSocket handler for live reports
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.report_tx.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

/// Forward reports until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<EvaluationReport>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let report = match update {
                    Ok(report) => report,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WebSocket subscriber lagged, reports dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let json = match serde_json::to_string(&report) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize report");
                        continue;
                    }
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    tracing::debug!("WebSocket subscriber disconnected");
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    engine: EvaluationEngine,
    audit_log: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let detectors = engine.registry().len();
    let policy = engine.policy();
    let router = create_router(engine, audit_log);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr, detectors, policy = ?policy, "botcheck API listening");
    println!("🛡  botcheck API running on {}", addr);
    println!("  GET  /health      - Health check");
    println!("  GET  /detectors   - Registered detectors");
    println!("  POST /evaluate    - Evaluate snapshot");
    println!("  WS   /ws/reports  - Live reports");
    axum::serve(listener, router).await?;
    Ok(())
}
