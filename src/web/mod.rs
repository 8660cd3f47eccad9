//! Minimal browser shell for the simulation
//!
//! Serves the grid as green/red circles with tap-to-toggle, live counts, and
//! start/stop controls. The shell only uses the engine's public surface:
//! snapshots, toggle, lifecycle calls, and the snapshot event stream.

mod assets;

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    config::Scenario,
    engine::{Engine, Lifecycle},
    population::PopulationSnapshot,
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub group_size: usize,
    pub infection_factor: usize,
    pub interval_ms: u64,
    pub lifecycle: Lifecycle,
    pub snapshot: PopulationSnapshot,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
    scenario_name: String,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        host,
        port,
    } = config;

    let engine = Arc::new(Engine::new(scenario.engine_settings()));
    for &index in &scenario.initial_sick {
        engine.toggle(index)?;
    }
    // Mirrors the original view's on-appear behavior; the UI can still stop.
    engine.start();

    let state = AppState {
        engine: Arc::clone(&engine),
        scenario_name: scenario.name.clone(),
    };

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(current_state))
        .route("/api/toggle/:index", post(toggle))
        .route("/api/start", post(start))
        .route("/api/stop", post(stop))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("invalid address");

    info!("simulation UI live at http://{}:{}", host, port);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.stop();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down simulation UI");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/css; charset=utf-8")
        .body(assets::STYLES_CSS.to_string())
        .unwrap()
}

async fn script() -> impl IntoResponse {
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )
        .body(assets::APP_JS.to_string())
        .unwrap()
}

async fn current_state(State(state): State<AppState>) -> Json<StateEnvelope> {
    let settings = state.engine.settings();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        group_size: settings.group_size,
        infection_factor: settings.infection_factor,
        interval_ms: settings.interval.as_millis() as u64,
        lifecycle: state.engine.lifecycle(),
        snapshot: state.engine.snapshot(),
    })
}

async fn toggle(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<PopulationSnapshot>, (StatusCode, String)> {
    match state.engine.toggle(index) {
        Ok(_) => Ok(Json(state.engine.snapshot())),
        Err(err) => Err((StatusCode::BAD_REQUEST, err.to_string())),
    }
}

async fn start(State(state): State<AppState>) -> StatusCode {
    state.engine.start();
    StatusCode::NO_CONTENT
}

async fn stop(State(state): State<AppState>) -> StatusCode {
    state.engine.stop();
    StatusCode::NO_CONTENT
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.engine.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(snapshot) => serde_json::to_string(&snapshot)
            .ok()
            .map(|payload| Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
