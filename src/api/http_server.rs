// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::analyze::analyze_objects_handler;
use super::chat::chat_handler;
use super::detect::detect_handler;
use super::errors::{ApiError, MISSING_API_KEY_MESSAGE};
use super::handlers::health_handler;
use crate::config::service::DEFAULT_MAX_UPLOAD_BYTES;
use crate::config::{ServiceConfig, ServiceKind};
use crate::gemini::GeminiClient;
use crate::vision::{Annotator, VisionModelManager};

/// Process-wide state injected into every handler
///
/// Everything here is built once at start-up and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub vision_model_manager: Arc<VisionModelManager>,
    pub annotator: Arc<Annotator>,
    /// Absent when no API key is configured
    pub gemini: Option<Arc<GeminiClient>>,
    /// Largest decoded image accepted
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        vision_model_manager: VisionModelManager,
        annotator: Annotator,
        gemini: Option<GeminiClient>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            vision_model_manager: Arc::new(vision_model_manager),
            annotator: Arc::new(annotator),
            gemini: gemini.map(Arc::new),
            max_upload_bytes,
        }
    }

    /// State with no detector and no API key
    pub fn new_for_test() -> Self {
        Self::new(
            VisionModelManager::disabled(),
            Annotator::default(),
            None,
            DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    /// The generative client, or the fixed configuration error
    pub fn gemini_client(&self) -> Result<Arc<GeminiClient>, ApiError> {
        self.gemini
            .clone()
            .ok_or_else(|| ApiError::Configuration(MISSING_API_KEY_MESSAGE.to_string()))
    }
}

/// Build the router for `service`
///
/// `/health` is always mounted; `detection` adds `/detect`, `chat` adds
/// `/analyze-objects` and `/chat`, `all` mounts everything.
pub fn create_router(state: AppState, service: ServiceKind, body_limit_bytes: usize) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));

    if service.serves_detection() {
        router = router.route("/detect", post(detect_handler));
    }

    if service.serves_chat() {
        router = router
            .route("/analyze-objects", post(analyze_objects_handler))
            .route("/chat", post(chat_handler));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until Ctrl+C
pub async fn start_server(
    config: &ServiceConfig,
    service: ServiceKind,
    state: AppState,
) -> anyhow::Result<()> {
    let app = create_router(state, service, config.body_limit_bytes());

    let addr = config.listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("{:?} service listening on {}", service, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
