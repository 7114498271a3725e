// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::api::{start_server, AppState};
use crate::config::{DetectorConfig, GeminiConfig, ServiceConfig, ServiceKind};
use crate::gemini::{GeminiClient, GeminiError};
use crate::vision::{Annotator, VisionModelManager};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Which routes to serve
    #[arg(long, value_enum, default_value = "all", env = "VISION_RELAY_SERVICE")]
    pub service: ServiceKind,

    /// Listen address (overrides LISTEN_ADDR)
    #[arg(long)]
    pub listen: Option<String>,
}

/// Load configuration, build shared state and serve until shutdown
pub async fn run(args: ServeArgs) -> Result<()> {
    dotenv::dotenv().ok();

    let mut service_config = ServiceConfig::from_env();
    if let Some(listen) = args.listen {
        service_config.listen_addr = listen;
    }
    service_config.validate()?;

    let detector_config = DetectorConfig::from_env();
    let gemini_config = GeminiConfig::from_env();

    let (manager, annotator) = if args.service.serves_detection() {
        detector_config.validate()?;
        (
            VisionModelManager::new(&detector_config).await,
            Annotator::from_font_path(detector_config.font_path.as_deref()),
        )
    } else {
        (VisionModelManager::disabled(), Annotator::default())
    };

    let gemini = if args.service.serves_chat() {
        gemini_config.validate()?;
        build_gemini_client(&gemini_config)?
    } else {
        None
    };

    info!("Starting {}", crate::version::get_version_string());
    info!(
        "Service: {:?}, detector: {}, gemini: {}",
        args.service,
        manager.detector_status(),
        if gemini.is_some() { "configured" } else { "disabled" }
    );

    let state = AppState::new(manager, annotator, gemini, service_config.max_upload_bytes);
    start_server(&service_config, args.service, state).await
}

/// A missing key degrades the generative endpoints; anything else is fatal
fn build_gemini_client(config: &GeminiConfig) -> Result<Option<GeminiClient>> {
    match GeminiClient::new(config) {
        Ok(client) => Ok(Some(client)),
        Err(GeminiError::MissingApiKey) => {
            warn!("GEMINI_API_KEY not set; /analyze-objects and /chat will return 500");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
