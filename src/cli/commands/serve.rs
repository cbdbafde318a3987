//! HTTP API server for integration with other systems.
//!
//! Provides a REST endpoint that turns a transcript into a study kit.

use crate::cli::Output;
use crate::config::Settings;
use crate::kit::{KitOptions, PipelineResult, SourceKind, Transcript};
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    defaults: KitOptions,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_settings(&settings)?;

    let state = Arc::new(AppState {
        orchestrator,
        defaults: settings.generation.clone(),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Studykit API Server");
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Health", "GET  /health");
    Output::kv("Generate", "POST /generate");
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .layer(cors)
        .with_state(state)
}

// === Request Types ===

#[derive(Deserialize)]
struct GenerateRequest {
    transcript: String,
    #[serde(default)]
    source: SourceKind,
    /// Overrides the server defaults when present.
    #[serde(default)]
    options: Option<KitOptions>,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate(State(state): State<Arc<AppState>>, Json(req): Json<GenerateRequest>) -> impl IntoResponse {
    let transcript = Transcript::new(req.transcript, req.source);
    let options = req.options.unwrap_or_else(|| state.defaults.clone());

    let result: PipelineResult = state.orchestrator.generate_kit(&transcript, &options).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ContentProvider, PrimaryProvider, SecondaryProvider, SequenceSelector, TextGenerator, TransportError};
    use crate::config::{Prompts, ProviderConfig, RetryConfig};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn generate(&self, _endpoint: &str, _prompt: &str) -> std::result::Result<String, TransportError> {
            Err(TransportError::Status(503))
        }
    }

    fn offline_state() -> Arc<AppState> {
        let mut config = ProviderConfig::from_settings_with(&Settings::default(), |_| None);
        config.secondary.retry = RetryConfig {
            max_attempts: 1,
            backoff_unit: Duration::ZERO,
        };
        let primary: Arc<dyn ContentProvider> =
            Arc::new(PrimaryProvider::new(&config.primary, Prompts::default()).unwrap());
        let secondary: Arc<dyn ContentProvider> = Arc::new(SecondaryProvider::with_transport(
            Arc::new(Offline),
            Arc::new(SequenceSelector::new(vec![0])),
            &config.secondary,
            Prompts::default(),
        ));

        Arc::new(AppState {
            orchestrator: Orchestrator::with_providers(primary, secondary, config.max_transcript_chars),
            defaults: KitOptions::default(),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_offline() {
        let request = GenerateRequest {
            transcript: "Mitochondria produce energy for the cell. Ribosomes build proteins.".to_string(),
            source: SourceKind::Text,
            options: Some(KitOptions {
                num_questions: 1,
                ..Default::default()
            }),
        };

        let response = generate(State(offline_state()), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["quiz"]["quiz"].as_array().unwrap().len(), 1);
        assert_eq!(json["resources"]["resources"].as_array().unwrap().len(), 3);
        assert!(json["error"].is_null());
    }

    #[tokio::test]
    async fn test_generate_empty_transcript() {
        let request = GenerateRequest {
            transcript: "   ".to_string(),
            source: SourceKind::Text,
            options: None,
        };

        let response = generate(State(offline_state()), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to process input: No valid transcript");
    }
}
