use crate::api_errors::AppError;
use crate::config_loader::{AppConfig, CorsConfig};
use crate::errors::{ServiceError, ServiceResult};
use crate::scoring::{FeatureVector, ScoringModel};
use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Immutable state shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub service_name: String,
    pub model: ScoringModel,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, model: ScoringModel) -> Self {
        Self {
            service_name: service_name.into(),
            model,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.service_name.clone(),
            ScoringModel::new(config.model.clone()),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: f64,
}

/// `/predict` body.
///
/// A request with a `Content-Type` must declare JSON. A request without one
/// has its body parsed as JSON anyway.
#[derive(Debug)]
pub struct FeaturePayload(pub FeatureVector);

impl<S> FromRequest<S> for FeaturePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = if req.headers().contains_key(header::CONTENT_TYPE) {
            Json::<FeatureVector>::from_request(req, state).await
        } else {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| AppError::validation(rejection.body_text()))?;
            Json::<FeatureVector>::from_bytes(&bytes)
        };

        let Json(features) = parsed.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "rejected predict payload");
            AppError::from(rejection)
        })?;
        Ok(Self(features))
    }
}

/// Build the router exposing the health check and `/predict`
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/predict", post(predict))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router built from a loaded configuration
pub fn router_from_config(config: &AppConfig) -> ServiceResult<Router> {
    let state = Arc::new(AppState::from_config(config));
    Ok(build_router(state, cors_layer(&config.cors)?))
}

/// CORS layer for the configured origins.
///
/// Methods and headers are always unrestricted. Origins are unrestricted
/// when the list contains `"*"`, which is the default.
pub fn cors_layer(config: &CorsConfig) -> ServiceResult<CorsLayer> {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .allow_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim())
                    .map_err(|_| ServiceError::config(format!("invalid CORS origin: {o:?}")))
            })
            .collect::<ServiceResult<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn health(State(st): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: st.service_name.clone(),
    })
}

async fn predict(
    State(st): State<Arc<AppState>>,
    FeaturePayload(features): FeaturePayload,
) -> Json<ScoreResponse> {
    let score = st.model.evaluate(&features);
    tracing::debug!(
        sst = features.sst,
        elec_cost = features.elec_cost,
        throughput = features.throughput,
        score,
        "scored feature vector"
    );

    Json(ScoreResponse { score })
}
