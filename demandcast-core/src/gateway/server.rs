//! Router, handlers and the serve loop.

use super::GatewayState;
use super::pages::{FormSubmission, PageContext};
use crate::config::ServerConfig;
use crate::error::ForecastError;
use crate::form::SaleInput;
use axum::{
    Form, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Thread-safe shared gateway reference for axum handlers.
pub type SharedGateway = Arc<GatewayState>;

/// Build the router: `/`, `/predict`, `/api/predict` and `/health`.
pub fn router(shared: SharedGateway) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/predict", post(predict_form_handler))
        .route("/api/predict", post(predict_api_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

fn status_for(err: &ForecastError) -> StatusCode {
    if err.is_user_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render_page(gw: &GatewayState, status: StatusCode, page: &PageContext) -> Response {
    match gw.pages().render(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            warn!(error = %e, "Page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Empty form with the configured defaults.
async fn index_handler(State(gw): State<SharedGateway>) -> Response {
    let values = FormSubmission::from_defaults(gw.defaults());
    render_page(&gw, StatusCode::OK, &PageContext::form(values))
}

/// Form post: re-render the form with the prediction or the error.
async fn predict_form_handler(
    State(gw): State<SharedGateway>,
    Form(values): Form<FormSubmission>,
) -> Response {
    let outcome = match values.to_sale_input() {
        Ok(input) => gw.forecast(&input).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(forecast) => render_page(
            &gw,
            StatusCode::OK,
            &PageContext::with_forecast(values, &forecast),
        ),
        Err(e) => {
            warn!(error = %e, "Form prediction failed");
            let status = status_for(&e);
            render_page(&gw, status, &PageContext::with_error(values, e.to_string()))
        }
    }
}

/// JSON prediction endpoint. Every failure answers with `{"error": ...}`.
async fn predict_api_handler(
    State(gw): State<SharedGateway>,
    payload: Result<Json<SaleInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected prediction request body");
            let body = serde_json::json!({ "error": rejection.body_text() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };
    match gw.forecast(&input).await {
        Ok(forecast) => Json(forecast).into_response(),
        Err(e) => {
            warn!(error = %e, "API prediction failed");
            let body = serde_json::json!({ "error": e.to_string() });
            (status_for(&e), Json(body)).into_response()
        }
    }
}

/// Health check endpoint. Does not trigger a model load.
async fn health_handler(State(gw): State<SharedGateway>) -> impl IntoResponse {
    let model = gw.models().loaded().map(|m| m.name().to_string());
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": model.is_some(),
        "model": model,
        "uptime_secs": gw.uptime_secs(),
    });
    Json(body)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
    }
    info!("Shutting down");
}

/// Bind to `config.host:config.port` and serve until ctrl-c.
pub async fn run(gw: SharedGateway, config: &ServerConfig) -> Result<(), std::io::Error> {
    let app = router(gw);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "Serving the forecast form");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
