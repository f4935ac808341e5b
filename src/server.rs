use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};

use crate::data::{GenerateRequest, TimetableConfig, TimetableOutput};
use crate::solver;

async fn generate_handler(
    Json(request): Json<GenerateRequest>,
) -> Result<Json<TimetableOutput>, (StatusCode, String)> {
    match solver::generate_timetable(&request) {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            warn!("Rejected generation request: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn default_config_handler() -> Json<TimetableConfig> {
    Json(TimetableConfig::default())
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/config/default", get(default_config_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
