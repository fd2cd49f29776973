use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use streambalance::balance::BalanceResult;
use streambalance::config::{Calibration, Layout, Params};
use streambalance::geometry::GeometryFrame;
use streambalance::pattern::Pattern;
use streambalance::{BalanceError, render};

#[derive(Deserialize)]
struct EvaluateRequest {
    qs: Option<f64>,
    d50: Option<f64>,
    qw: Option<f64>,
    s: Option<f64>,
    width: Option<usize>,
    height: Option<usize>,
}

#[derive(Serialize)]
struct EvaluateResponse {
    balance: BalanceResult,
    pattern: Pattern,
    seed: f64,
    frame: GeometryFrame,
    image: String,
    timings: Vec<TimingEntry>,
    width: usize,
    height: usize,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, BalanceError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn evaluate(req: EvaluateRequest) -> Result<EvaluateResponse, BalanceError> {
    let defaults = Params::default();
    let params = Params::new(
        req.qs.unwrap_or(defaults.qs()),
        req.d50.unwrap_or(defaults.d50()),
        req.qw.unwrap_or(defaults.qw()),
        req.s.unwrap_or(defaults.s()),
    )?;
    let base = Layout::default();
    let layout = Layout::scaled(
        req.width.unwrap_or(base.width),
        req.height.unwrap_or(base.height),
    )?;

    let (eval, timings) = streambalance::recompute(&params, &Calibration::default(), &layout)?;
    let rgba = render::render_frame(&eval.frame, &eval.balance, &layout);
    let image = encode_png(&rgba, layout.width, layout.height)?;

    Ok(EvaluateResponse {
        balance: eval.balance,
        pattern: eval.pattern,
        seed: eval.seed.value(),
        frame: eval.frame,
        image,
        timings: timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect(),
        width: layout.width,
        height: layout.height,
    })
}

async fn evaluate_handler(
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, (StatusCode, String)> {
    let result = tokio::task::spawn_blocking(move || evaluate(req))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(
            e @ (BalanceError::DomainViolation { .. }
            | BalanceError::InvalidArgument { .. }
            | BalanceError::InvalidLayout(_)),
        ) => {
            tracing::warn!(error = %e, "rejected request");
            Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "evaluation failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streambalance=info,server=info")),
        )
        .init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/evaluate", post(evaluate_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!(%addr, "streambalance server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
