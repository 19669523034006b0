//! End-to-end checkout demo: generate a qrcode, send the payer to the
//! checkout page, and look the transaction up on the callback.
//!
//! Needs the `GUHEMBA_*` variables in the environment (or a `.env` file).

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use env_logger::Env;
use log::{error, info};

use guhemba::gateway::{CallbackParams, GatewayClient, MemorySession, Merchant, PendingPayment};

#[derive(Clone)]
struct AppState {
    client: Arc<GatewayClient>,
    // A single shared session; a real application uses its framework's
    // per-user session here.
    session: Arc<MemorySession>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let merchant = match Merchant::from_env() {
        Ok(merchant) => merchant,
        Err(e) => {
            error!("Failed to load Guhemba credentials: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        client: Arc::new(GatewayClient::try_new(merchant)?),
        session: Arc::new(MemorySession::new()),
    };

    let app = Router::new()
        .route("/qrcode/{amount}", post(handle_qrcode))
        .route("/pay/{slug}", get(handle_pay))
        .route("/callback", get(handle_callback))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    info!("Checkout demo listening on 127.0.0.1:3000");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_qrcode(
    State(state): State<AppState>,
    Path(amount): Path<u64>,
) -> impl IntoResponse {
    let outcome = state
        .client
        .generate_qrcode(amount, PendingPayment::new(format!("order-{amount}")))
        .await;
    outcome.payment
}

async fn handle_pay(State(state): State<AppState>, Path(slug): Path<String>) -> impl IntoResponse {
    state
        .client
        .redirect(&slug, "order-1", state.session.as_ref())
}

async fn handle_callback(
    State(state): State<AppState>,
    Query(callback): Query<CallbackParams>,
) -> impl IntoResponse {
    state
        .client
        .transaction(&callback, state.session.as_ref())
        .await
}
