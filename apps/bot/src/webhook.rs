use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::{config::WebhookConfig, shutdown::ShutdownSignal};

type HmacSha256 = Hmac<Sha256>;

pub const PUSH_PATH: &str = "/onGitHubPush";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("payload signature does not match")]
    Mismatch,
}

/// Check a GitHub `sha256=<hex>` signature over `body`.
pub fn verify_signature(
    secret: &[u8],
    header: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(hex_sig).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Malformed)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[derive(Clone)]
pub struct WebhookState {
    secret: Arc<[u8]>,
    dev: bool,
    signal: ShutdownSignal,
}

impl WebhookState {
    pub fn new(secret: &str, dev: bool, signal: ShutdownSignal) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
            dev,
            signal,
        }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(PUSH_PATH, post(on_github_push))
        .with_state(state)
}

#[instrument(name = "on_github_push", skip_all)]
async fn on_github_push(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(dev = state.dev, bytes = body.len(), "push received");
    let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    if let Err(e) = verify_signature(&state.secret, header, &body) {
        if !state.dev {
            warn!(error = %e, "rejected push");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        warn!(error = %e, "signature check failed, continuing in development mode");
    }

    debug!(payload = %String::from_utf8_lossy(&body), "push payload");

    if state.signal.trigger("push") {
        info!("Exit by push.");
    } else {
        info!("shutdown already in progress");
    }

    "ok".into_response()
}

/// Serve the push endpoint until `signal` fires, then drain for
/// `config.grace` and return.
pub async fn serve(config: &WebhookConfig, signal: ShutdownSignal) -> Result<()> {
    let app = router(WebhookState::new(&config.secret, config.dev, signal.clone()));
    let handle = Handle::new();

    tokio::spawn({
        let handle = handle.clone();
        let grace = config.grace;
        async move {
            let reason = signal.wait().await;
            info!(reason = %reason, grace_secs = grace.as_secs(), "shutting down webhook server");
            handle.graceful_shutdown(Some(grace));
        }
    });

    let served = match &config.tls {
        None => {
            info!(addr = %config.addr, "development server, plain HTTP");
            axum_server::bind(config.addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        Some(tls) => {
            info!(addr = %config.addr, "production server, HTTPS");
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| format!("loading TLS material {:?}, {:?}", tls.cert, tls.key))?;
            axum_server::bind_rustls(config.addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = &served {
        error!(error = ?e, "webhook server failed");
    }
    served.context("webhook server")?;

    info!("webhook server stopped");
    Ok(())
}
