//! TCP listener and axum service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::controller::Dispatcher;
use crate::error::DispatchError;

use super::convert::{into_axum_response, read_request};

/// Per-request limits and names taken from the configuration.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub cookie_name: String,
    pub max_body_bytes: usize,
}

impl ServerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cookie_name: settings.session.cookie_name.clone(),
            max_body_bytes: settings.server.max_body_bytes,
        }
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    options: Arc<ServerOptions>,
}

/// HTTP server bound to a TCP address.
pub struct HttpServer {
    listener: TcpListener,
    state: AppState,
}

impl HttpServer {
    /// Bind the listening socket.
    pub async fn bind(
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        options: ServerOptions,
    ) -> Result<Self, DispatchError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| DispatchError::Server {
            message: format!("Failed to bind to {}: {}", addr, e),
        })?;

        info!(
            addr = %addr,
            max_body_bytes = options.max_body_bytes,
            "HTTP listener bound"
        );

        Ok(Self {
            listener,
            state: AppState {
                dispatcher,
                options: Arc::new(options),
            },
        })
    }

    /// The bound address (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, DispatchError> {
        self.listener.local_addr().map_err(DispatchError::from)
    }

    /// Serve requests until `shutdown` is notified.
    ///
    /// In-flight requests complete before this returns.
    pub async fn run(self, shutdown: Arc<Notify>) -> Result<(), DispatchError> {
        let max_body_bytes = self.state.options.max_body_bytes;
        let router = Router::new()
            .fallback(handle_request)
            .with_state(self.state)
            .layer(DefaultBodyLimit::max(max_body_bytes));

        info!("HTTP server running, waiting for requests...");

        axum::serve(self.listener, router)
            .with_graceful_shutdown(async move {
                shutdown.notified().await;
                info!("Shutdown signal received, stopping listener");
            })
            .await
            .map_err(|e| DispatchError::Server {
                message: format!("HTTP server failed: {}", e),
            })
    }
}

/// Single entry point for every request.
async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let converted = match read_request(
        request,
        &state.options.cookie_name,
        state.options.max_body_bytes,
    )
    .await
    {
        Ok(converted) => converted,
        Err(e) => {
            warn!(method = %method, uri = %uri, error = %e, "Rejected unreadable request");
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    let dispatcher = Arc::clone(&state.dispatcher);
    match tokio::task::spawn_blocking(move || dispatcher.dispatch(converted)).await {
        Ok(response) => {
            debug!(
                method = %method,
                uri = %uri,
                status = response.status().as_u16(),
                "Request completed"
            );
            into_axum_response(response)
        }
        Err(e) => {
            error!(method = %method, uri = %uri, error = %e, "Request task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
