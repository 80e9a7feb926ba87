//! HTTP server: accept loop and per-request entry point.

use crate::admin_api::route_request;
use crate::dispatch::{dispatch, Dispatch, DispatchRequest};
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Mock server bound to a single address
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl MockServer {
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    /// Bind and serve until the accept loop fails
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("Mock server listening on http://{}", listener.local_addr()?);
        serve(listener, self.state).await
    }
}

/// Serve connections from an already bound listener, one task per connection
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), anyhow::Error> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(req, state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(peer = %peer, "Connection error: {}", e);
            }
        });
    }
}

/// Every request goes through the dispatcher first, then the admin router
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let dispatch_req = DispatchRequest::from_request(&req, &state.dispatch.correlation_header);

    match dispatch(&dispatch_req, &state).await {
        Dispatch::Served(response) => Ok(response),
        Dispatch::PassThrough => Ok(route_request(req, &state).await),
    }
}
