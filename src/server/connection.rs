// Connection handling module
// Serves a single TCP connection over HTTP/1.1

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::header::{HeaderValue, SERVER};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::api;
use crate::config::AppState;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// The connection is bounded by `performance.read_timeout`; every response
/// carries the configured `Server` header and, when enabled, an access line.
///
/// # Arguments
///
/// * `stream` - The accepted TCP stream
/// * `peer_addr` - The peer's socket address, used for logging
/// * `state` - Shared application state
pub fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = Duration::from_secs(state.config.performance.read_timeout);
        let server_name = HeaderValue::from_str(&state.config.http.server_name).ok();

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let service = service_fn(move |req| {
            let state = Arc::clone(&state);
            let server_name = server_name.clone();
            async move {
                let started = Instant::now();
                let method = req.method().to_string();
                let path = req.uri().path().to_string();
                let access_log = state.config.logging.access_log;

                let mut resp = api::handle_request(req, state).await?;
                if let Some(name) = server_name {
                    resp.headers_mut().insert(SERVER, name);
                }
                if access_log {
                    logger::log_access(
                        &peer_addr,
                        &method,
                        &path,
                        resp.status().as_u16(),
                        started.elapsed(),
                    );
                }
                Ok::<_, std::convert::Infallible>(resp)
            }
        });

        let conn = builder.serve_connection(io, service);
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }
    });
}
