// Server module entry
// Accept loop, connection serving and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::logger;

pub use listener::create_reusable_listener;
pub use signal::start_signal_handler;

/// Accept connections until `shutdown` is notified.
///
/// Connections already being served keep running on their own tasks.
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => {
                    connection::spawn_connection(stream, peer_addr, Arc::clone(&state));
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            () = shutdown.notified() => {
                logger::log_shutdown();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
    };
    use crate::logger::testing::RecordingLogger;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_state() -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                level: "error".to_string(),
                access_log: false,
                access_log_file: None,
                error_log_file: None,
            },
            http: HttpConfig {
                server_name: "campus-portal-test".to_string(),
                max_body_size: 1024,
            },
            performance: PerformanceConfig {
                keep_alive: false,
                read_timeout: 5,
            },
            site: SiteConfig {
                base_url: "http://localhost/".to_string(),
            },
        };
        Arc::new(AppState::new(config, Arc::new(RecordingLogger::default())))
    }

    async fn exchange(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        String::from_utf8(raw).unwrap()
    }

    #[tokio::test]
    async fn test_serves_login_over_tcp() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run(listener, test_state(), Arc::clone(&shutdown)));

        let body = r#"{"provider":"onid"}"#;
        let request = format!(
            "POST /api/login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let response = exchange(addr, &request).await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("server: campus-portal-test"));
        assert!(response.contains("content-type: application/json; charset=UTF-8"));
        assert!(response.contains(r#""message":"Login with ONID""#));

        shutdown.notify_one();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run(listener, test_state(), Arc::clone(&shutdown)));

        let request = "POST /api/login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
                       Content-Length: 4096\r\n\r\n";
        let response = exchange(addr, request).await;

        assert!(response.starts_with("HTTP/1.1 413"));

        shutdown.notify_one();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_oversized_chunked_body() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run(listener, test_state(), Arc::clone(&shutdown)));

        // No Content-Length: the limit is only hit while collecting
        let chunk = "x".repeat(2000);
        let request = format!(
            "POST /api/login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Transfer-Encoding: chunked\r\n\r\n{:x}\r\n{chunk}\r\n0\r\n\r\n",
            chunk.len()
        );
        let response = exchange(addr, &request).await;

        assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"));
        assert!(response.contains(r#"{"code":413,"message":"Request body exceeds 1024 bytes"}"#));

        shutdown.notify_one();
        server.await.unwrap();
    }
}
