//! WebSocket transport for the LUT service.
//!
//! Every accepted connection gets its own task. Each text frame is one
//! request; it runs on a blocking worker under a hard timeout and produces
//! exactly one response frame. A shared semaphore bounds how many workers run
//! at once, and a worker keeps its permit until it returns, even after its
//! request has timed out.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_tungstenite::tungstenite::Message;

use crate::config::ServerConfig;
use crate::handlers::{self, RequestError};
use crate::ipc::ServerResponse;

/// Bind and serve until the listener fails.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("LUT service listening on ws://{addr}");

    let limiter = Arc::new(Semaphore::new(config.max_concurrent_requests));
    let config = Arc::new(config);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("accept failed: {e}");
                continue;
            }
        };
        let config = Arc::clone(&config);
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move {
            tracing::info!("WebSocket client connected: {peer}");
            serve_connection(stream, &config, &limiter).await;
            tracing::info!("WebSocket client disconnected: {peer}");
        });
    }
}

async fn serve_connection(stream: TcpStream, config: &Arc<ServerConfig>, limiter: &Arc<Semaphore>) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("WebSocket handshake failed: {e}");
            return;
        }
    };
    let (mut ws_sink, mut ws_source) = ws_stream.split();

    while let Some(frame) = ws_source.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(payload)) => {
                if ws_sink.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("WebSocket read failed: {e}");
                break;
            }
        };

        let response = dispatch(text, Arc::clone(config), Arc::clone(limiter)).await;
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize response: {e}");
                continue;
            }
        };
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Parse, run on a blocking worker with the configured timeout, and frame the result.
///
/// Waiting for a worker permit counts against the timeout.
async fn dispatch(text: String, config: Arc<ServerConfig>, limiter: Arc<Semaphore>) -> ServerResponse {
    let timeout = config.request_timeout;
    let run = async move {
        let permit = match limiter.acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return Err(RequestError::Worker(e.to_string())),
        };
        let work = tokio::task::spawn_blocking(move || -> Result<ServerResponse, RequestError> {
            let _permit = permit;
            let request = handlers::parse_request(&text)?;
            handlers::handle_request(request, &config)
        });
        match work.await {
            Ok(result) => result,
            Err(join) => Err(RequestError::Worker(join.to_string())),
        }
    };

    let result = match tokio::time::timeout(timeout, run).await {
        Ok(result) => result,
        Err(_) => Err(RequestError::Timeout(timeout.as_secs())),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(kind = e.kind(), "request failed: {e}");
            e.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn limiter() -> Arc<Semaphore> {
        Arc::new(Semaphore::new(2))
    }

    #[tokio::test]
    async fn test_dispatch_frames_errors() {
        let config = Arc::new(ServerConfig::from_lookup(|_| None));
        let response = dispatch("[]".to_string(), config, limiter()).await;
        match response {
            ServerResponse::Error { kind, .. } => assert_eq!(kind, "invalid_input"),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_generation() {
        let config = Arc::new(ServerConfig::from_lookup(|_| None));
        let text = r##"{"type":"GenerateLut","data":{"before_data":["#336699"],"after_data":["#3A6A90"]}}"##;
        match dispatch(text.to_string(), config, limiter()).await {
            ServerResponse::LutGenerated { cube, .. } => {
                assert_eq!(cube.lines().count(), 4 + 65 * 65 * 65);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_saturated_workers_time_out_and_release_permits() {
        let config = Arc::new(ServerConfig {
            request_timeout: Duration::from_millis(50),
            ..ServerConfig::from_lookup(|_| None)
        });
        let limiter = limiter();
        let held = Arc::clone(&limiter).acquire_many_owned(2).await.unwrap();

        match dispatch("[]".to_string(), Arc::clone(&config), Arc::clone(&limiter)).await {
            ServerResponse::Error { kind, .. } => assert_eq!(kind, "timeout"),
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(limiter.available_permits(), 0);

        drop(held);
        match dispatch("[]".to_string(), config, Arc::clone(&limiter)).await {
            ServerResponse::Error { kind, .. } => assert_eq!(kind, "invalid_input"),
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(limiter.available_permits(), 2);
    }
}
