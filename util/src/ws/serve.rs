use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::{sync::mpsc, time};

use super::WebSocketManager;

pub struct WsServerOptions {
    /// Interval between WS-level pings sent to the client.
    pub ws_ping_sec: u64,
    /// Answer `{"type":"ping"}` text frames with a `pong` event.
    pub enable_app_ping: bool,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self {
            ws_ping_sec: 30,
            enable_app_ping: true,
        }
    }
}

/// Pumps every broadcast on `topic` to `socket` until the client goes away.
///
/// The dashboard is read-only: inbound text is only inspected for app-level pings.
pub async fn serve_topic(
    socket: WebSocket,
    manager: WebSocketManager,
    topic: String,
    opts: WsServerOptions,
) {
    let mut rx = manager.subscribe(&topic).await;
    let (mut sink, mut socket_rx) = socket.split();

    // Single writer so the forwarder, pinger and pong replies never interleave frames.
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    let forward_task = {
        let out_tx = out_tx.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            while let Ok(msg) = rx.recv().await {
                if out_tx.send(Message::Text(msg.into())).await.is_err() {
                    tracing::info!("Client disconnected while sending to '{topic}'");
                    break;
                }
            }
        })
    };

    let ping_task = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            loop {
                time::sleep(Duration::from_secs(opts.ws_ping_sec)).await;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    };

    while let Some(Ok(msg)) = socket_rx.next().await {
        match msg {
            Message::Text(text) => {
                if opts.enable_app_ping && is_app_ping(text.as_str()) {
                    let pong = serde_json::json!({
                        "type": "event",
                        "event": "pong",
                        "topic": topic,
                        "payload": {},
                        "ts": Utc::now().to_rfc3339(),
                    });
                    let _ = out_tx.send(Message::Text(pong.to_string().into())).await;
                } else {
                    tracing::debug!(topic = %topic, "Ignoring inbound dashboard message");
                }
            }
            Message::Ping(payload) => {
                let _ = out_tx.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    forward_task.abort();
    ping_task.abort();
    // The receiver lives in the forwarder; wait for it to drop before pruning.
    let _ = forward_task.await;
    drop(out_tx);
    let _ = writer_task.await;
    manager.prune(&topic).await;
    tracing::info!("WS session ended for topic '{topic}'");
}

fn is_app_ping(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Object(map)) if map.get("type").and_then(Value::as_str) == Some("ping")
    )
}
