use std::any::Any;

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (connection_id, mut rx) = state.hub.connect().await;

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if socket_sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut close_frame = None;

    while let Some(message) = socket_receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(conn = %connection_id, %error, "WS receive failed");
                break;
            }
        };
        match message {
            Message::Text(text) => {
                state.hub.handle_text(connection_id, text.as_str()).await;
            }
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => state.hub.handle_text(connection_id, text).await,
                Err(error) => {
                    tracing::warn!(conn = %connection_id, %error, "dropping non-UTF-8 binary frame");
                }
            },
            Message::Close(frame) => {
                close_frame = frame;
                break;
            }
            _ => {}
        }
    }

    state.hub.disconnect(connection_id).await;
    if let Some(frame) = &close_frame {
        tracing::debug!(
            conn = %connection_id,
            code = frame.code,
            reason = frame.reason.as_str(),
            "WS close frame"
        );
    }
    send_task.abort();
}

/// Answers a panicking handler with a generic 500.
pub fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%details, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}
