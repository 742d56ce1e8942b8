use axum::extract::ws::Utf8Bytes;
use drawboard_shared::{color_fits, size_in_range, EventKind, Frame, ProtocolError, Tool};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::registry::{ConnectionId, ConnectionRegistry, Outbound};

/// Why a frame was dropped instead of relayed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("missing payload")]
    MissingPayload,
    #[error("payload is not an object")]
    NotAnObject,
    #[error("coordinate `{0}` is missing or not a finite number")]
    BadCoordinate(&'static str),
    #[error("`color` is not a string")]
    ColorNotString,
    #[error("`width` is not a number")]
    WidthNotNumber,
    #[error("unknown tool {0}")]
    UnknownTool(Value),
    #[error("size is not a number")]
    SizeNotNumber,
    #[error("size {0} outside [1, 100]")]
    SizeOutOfRange(f64),
    #[error("color is not a string")]
    NotAString,
    #[error("color longer than 9 characters")]
    ColorTooLong,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("rejected {event}: {reason}")]
    Rejected { event: EventKind, reason: Rejection },
}

/// Checks the shape of high-volume and tool-state events. Structural events
/// (stickies, images, mouseup) and signals are trusted as-is.
pub fn validate(kind: EventKind, data: Option<&Value>) -> Result<(), Rejection> {
    match kind {
        EventKind::MouseDown | EventKind::MouseMove => validate_pointer(data),
        EventKind::ToolChange => {
            let value = data.ok_or(Rejection::MissingPayload)?;
            match value.as_str().and_then(Tool::parse) {
                Some(_) => Ok(()),
                None => Err(Rejection::UnknownTool(value.clone())),
            }
        }
        EventKind::Size => {
            let size = data
                .ok_or(Rejection::MissingPayload)?
                .as_f64()
                .ok_or(Rejection::SizeNotNumber)?;
            if size_in_range(size) {
                Ok(())
            } else {
                Err(Rejection::SizeOutOfRange(size))
            }
        }
        EventKind::Color => {
            let color = data
                .ok_or(Rejection::MissingPayload)?
                .as_str()
                .ok_or(Rejection::NotAString)?;
            if color_fits(color) {
                Ok(())
            } else {
                Err(Rejection::ColorTooLong)
            }
        }
        EventKind::MouseUp
        | EventKind::Hamburger
        | EventKind::Undo
        | EventKind::Redo
        | EventKind::Clear
        | EventKind::AddSticky
        | EventKind::RemoveSticky
        | EventKind::UpdateSticky
        | EventKind::UploadImage => Ok(()),
    }
}

fn validate_pointer(data: Option<&Value>) -> Result<(), Rejection> {
    let object = data
        .ok_or(Rejection::MissingPayload)?
        .as_object()
        .ok_or(Rejection::NotAnObject)?;
    for axis in ["x", "y"] {
        let finite = object
            .get(axis)
            .and_then(Value::as_f64)
            .is_some_and(f64::is_finite);
        if !finite {
            return Err(Rejection::BadCoordinate(axis));
        }
    }
    if object.get("color").is_some_and(|color| !color.is_string()) {
        return Err(Rejection::ColorNotString);
    }
    if object.get("width").is_some_and(|width| !width.is_number()) {
        return Err(Rejection::WidthNotNumber);
    }
    Ok(())
}

/// Maps one inbound frame to the frame every other peer receives. The payload
/// is forwarded untouched; signal events lose any payload they carried.
pub fn route(text: &str) -> Result<(EventKind, Frame), RelayError> {
    let frame = Frame::parse(text)?;
    let kind = EventKind::from_name(&frame.event)
        .ok_or_else(|| ProtocolError::UnknownEvent(frame.event.clone()))?;
    validate(kind, frame.data.as_ref())
        .map_err(|reason| RelayError::Rejected { event: kind, reason })?;
    let data = if kind.carries_payload() {
        frame.data
    } else {
        None
    };
    Ok((kind, Frame::new(kind.broadcast_name(), data)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub kind: EventKind,
    pub recipients: usize,
}

/// Server side of the whiteboard: owns the connection set and fans every
/// valid event out to all peers but its sender.
#[derive(Default)]
pub struct RelayHub {
    registry: ConnectionRegistry,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }

    /// Registers a fresh connection. The receiver yields frames to write to
    /// its socket.
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();
        let peers = self.registry.register(connection_id, tx).await;
        tracing::info!(conn = %connection_id, peers, "WS connected");
        (connection_id, rx)
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) -> usize {
        let peers = self.registry.unregister(connection_id).await;
        tracing::info!(conn = %connection_id, peers, "WS disconnected");
        peers
    }

    pub async fn relay(&self, sender: ConnectionId, text: &str) -> Result<Delivery, RelayError> {
        let (kind, frame) = route(text)?;
        let payload = Utf8Bytes::from(frame.to_text()?);
        let recipients = self.registry.broadcast_except(sender, payload).await;
        Ok(Delivery { kind, recipients })
    }

    /// Relays and logs the outcome. Nothing is ever reported back to the
    /// sender.
    pub async fn handle_text(&self, sender: ConnectionId, text: &str) {
        match self.relay(sender, text).await {
            Ok(delivery) => {
                tracing::debug!(
                    conn = %sender,
                    event = %delivery.kind,
                    recipients = delivery.recipients,
                    "relayed"
                );
            }
            Err(RelayError::Protocol(ProtocolError::UnknownEvent(name))) => {
                tracing::debug!(conn = %sender, event = %name, "ignoring unknown event");
            }
            Err(RelayError::Rejected { event, reason }) => {
                tracing::warn!(conn = %sender, %event, %reason, "dropping invalid event");
            }
            Err(error) => {
                tracing::warn!(conn = %sender, %error, "dropping malformed frame");
            }
        }
    }
}
