use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ImagePayload, PointerPayload, StickyNote, StickyUpdate, Stroke, Tool};

const BROADCAST_PREFIX: &str = "on";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event {0:?}")]
    UnknownEvent(String),
    #[error("event {0} requires a payload")]
    MissingPayload(EventKind),
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        event: EventKind,
        source: serde_json::Error,
    },
}

/// Named events a client may emit. The relay rebroadcasts each one as
/// `on<name>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    ToolChange,
    Size,
    Color,
    Hamburger,
    Undo,
    Redo,
    Clear,
    AddSticky,
    RemoveSticky,
    UpdateSticky,
    UploadImage,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::MouseDown,
        EventKind::MouseMove,
        EventKind::MouseUp,
        EventKind::ToolChange,
        EventKind::Size,
        EventKind::Color,
        EventKind::Hamburger,
        EventKind::Undo,
        EventKind::Redo,
        EventKind::Clear,
        EventKind::AddSticky,
        EventKind::RemoveSticky,
        EventKind::UpdateSticky,
        EventKind::UploadImage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::MouseDown => "mousedown",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseUp => "mouseup",
            EventKind::ToolChange => "toolchange",
            EventKind::Size => "size",
            EventKind::Color => "color",
            EventKind::Hamburger => "hamburger",
            EventKind::Undo => "undo",
            EventKind::Redo => "redo",
            EventKind::Clear => "clear",
            EventKind::AddSticky => "addsticky",
            EventKind::RemoveSticky => "removesticky",
            EventKind::UpdateSticky => "updatesticky",
            EventKind::UploadImage => "uploadimage",
        }
    }

    pub fn broadcast_name(self) -> String {
        format!("{BROADCAST_PREFIX}{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn from_broadcast_name(name: &str) -> Option<EventKind> {
        name.strip_prefix(BROADCAST_PREFIX)
            .and_then(EventKind::from_name)
    }

    pub fn carries_payload(self) -> bool {
        !matches!(
            self,
            EventKind::Hamburger | EventKind::Undo | EventKind::Redo | EventKind::Clear
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One text message on the socket, in either direction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn parse(text: &str) -> Result<Frame, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    MouseDown(PointerPayload),
    MouseMove(PointerPayload),
    /// The closing stroke is informational; peers finalize what they rendered.
    MouseUp(Option<Stroke>),
    ToolChange(Tool),
    Size(f64),
    Color(String),
    Hamburger,
    Undo,
    Redo,
    Clear,
    AddSticky(StickyNote),
    RemoveSticky(String),
    UpdateSticky(StickyUpdate),
    UploadImage(ImagePayload),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MouseDown(_) => EventKind::MouseDown,
            Event::MouseMove(_) => EventKind::MouseMove,
            Event::MouseUp(_) => EventKind::MouseUp,
            Event::ToolChange(_) => EventKind::ToolChange,
            Event::Size(_) => EventKind::Size,
            Event::Color(_) => EventKind::Color,
            Event::Hamburger => EventKind::Hamburger,
            Event::Undo => EventKind::Undo,
            Event::Redo => EventKind::Redo,
            Event::Clear => EventKind::Clear,
            Event::AddSticky(_) => EventKind::AddSticky,
            Event::RemoveSticky(_) => EventKind::RemoveSticky,
            Event::UpdateSticky(_) => EventKind::UpdateSticky,
            Event::UploadImage(_) => EventKind::UploadImage,
        }
    }

    fn payload(&self) -> Result<Option<Value>, serde_json::Error> {
        let value = match self {
            Event::MouseDown(payload) | Event::MouseMove(payload) => serde_json::to_value(payload)?,
            Event::MouseUp(Some(stroke)) => serde_json::to_value(stroke)?,
            Event::MouseUp(None) => Value::Object(Default::default()),
            Event::ToolChange(tool) => serde_json::to_value(tool)?,
            Event::Size(size) => serde_json::to_value(size)?,
            Event::Color(color) => Value::String(color.clone()),
            Event::Hamburger | Event::Undo | Event::Redo | Event::Clear => return Ok(None),
            Event::AddSticky(note) => serde_json::to_value(note)?,
            Event::RemoveSticky(id) => Value::String(id.clone()),
            Event::UpdateSticky(update) => serde_json::to_value(update)?,
            Event::UploadImage(image) => serde_json::to_value(image)?,
        };
        Ok(Some(value))
    }

    /// Frame as emitted by a client, under the plain event name.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        Ok(Frame::new(self.kind().name(), self.payload()?))
    }

    /// Frame as delivered by the relay, under the `on`-prefixed name.
    pub fn to_broadcast_frame(&self) -> Result<Frame, ProtocolError> {
        Ok(Frame::new(self.kind().broadcast_name(), self.payload()?))
    }

    pub fn decode(kind: EventKind, data: Option<Value>) -> Result<Event, ProtocolError> {
        let event = match kind {
            EventKind::MouseDown => Event::MouseDown(required(kind, data)?),
            EventKind::MouseMove => Event::MouseMove(required(kind, data)?),
            EventKind::MouseUp => {
                Event::MouseUp(data.and_then(|value| serde_json::from_value(value).ok()))
            }
            EventKind::ToolChange => Event::ToolChange(required(kind, data)?),
            EventKind::Size => Event::Size(required(kind, data)?),
            EventKind::Color => Event::Color(required(kind, data)?),
            EventKind::Hamburger => Event::Hamburger,
            EventKind::Undo => Event::Undo,
            EventKind::Redo => Event::Redo,
            EventKind::Clear => Event::Clear,
            EventKind::AddSticky => Event::AddSticky(required(kind, data)?),
            EventKind::RemoveSticky => Event::RemoveSticky(required(kind, data)?),
            EventKind::UpdateSticky => Event::UpdateSticky(required(kind, data)?),
            EventKind::UploadImage => Event::UploadImage(required(kind, data)?),
        };
        Ok(event)
    }

    /// Decodes a relay frame. Unknown `on*` names yield `Ok(None)` so newer
    /// peers can add events without breaking older ones.
    pub fn from_broadcast_frame(frame: Frame) -> Result<Option<Event>, ProtocolError> {
        match EventKind::from_broadcast_name(&frame.event) {
            Some(kind) => Event::decode(kind, frame.data).map(Some),
            None => Ok(None),
        }
    }
}

fn required<T: DeserializeOwned>(kind: EventKind, data: Option<Value>) -> Result<T, ProtocolError> {
    let data = data.ok_or(ProtocolError::MissingPayload(kind))?;
    serde_json::from_value(data).map_err(|source| ProtocolError::InvalidPayload {
        event: kind,
        source,
    })
}
