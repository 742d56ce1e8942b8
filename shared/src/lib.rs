use serde::{Deserialize, Serialize};

pub mod protocol;

pub use protocol::{Event, EventKind, Frame, ProtocolError};

pub const MAX_COLOR_LEN: usize = 9;
pub const MIN_SIZE: f64 = 1.0;
pub const MAX_SIZE: f64 = 100.0;

pub const DEFAULT_COLOR: &str = "blue";
pub const DEFAULT_SIZE: f64 = 3.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Sticky,
    Upload,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Pencil, Tool::Eraser, Tool::Sticky, Tool::Upload];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Sticky => "sticky",
            Tool::Upload => "upload",
        }
    }

    pub fn parse(value: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.as_str() == value)
    }

    /// Pencil and eraser are the only tools driven by pointer strokes.
    pub fn draws(self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser)
    }
}

pub fn size_in_range(size: f64) -> bool {
    size.is_finite() && (MIN_SIZE..=MAX_SIZE).contains(&size)
}

pub fn color_fits(color: &str) -> bool {
    color.chars().count() <= MAX_COLOR_LEN
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: String,
    pub size: f64,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: DEFAULT_COLOR.to_string(),
            size: DEFAULT_SIZE,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
    #[serde(default)]
    pub tool: Tool,
}

/// Payload of `mousedown` / `mousemove`. Style is only sent with `mousedown`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PointerPayload {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl PointerPayload {
    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            color: None,
            width: None,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StickyNote {
    pub id: String,
    pub position: Point,
    #[serde(default)]
    pub text: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StickyUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StickyNote {
    pub fn apply(&mut self, update: &StickyUpdate) {
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(text) = &update.text {
            self.text = text.clone();
        }
        if let Some(color) = &update.color {
            self.color = color.clone();
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImagePayload {
    pub data: String,
    pub position: Point,
    pub dimensions: Dimensions,
}
