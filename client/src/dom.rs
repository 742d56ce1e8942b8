use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, MouseEvent, Window,
};

use drawboard_shared::{Point, ToolState};

use crate::error::ClientError;
use crate::state::UiState;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, ClientError> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| ClientError::MissingElement(id.to_string()))?;
    element
        .dyn_into::<T>()
        .map_err(|_| ClientError::WrongElementType(id.to_string()))
}

/// Handles to the chrome the whiteboard reads from and mirrors into.
pub struct Chrome {
    pub color_input: HtmlInputElement,
    pub size_input: HtmlInputElement,
    pub tool_buttons: Vec<(drawboard_shared::Tool, HtmlButtonElement)>,
    pub hamburger: HtmlButtonElement,
    pub tool_panel: HtmlElement,
    pub clear_button: HtmlButtonElement,
    pub undo_button: HtmlButtonElement,
    pub redo_button: HtmlButtonElement,
    pub upload_input: HtmlInputElement,
    pub status: HtmlElement,
}

impl Chrome {
    pub fn from_document(document: &Document) -> Result<Self, ClientError> {
        let tool_buttons = drawboard_shared::Tool::ALL
            .into_iter()
            .map(|tool| -> Result<_, ClientError> {
                Ok((tool, get_element(document, tool.as_str())?))
            })
            .collect::<Result<Vec<_>, ClientError>>()?;
        Ok(Self {
            color_input: get_element(document, "color")?,
            size_input: get_element(document, "size")?,
            tool_buttons,
            hamburger: get_element(document, "hamburger")?,
            tool_panel: get_element(document, "toolPanel")?,
            clear_button: get_element(document, "clear")?,
            undo_button: get_element(document, "undo")?,
            redo_button: get_element(document, "redo")?,
            upload_input: get_element(document, "imageInput")?,
            status: get_element(document, "status")?,
        })
    }

    /// Mirrors tool state and menu visibility, which peers may have changed.
    pub fn sync(&self, tools: &ToolState, ui: &UiState) {
        for (tool, button) in &self.tool_buttons {
            let pressed = if *tool == tools.tool { "true" } else { "false" };
            let _ = button.set_attribute("aria-pressed", pressed);
        }
        if self.color_input.value() != tools.color {
            self.color_input.set_value(&tools.color);
        }
        let size = tools.size.to_string();
        if self.size_input.value() != size {
            self.size_input.set_value(&size);
        }
        let _ = self
            .tool_panel
            .class_list()
            .toggle_with_force("open", ui.menu_open);
    }

    pub fn set_status(&self, state: &str, text: &str) {
        let _ = self.status.set_attribute("data-state", state);
        self.status.set_text_content(Some(text));
    }
}

pub fn resize_canvas(window: &Window, canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
    let rect = canvas.get_bounding_client_rect();
    let dpr = window.device_pixel_ratio();
    canvas.set_width((rect.width() * dpr) as u32);
    canvas.set_height((rect.height() * dpr) as u32);
    let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    );
    point.is_finite().then_some(point)
}
