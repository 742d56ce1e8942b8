use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use tracing_wasm::WASMLayerConfigBuilder;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event as DomEvent, EventTarget, FileReader, HtmlCanvasElement,
    HtmlImageElement, KeyboardEvent, MouseEvent, PointerEvent, ProgressEvent, Window,
};

use drawboard_shared::{
    Dimensions, Event, ImagePayload, Point, PointerPayload, StickyNote, StickyUpdate, Tool,
};

use crate::dom::{event_to_point, get_element, resize_canvas, Chrome};
use crate::error::ClientError;
use crate::render::{CanvasSurface, STICKY_HEIGHT, STICKY_WIDTH};
use crate::router::{Origin, Whiteboard};
use crate::util::make_sticky_id;
use crate::ws::{connect_ws, WsEvent, WsSender};

const STICKY_COLOR: &str = "#fff59d";
const IMAGE_ORIGIN: Point = Point { x: 24.0, y: 24.0 };
const MAX_IMAGE_EDGE: f64 = 320.0;
/// Browser console verbosity. Dropped relay frames log at `warn`, ignored
/// pointer and sticky events at `debug`.
const LOG_LEVEL: tracing::Level = tracing::Level::DEBUG;

type Board = Whiteboard<CanvasSurface, WsSender>;

struct App {
    board: Board,
    chrome: Chrome,
}

impl App {
    fn dispatch(&mut self, event: Event) {
        self.board.dispatch(event, Origin::Local);
        self.sync();
    }

    fn sync(&self) {
        self.chrome.sync(self.board.tools(), self.board.ui());
    }

    fn on_socket(&mut self, event: WsEvent) {
        match event {
            WsEvent::Open => self.chrome.set_status("open", "Connected"),
            WsEvent::Close => self.chrome.set_status("closed", "Disconnected"),
            WsEvent::Error => self.chrome.set_status("error", "Connection error"),
            WsEvent::Message(text) => {
                self.board.receive(&text);
                self.sync();
            }
        }
    }

    fn sticky_at(&self, point: Point) -> Option<StickyNote> {
        self.board
            .board()
            .sticky_at(point, STICKY_WIDTH, STICKY_HEIGHT)
            .cloned()
    }
}

type Shared = Rc<RefCell<Option<App>>>;

fn with_app<R>(app: &Shared, f: impl FnOnce(&mut App) -> R) -> Option<R> {
    let Ok(mut slot) = app.try_borrow_mut() else {
        tracing::warn!("whiteboard busy, dropping input");
        return None;
    };
    slot.as_mut().map(f)
}

fn listen(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(DomEvent) + 'static,
) -> Result<(), ClientError> {
    let closure = Closure::<dyn FnMut(DomEvent)>::new(handler);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn document_ready(document: &web_sys::Document) -> bool {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .as_deref()
        == Some("complete")
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default_with_config(
        WASMLayerConfigBuilder::new()
            .set_max_level(LOG_LEVEL)
            .build(),
    );

    let window = web_sys::window().ok_or(ClientError::MissingGlobal("window"))?;
    let document = window
        .document()
        .ok_or(ClientError::MissingGlobal("document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready(&document) {
        started.set(true);
        return start_app().map_err(JsValue::from);
    }

    let onload = Closure::<dyn FnMut(DomEvent)>::new(move |_| {
        if started.replace(true) {
            return;
        }
        if let Err(error) = start_app() {
            tracing::error!(%error, "whiteboard failed to start");
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();
    Ok(())
}

fn start_app() -> Result<(), ClientError> {
    let window = web_sys::window().ok_or(ClientError::MissingGlobal("window"))?;
    let document = window
        .document()
        .ok_or(ClientError::MissingGlobal("document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or(ClientError::MissingGlobal("2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| ClientError::WrongElementType("board".to_string()))?;
    resize_canvas(&window, &canvas, &ctx);

    let chrome = Chrome::from_document(&document)?;
    chrome.set_status("connecting", "Connecting...");

    let app: Shared = Rc::new(RefCell::new(None));
    let sender = {
        let app = app.clone();
        connect_ws(&window, move |event| {
            with_app(&app, |app| app.on_socket(event));
        })?
    };

    let board = Whiteboard::new(CanvasSurface::new(canvas.clone(), ctx), sender);
    let app_state = App { board, chrome };
    app_state.sync();
    *app.borrow_mut() = Some(app_state);

    bind_canvas(&window, &canvas, &app)?;
    bind_chrome(&window, &app)?;
    bind_keyboard(&window, &app)?;

    {
        let resize_window = window.clone();
        let app = app.clone();
        listen(&window, "resize", move |_| {
            with_app(&app, |app| {
                let surface = app.board.surface();
                resize_canvas(&resize_window, surface.canvas(), surface.ctx());
                app.board.repaint();
            });
        })?;
    }

    Ok(())
}

fn bind_canvas(
    window: &Window,
    canvas: &HtmlCanvasElement,
    app: &Shared,
) -> Result<(), ClientError> {
    {
        let app = app.clone();
        let window = window.clone();
        let target = canvas.clone();
        listen(canvas, "pointerdown", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let Some(point) = event_to_point(&target, event) else {
                return;
            };
            let tool = with_app(&app, |app| app.board.tools().tool);
            match tool {
                Some(Tool::Sticky) => edit_sticky_at(&window, &app, point),
                Some(Tool::Upload) => {
                    with_app(&app, |app| app.chrome.upload_input.click());
                }
                Some(_) => {
                    let _ = target.set_pointer_capture(event.pointer_id());
                    let down = Event::MouseDown(PointerPayload::at(point));
                    with_app(&app, |app| app.dispatch(down));
                }
                None => {}
            }
        })?;
    }

    {
        let app = app.clone();
        let target = canvas.clone();
        listen(canvas, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let Some(point) = event_to_point(&target, event) else {
                return;
            };
            with_app(&app, |app| {
                if app.board.is_drawing() {
                    app.dispatch(Event::MouseMove(PointerPayload::at(point)));
                }
            });
        })?;
    }

    for name in ["pointerup", "pointercancel", "pointerleave"] {
        let app = app.clone();
        listen(canvas, name, move |_| {
            with_app(&app, |app| {
                if app.board.is_drawing() {
                    app.dispatch(Event::MouseUp(None));
                }
            });
        })?;
    }

    {
        let app = app.clone();
        let target = canvas.clone();
        listen(canvas, "contextmenu", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(point) = event_to_point(&target, mouse) else {
                return;
            };
            with_app(&app, |app| {
                if let Some(note) = app.sticky_at(point) {
                    event.prevent_default();
                    app.dispatch(Event::RemoveSticky(note.id));
                }
            });
        })?;
    }

    Ok(())
}

/// Creates a sticky at `point`, or edits the one already there.
fn edit_sticky_at(window: &Window, app: &Shared, point: Point) {
    let Some(existing) = with_app(app, |app| app.sticky_at(point)) else {
        return;
    };
    let current = existing.as_ref().map(|note| note.text.as_str()).unwrap_or("");
    let Ok(Some(text)) = window.prompt_with_message_and_default("Sticky note", current) else {
        return;
    };
    let event = match existing {
        Some(note) => Event::UpdateSticky(StickyUpdate {
            id: note.id,
            text: Some(text),
            ..StickyUpdate::default()
        }),
        None => Event::AddSticky(StickyNote {
            id: make_sticky_id(),
            position: point,
            text,
            color: STICKY_COLOR.to_string(),
        }),
    };
    with_app(app, |app| app.dispatch(event));
}

fn bind_chrome(window: &Window, app: &Shared) -> Result<(), ClientError> {
    let (tool_buttons, color_input, size_input, hamburger, clear, undo, redo, upload) = {
        let slot = app.borrow();
        let chrome = &slot
            .as_ref()
            .ok_or(ClientError::MissingGlobal("whiteboard"))?
            .chrome;
        (
            chrome.tool_buttons.clone(),
            chrome.color_input.clone(),
            chrome.size_input.clone(),
            chrome.hamburger.clone(),
            chrome.clear_button.clone(),
            chrome.undo_button.clone(),
            chrome.redo_button.clone(),
            chrome.upload_input.clone(),
        )
    };

    for (tool, button) in tool_buttons {
        let app = app.clone();
        listen(&button, "click", move |_| {
            with_app(&app, |app| {
                app.dispatch(Event::ToolChange(tool));
                if tool == Tool::Upload {
                    app.chrome.upload_input.click();
                }
            });
        })?;
    }

    {
        let app = app.clone();
        let input = color_input.clone();
        listen(&color_input, "input", move |_| {
            let color = input.value();
            with_app(&app, |app| app.dispatch(Event::Color(color)));
        })?;
    }

    {
        let app = app.clone();
        let input = size_input.clone();
        listen(&size_input, "input", move |_| {
            let Ok(size) = input.value().trim().parse::<f64>() else {
                return;
            };
            with_app(&app, |app| app.dispatch(Event::Size(size)));
        })?;
    }

    {
        let app = app.clone();
        listen(&hamburger, "click", move |_| {
            with_app(&app, |app| app.dispatch(Event::Hamburger));
        })?;
    }

    {
        let app = app.clone();
        let window = window.clone();
        listen(&clear, "click", move |_| {
            let confirmed = window
                .confirm_with_message("Clear the board for everyone?")
                .unwrap_or(false);
            if confirmed {
                with_app(&app, |app| app.dispatch(Event::Clear));
            }
        })?;
    }

    {
        let app = app.clone();
        listen(&undo, "click", move |_| {
            with_app(&app, |app| app.dispatch(Event::Undo));
        })?;
    }

    {
        let app = app.clone();
        listen(&redo, "click", move |_| {
            with_app(&app, |app| app.dispatch(Event::Redo));
        })?;
    }

    {
        let app = app.clone();
        let input = upload.clone();
        listen(&upload, "change", move |_| {
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            if let Err(error) = read_image(&file, app.clone()) {
                tracing::error!(%error, "image upload failed");
            }
            input.set_value("");
        })?;
    }

    Ok(())
}

fn read_image(file: &web_sys::File, app: Shared) -> Result<(), ClientError> {
    let reader = FileReader::new()?;
    let source = reader.clone();
    let onload = Closure::once_into_js(move |_: ProgressEvent| {
        let Some(data) = source.result().ok().and_then(|value| value.as_string()) else {
            tracing::error!("image upload produced no data URL");
            return;
        };
        if let Err(error) = measure_image(data, app) {
            tracing::error!(%error, "image decode failed");
        }
    });
    reader.set_onload(Some(onload.unchecked_ref()));
    reader.read_as_data_url(file)?;
    Ok(())
}

/// Decodes the data URL once to learn its natural size before sharing it.
fn measure_image(data: String, app: Shared) -> Result<(), ClientError> {
    let element = HtmlImageElement::new()?;
    let probe = element.clone();
    let src = data.clone();
    let onload = Closure::once_into_js(move || {
        let dimensions = fit_image(
            f64::from(probe.natural_width()),
            f64::from(probe.natural_height()),
            MAX_IMAGE_EDGE,
        );
        let image = ImagePayload {
            data,
            position: IMAGE_ORIGIN,
            dimensions,
        };
        with_app(&app, |app| app.dispatch(Event::UploadImage(image)));
    });
    element.set_onload(Some(onload.unchecked_ref()));
    element.set_src(&src);
    Ok(())
}

fn bind_keyboard(window: &Window, app: &Shared) -> Result<(), ClientError> {
    let app = app.clone();
    listen(window, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if !(event.ctrl_key() || event.meta_key()) {
            return;
        }
        let command = match event.key().to_ascii_lowercase().as_str() {
            "z" if event.shift_key() => Event::Redo,
            "z" => Event::Undo,
            "y" => Event::Redo,
            _ => return,
        };
        event.prevent_default();
        with_app(&app, |app| app.dispatch(command));
    })
}

/// Scales `width` x `height` down so neither edge exceeds `max_edge`.
fn fit_image(width: f64, height: f64, max_edge: f64) -> Dimensions {
    if width <= 0.0 || height <= 0.0 {
        return Dimensions {
            width: max_edge,
            height: max_edge,
        };
    }
    let scale = (max_edge / width.max(height)).min(1.0);
    Dimensions {
        width: width * scale,
        height: height * scale,
    }
}
