use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use drawboard_shared::{ImagePayload, Point, StickyNote, Tool};

use crate::surface::{Pen, Shape, Surface};

pub const STICKY_WIDTH: f64 = 180.0;
pub const STICKY_HEIGHT: f64 = 140.0;
const STICKY_PADDING: f64 = 10.0;
const STICKY_LINE_HEIGHT: f64 = 18.0;

/// Decoded images keyed by a hash of their source. Entries not drawn since
/// the last frame started are dropped by `sweep`.
#[derive(Debug)]
pub struct ImageCache<T> {
    entries: HashMap<u64, T>,
    drawn: HashSet<u64>,
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            drawn: HashSet::new(),
        }
    }
}

impl<T: Clone> ImageCache<T> {
    pub fn get_or_insert_with(
        &mut self,
        src: &str,
        make: impl FnOnce() -> Option<T>,
    ) -> Option<T> {
        let key = source_key(src);
        self.drawn.insert(key);
        if let Some(entry) = self.entries.get(&key) {
            return Some(entry.clone());
        }
        let entry = make()?;
        self.entries.insert(key, entry.clone());
        Some(entry)
    }

    pub fn start_frame(&mut self) {
        self.drawn.clear();
    }

    pub fn sweep(&mut self) {
        let drawn = &self.drawn;
        self.entries.retain(|key, _| drawn.contains(key));
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn source_key(src: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

/// The browser canvas behind the whiteboard.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: ImageCache<HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            images: ImageCache::default(),
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn image_element(&mut self, src: &str) -> Option<HtmlImageElement> {
        self.images.get_or_insert_with(src, || {
            let element = HtmlImageElement::new().ok()?;
            element.set_src(src);
            Some(element)
        })
    }

    fn draw_image(&mut self, image: &ImagePayload) {
        let src = image_source(&image.data);
        let Some(element) = self.image_element(&src) else {
            tracing::error!("failed to create image element");
            return;
        };
        let Point { x, y } = image.position;
        let (width, height) = (image.dimensions.width, image.dimensions.height);
        if element.complete() && element.natural_width() > 0 {
            let _ = self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(&element, x, y, width, height);
            return;
        }
        let ctx = self.ctx.clone();
        let target = element.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &target, x, y, width, height,
            );
        });
        element.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
    }
}

impl Surface for CanvasSurface {
    fn clear_all(&mut self) {
        // Pending decodes would otherwise paint over the cleared board.
        for element in self.images.values() {
            if !element.complete() {
                element.set_onload(None);
            }
        }
        let _ = self.ctx.save();
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.ctx.restore();
        self.images.start_frame();
    }

    fn repainted(&mut self) {
        self.images.sweep();
    }

    fn draw_segment(&mut self, from: Point, to: Point, pen: Pen<'_>) {
        let composite = if pen.tool == Tool::Eraser {
            "destination-out"
        } else {
            "source-over"
        };
        let _ = self.ctx.set_global_composite_operation(composite);
        if from == to {
            self.ctx.set_fill_style_str(pen.color);
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc(to.x, to.y, pen.width / 2.0, 0.0, std::f64::consts::PI * 2.0);
            self.ctx.fill();
        } else {
            self.ctx.set_stroke_style_str(pen.color);
            self.ctx.set_line_width(pen.width);
            self.ctx.begin_path();
            self.ctx.move_to(from.x, from.y);
            self.ctx.line_to(to.x, to.y);
            self.ctx.stroke();
        }
        let _ = self.ctx.set_global_composite_operation("source-over");
    }

    fn place_shape(&mut self, shape: Shape<'_>) {
        match shape {
            Shape::Sticky(note) => draw_sticky(&self.ctx, note),
            Shape::Image(image) => self.draw_image(image),
        }
    }
}

fn draw_sticky(ctx: &CanvasRenderingContext2d, note: &StickyNote) {
    let Point { x, y } = note.position;
    ctx.set_fill_style_str(&note.color);
    ctx.fill_rect(x, y, STICKY_WIDTH, STICKY_HEIGHT);
    ctx.set_stroke_style_str("rgba(0,0,0,0.25)");
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, STICKY_WIDTH, STICKY_HEIGHT);

    ctx.set_fill_style_str("#1f1f1f");
    ctx.set_font("14px sans-serif");
    for (row, line) in sticky_lines(&note.text).enumerate() {
        let baseline = y + STICKY_PADDING + STICKY_LINE_HEIGHT * (row as f64 + 1.0);
        if baseline > y + STICKY_HEIGHT {
            break;
        }
        let _ = ctx.fill_text(line, x + STICKY_PADDING, baseline);
    }
}

fn sticky_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// Accepts either a data URL or bare base64.
pub fn image_source(data: &str) -> String {
    if data.starts_with("data:") {
        data.to_string()
    } else {
        format!("data:image/png;base64,{data}")
    }
}
