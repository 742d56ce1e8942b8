use drawboard_shared::{ImagePayload, Point, StickyNote, Stroke, Tool};

use crate::state::Item;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen<'a> {
    pub color: &'a str,
    pub width: f64,
    pub tool: Tool,
}

impl<'a> Pen<'a> {
    pub fn of(stroke: &'a Stroke) -> Self {
        Self {
            color: &stroke.color,
            width: stroke.width,
            tool: stroke.tool,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape<'a> {
    Sticky(&'a StickyNote),
    Image(&'a ImagePayload),
}

/// Write-only rendering sink. Implementations never report back.
pub trait Surface {
    fn clear_all(&mut self);
    fn draw_segment(&mut self, from: Point, to: Point, pen: Pen<'_>);
    fn place_shape(&mut self, shape: Shape<'_>);

    /// Called once a full redraw is done. Anything cached for shapes that
    /// were not drawn since the last `clear_all` may be released.
    fn repainted(&mut self) {}
}

pub fn draw_stroke<S: Surface + ?Sized>(surface: &mut S, stroke: &Stroke) {
    let pen = Pen::of(stroke);
    match stroke.points.as_slice() {
        [] => {}
        [only] => surface.draw_segment(*only, *only, pen),
        points => {
            for pair in points.windows(2) {
                surface.draw_segment(pair[0], pair[1], pen);
            }
        }
    }
}

pub fn draw_item<S: Surface + ?Sized>(surface: &mut S, item: &Item) {
    match item {
        Item::Stroke(stroke) => draw_stroke(surface, stroke),
        Item::Image(image) => surface.place_shape(Shape::Image(image)),
        Item::Sticky(note) => surface.place_shape(Shape::Sticky(note)),
    }
}
