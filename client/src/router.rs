use drawboard_shared::{
    color_fits, size_in_range, Event, Frame, ImagePayload, PointerPayload, StickyNote,
    StickyUpdate, Stroke, Tool, ToolState,
};

use crate::history::{Action, History};
use crate::state::{Board, DrawMode, Item, UiState};
use crate::surface::{draw_item, draw_stroke, Pen, Shape, Surface};

/// Where a command came from. Only local commands are sent to the relay,
/// which keeps remote events from echoing back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// Outbound side of the relay connection.
pub trait Emitter {
    fn emit(&mut self, event: &Event);
}

/// Client-side whiteboard: routes local input and relay events to their
/// handlers, owns tool state, the draw-state machines and the undo history.
pub struct Whiteboard<S, E> {
    surface: S,
    emitter: E,
    tools: ToolState,
    ui: UiState,
    board: Board,
    history: History,
    local: DrawMode,
    remote: DrawMode,
}

impl<S: Surface, E: Emitter> Whiteboard<S, E> {
    pub fn new(surface: S, emitter: E) -> Self {
        Self {
            surface,
            emitter,
            tools: ToolState::default(),
            ui: UiState::default(),
            board: Board::default(),
            history: History::default(),
            local: DrawMode::Idle,
            remote: DrawMode::Idle,
        }
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_drawing(&self) -> bool {
        self.local.is_drawing()
    }

    pub fn is_remote_drawing(&self) -> bool {
        self.remote.is_drawing()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Handles one text frame from the relay. Unknown events are ignored.
    pub fn receive(&mut self, text: &str) {
        let event = Frame::parse(text).and_then(Event::from_broadcast_frame);
        match event {
            Ok(Some(event)) => self.dispatch(event, Origin::Remote),
            Ok(None) => tracing::trace!("ignoring unknown relay event"),
            Err(error) => tracing::warn!(%error, "dropping undecodable relay frame"),
        }
    }

    pub fn dispatch(&mut self, event: Event, origin: Origin) {
        match event {
            Event::MouseDown(payload) => self.pointer_down(payload, origin),
            Event::MouseMove(payload) => self.pointer_move(payload, origin),
            Event::MouseUp(stroke) => self.pointer_up(stroke, origin),
            Event::ToolChange(tool) => self.set_tool(tool, origin),
            Event::Size(size) => self.set_size(size, origin),
            Event::Color(color) => self.set_color(color, origin),
            Event::Hamburger => self.toggle_menu(origin),
            Event::Undo => self.undo(origin),
            Event::Redo => self.redo(origin),
            Event::Clear => self.clear(origin),
            Event::AddSticky(note) => self.add_sticky(note, origin),
            Event::RemoveSticky(id) => self.remove_sticky(id, origin),
            Event::UpdateSticky(update) => self.update_sticky(update, origin),
            Event::UploadImage(image) => self.place_image(image, origin),
        }
    }

    fn emit(&mut self, origin: Origin, event: Event) {
        if origin == Origin::Local {
            self.emitter.emit(&event);
        }
    }

    fn pointer_down(&mut self, payload: PointerPayload, origin: Origin) {
        let point = payload.point();
        if !point.is_finite() {
            return;
        }
        let stroke = match origin {
            Origin::Local => {
                if !self.tools.tool.draws() {
                    return;
                }
                Stroke {
                    points: vec![point],
                    color: self.tools.color.clone(),
                    width: self.tools.size,
                    tool: self.tools.tool,
                }
            }
            // Style embedded by the sender wins over our own.
            Origin::Remote => Stroke {
                points: vec![point],
                color: payload.color.unwrap_or_else(|| self.tools.color.clone()),
                width: payload.width.unwrap_or(self.tools.size),
                tool: self.tools.tool,
            },
        };
        self.surface.draw_segment(point, point, Pen::of(&stroke));
        let down = PointerPayload {
            x: point.x,
            y: point.y,
            color: Some(stroke.color.clone()),
            width: Some(stroke.width),
        };
        *self.stream(origin) = DrawMode::Drawing(stroke);
        self.emit(origin, Event::MouseDown(down));
    }

    fn pointer_move(&mut self, payload: PointerPayload, origin: Origin) {
        let point = payload.point();
        if !point.is_finite() {
            return;
        }
        let stream = match origin {
            Origin::Local => &mut self.local,
            Origin::Remote => &mut self.remote,
        };
        let Some((from, to)) = stream.extend(point) else {
            return;
        };
        if let Some(stroke) = stream.stroke() {
            self.surface.draw_segment(from, to, Pen::of(stroke));
        }
        self.emit(origin, Event::MouseMove(PointerPayload::at(point)));
    }

    fn pointer_up(&mut self, closing: Option<Stroke>, origin: Origin) {
        let stroke = match (self.stream(origin).finish(), origin) {
            (Some(stroke), _) => stroke,
            // Joined mid-stroke: take the sender's copy if it sent one.
            (None, Origin::Remote) => match closing {
                Some(stroke) if !stroke.points.is_empty() => {
                    draw_stroke(&mut self.surface, &stroke);
                    stroke
                }
                _ => return,
            },
            (None, Origin::Local) => return,
        };
        self.board.push(Item::Stroke(stroke.clone()));
        self.history.record(Action::Stroke(stroke.clone()));
        self.emit(origin, Event::MouseUp(Some(stroke)));
    }

    fn stream(&mut self, origin: Origin) -> &mut DrawMode {
        match origin {
            Origin::Local => &mut self.local,
            Origin::Remote => &mut self.remote,
        }
    }

    fn set_tool(&mut self, tool: Tool, origin: Origin) {
        self.tools.tool = tool;
        self.emit(origin, Event::ToolChange(tool));
    }

    fn set_size(&mut self, size: f64, origin: Origin) {
        if !size_in_range(size) {
            tracing::warn!(size, "ignoring brush size out of range");
            return;
        }
        self.tools.size = size;
        self.emit(origin, Event::Size(size));
    }

    fn set_color(&mut self, color: String, origin: Origin) {
        if !color_fits(&color) {
            tracing::warn!(%color, "ignoring overlong color");
            return;
        }
        self.tools.color = color.clone();
        self.emit(origin, Event::Color(color));
    }

    fn toggle_menu(&mut self, origin: Origin) {
        self.ui.menu_open = !self.ui.menu_open;
        self.emit(origin, Event::Hamburger);
    }

    /// Remote undo pops our own stack: the signal carries no target.
    fn undo(&mut self, origin: Origin) {
        if self.history.undo(&mut self.board) {
            self.repaint();
            self.emit(origin, Event::Undo);
        }
    }

    fn redo(&mut self, origin: Origin) {
        if self.history.redo(&mut self.board) {
            self.repaint();
            self.emit(origin, Event::Redo);
        }
    }

    fn clear(&mut self, origin: Origin) {
        self.board.clear();
        self.history.clear();
        self.local.cut_to_last();
        self.remote.cut_to_last();
        self.surface.clear_all();
        self.surface.repainted();
        self.emit(origin, Event::Clear);
    }

    fn add_sticky(&mut self, note: StickyNote, origin: Origin) {
        let replaced = self.board.upsert_sticky(note.clone());
        if replaced.is_some() {
            self.repaint();
        } else {
            self.surface.place_shape(Shape::Sticky(&note));
        }
        self.history.record(Action::AddSticky {
            note: note.clone(),
            replaced,
        });
        self.emit(origin, Event::AddSticky(note));
    }

    fn remove_sticky(&mut self, id: String, origin: Origin) {
        let Some((index, note)) = self.board.remove_sticky(&id) else {
            tracing::debug!(%id, "no sticky to remove");
            return;
        };
        self.repaint();
        self.history.record(Action::RemoveSticky { index, note });
        self.emit(origin, Event::RemoveSticky(id));
    }

    fn update_sticky(&mut self, update: StickyUpdate, origin: Origin) {
        let Some((before, after)) = self.board.update_sticky(&update) else {
            tracing::debug!(id = %update.id, "no sticky to update");
            return;
        };
        self.repaint();
        self.history.record(Action::UpdateSticky { before, after });
        self.emit(origin, Event::UpdateSticky(update));
    }

    fn place_image(&mut self, image: ImagePayload, origin: Origin) {
        self.surface.place_shape(Shape::Image(&image));
        self.board.push(Item::Image(image.clone()));
        self.history.record(Action::Image(image.clone()));
        self.emit(origin, Event::UploadImage(image));
    }

    /// Redraws the committed board plus any strokes still in progress.
    pub fn repaint(&mut self) {
        self.surface.clear_all();
        for item in self.board.items() {
            draw_item(&mut self.surface, item);
        }
        for stream in [&self.local, &self.remote] {
            if let Some(stroke) = stream.stroke() {
                draw_stroke(&mut self.surface, stroke);
            }
        }
        self.surface.repainted();
    }
}

#[cfg(test)]
mod tests {
    use drawboard_shared::{Dimensions, Point};
    use serde_json::json;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Mark {
        Segment {
            from: Point,
            to: Point,
            color: String,
            width: f64,
            tool: Tool,
        },
        Sticky(StickyNote),
        Image(ImagePayload),
    }

    /// Keeps what is currently visible, the way pixels would be.
    #[derive(Default)]
    struct FakeSurface {
        visible: Vec<Mark>,
        clears: usize,
        /// What was visible each time a full redraw finished.
        frames: Vec<Vec<Mark>>,
    }

    impl Surface for FakeSurface {
        fn clear_all(&mut self) {
            self.visible.clear();
            self.clears += 1;
        }

        fn draw_segment(&mut self, from: Point, to: Point, pen: Pen<'_>) {
            self.visible.push(Mark::Segment {
                from,
                to,
                color: pen.color.to_string(),
                width: pen.width,
                tool: pen.tool,
            });
        }

        fn place_shape(&mut self, shape: Shape<'_>) {
            self.visible.push(match shape {
                Shape::Sticky(note) => Mark::Sticky(note.clone()),
                Shape::Image(image) => Mark::Image(image.clone()),
            });
        }

        fn repainted(&mut self) {
            self.frames.push(self.visible.clone());
        }
    }

    #[derive(Default)]
    struct FakeEmitter {
        sent: Vec<Event>,
    }

    impl Emitter for FakeEmitter {
        fn emit(&mut self, event: &Event) {
            self.sent.push(event.clone());
        }
    }

    type TestBoard = Whiteboard<FakeSurface, FakeEmitter>;

    fn whiteboard() -> TestBoard {
        Whiteboard::new(FakeSurface::default(), FakeEmitter::default())
    }

    fn at(x: f64, y: f64) -> PointerPayload {
        PointerPayload::at(Point::new(x, y))
    }

    fn draw_local(board: &mut TestBoard, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        board.dispatch(Event::MouseDown(at(first.0, first.1)), Origin::Local);
        for (x, y) in rest {
            board.dispatch(Event::MouseMove(at(*x, *y)), Origin::Local);
        }
        board.dispatch(Event::MouseUp(None), Origin::Local);
    }

    fn relay(event: Event) -> String {
        event.to_broadcast_frame().unwrap().to_text().unwrap()
    }

    fn sticky(id: &str) -> StickyNote {
        StickyNote {
            id: id.into(),
            position: Point::new(10.0, 10.0),
            text: "hi".into(),
            color: "#fff".into(),
        }
    }

    #[test]
    fn local_stroke_emits_full_gesture() {
        let mut board = whiteboard();
        draw_local(&mut board, &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);

        let sent = &board.emitter().sent;
        assert_eq!(sent.len(), 4);
        assert_eq!(
            sent[0],
            Event::MouseDown(PointerPayload {
                x: 1.0,
                y: 1.0,
                color: Some("blue".into()),
                width: Some(3.0),
            })
        );
        assert_eq!(sent[1], Event::MouseMove(at(2.0, 2.0)));
        match &sent[3] {
            Event::MouseUp(Some(stroke)) => assert_eq!(stroke.points.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!board.is_drawing());
        assert_eq!(board.history().undo_len(), 1);
        // Dot for the press plus one segment per move.
        assert_eq!(board.surface().visible.len(), 3);
    }

    #[test]
    fn remote_events_are_never_re_emitted() {
        let mut board = whiteboard();
        board.receive(&relay(Event::MouseDown(at(1.0, 1.0))));
        board.receive(&relay(Event::MouseMove(at(4.0, 4.0))));
        board.receive(&relay(Event::MouseUp(None)));
        board.receive(&relay(Event::ToolChange(Tool::Eraser)));
        board.receive(&relay(Event::Size(12.0)));
        board.receive(&relay(Event::Color("#00ff00".into())));
        board.receive(&relay(Event::Hamburger));
        board.receive(&relay(Event::AddSticky(sticky("s1"))));
        board.receive(&relay(Event::Undo));
        board.receive(&relay(Event::Clear));

        assert!(board.emitter().sent.is_empty());
    }

    #[test]
    fn remote_stroke_follows_idle_drawing_idle() {
        let mut board = whiteboard();
        assert!(!board.is_remote_drawing());
        board.receive(&relay(Event::MouseDown(at(0.0, 0.0))));
        assert!(board.is_remote_drawing());
        board.receive(&relay(Event::MouseMove(at(5.0, 0.0))));
        assert!(board.is_remote_drawing());
        board.receive(&relay(Event::MouseUp(None)));
        assert!(!board.is_remote_drawing());

        assert_eq!(board.board().items().len(), 1);
        assert_eq!(board.history().undo_len(), 1);
    }

    #[test]
    fn remote_style_is_taken_from_the_event() {
        let mut board = whiteboard();
        board.receive(&relay(Event::MouseDown(PointerPayload {
            x: 1.0,
            y: 1.0,
            color: Some("red".into()),
            width: Some(9.0),
        })));
        board.receive(&relay(Event::MouseMove(at(2.0, 2.0))));

        match board.surface().visible.last().unwrap() {
            Mark::Segment { color, width, .. } => {
                assert_eq!(color, "red");
                assert_eq!(*width, 9.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        // Our own pen is untouched.
        assert_eq!(board.tools().color, "blue");
    }

    #[test]
    fn remote_style_falls_back_to_local_tool_state() {
        let mut board = whiteboard();
        board.dispatch(Event::Color("#123".into()), Origin::Local);
        board.receive(&relay(Event::MouseDown(at(1.0, 1.0))));

        match board.surface().visible.last().unwrap() {
            Mark::Segment { color, width, .. } => {
                assert_eq!(color, "#123");
                assert_eq!(*width, 3.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn remote_mousedown_restarts_an_unfinished_stream() {
        let mut board = whiteboard();
        board.receive(&relay(Event::MouseDown(at(0.0, 0.0))));
        board.receive(&relay(Event::MouseMove(at(1.0, 1.0))));
        board.receive(&relay(Event::MouseDown(at(50.0, 50.0))));
        board.receive(&relay(Event::MouseUp(None)));

        match &board.board().items()[0] {
            Item::Stroke(stroke) => assert_eq!(stroke.points, vec![Point::new(50.0, 50.0)]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut board = whiteboard();
        board.dispatch(Event::MouseMove(at(1.0, 1.0)), Origin::Local);
        board.receive(&relay(Event::MouseMove(at(1.0, 1.0))));
        board.dispatch(Event::MouseUp(None), Origin::Local);

        assert!(board.surface().visible.is_empty());
        assert!(board.emitter().sent.is_empty());
        assert!(board.board().is_empty());
    }

    #[test]
    fn remote_mouseup_uses_sender_stroke_when_idle() {
        let mut board = whiteboard();
        let stroke = Stroke {
            points: vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)],
            color: "red".into(),
            width: 2.0,
            tool: Tool::Pencil,
        };
        board.receive(&relay(Event::MouseUp(Some(stroke.clone()))));
        assert_eq!(board.board().items(), &[Item::Stroke(stroke)]);
    }

    #[test]
    fn sticky_and_upload_tools_do_not_draw() {
        let mut board = whiteboard();
        board.dispatch(Event::ToolChange(Tool::Sticky), Origin::Local);
        board.dispatch(Event::MouseDown(at(1.0, 1.0)), Origin::Local);

        assert!(!board.is_drawing());
        assert_eq!(board.emitter().sent, vec![Event::ToolChange(Tool::Sticky)]);
    }

    #[test]
    fn eraser_strokes_carry_the_tool() {
        let mut board = whiteboard();
        board.dispatch(Event::ToolChange(Tool::Eraser), Origin::Local);
        draw_local(&mut board, &[(1.0, 1.0), (2.0, 2.0)]);

        match board.surface().visible.last().unwrap() {
            Mark::Segment { tool, .. } => assert_eq!(*tool, Tool::Eraser),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn remote_tool_state_is_last_write_wins() {
        let mut board = whiteboard();
        board.dispatch(Event::Size(20.0), Origin::Local);
        board.receive(&relay(Event::Size(40.0)));
        board.receive(&relay(Event::ToolChange(Tool::Upload)));
        board.receive(&relay(Event::Color("#abcdef".into())));

        assert_eq!(
            board.tools(),
            &ToolState {
                tool: Tool::Upload,
                color: "#abcdef".into(),
                size: 40.0,
            }
        );
    }

    #[test]
    fn out_of_range_local_values_are_not_sent() {
        let mut board = whiteboard();
        board.dispatch(Event::Size(150.0), Origin::Local);
        board.dispatch(Event::Color("#0123456789".into()), Origin::Local);

        assert!(board.emitter().sent.is_empty());
        assert_eq!(board.tools(), &ToolState::default());
    }

    #[test]
    fn hamburger_toggles_menu() {
        let mut board = whiteboard();
        board.dispatch(Event::Hamburger, Origin::Local);
        assert!(board.ui().menu_open);
        board.receive(&relay(Event::Hamburger));
        assert!(!board.ui().menu_open);
        assert_eq!(board.emitter().sent, vec![Event::Hamburger]);
    }

    #[test]
    fn undo_then_redo_restores_the_surface() {
        let mut board = whiteboard();
        draw_local(&mut board, &[(0.0, 0.0), (10.0, 10.0)]);
        board.dispatch(Event::AddSticky(sticky("s1")), Origin::Local);
        draw_local(&mut board, &[(20.0, 0.0), (20.0, 10.0), (20.0, 20.0)]);
        board.repaint();
        let before = board.surface().visible.clone();

        board.dispatch(Event::Undo, Origin::Local);
        assert_ne!(board.surface().visible, before);
        board.dispatch(Event::Redo, Origin::Local);

        assert_eq!(board.surface().visible, before);
        let sent = &board.emitter().sent;
        assert_eq!(&sent[sent.len() - 2..], &[Event::Undo, Event::Redo]);
    }

    #[test]
    fn undo_on_empty_history_emits_nothing() {
        let mut board = whiteboard();
        board.dispatch(Event::Undo, Origin::Local);
        board.dispatch(Event::Redo, Origin::Local);
        assert!(board.emitter().sent.is_empty());
    }

    #[test]
    fn remote_undo_pops_the_local_stack() {
        let mut board = whiteboard();
        draw_local(&mut board, &[(0.0, 0.0), (1.0, 1.0)]);
        board.receive(&relay(Event::Undo));

        assert!(board.board().is_empty());
        assert_eq!(board.history().redo_len(), 1);
        board.receive(&relay(Event::Redo));
        assert_eq!(board.board().items().len(), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut board = whiteboard();
        draw_local(&mut board, &[(0.0, 0.0), (1.0, 1.0)]);
        board.dispatch(Event::Undo, Origin::Local);
        board.dispatch(Event::AddSticky(sticky("s1")), Origin::Local);

        for _ in 0..3 {
            board.dispatch(Event::Clear, Origin::Local);
            assert!(board.history().is_empty());
            assert!(board.board().is_empty());
            assert!(board.surface().visible.is_empty());
        }
        board.receive(&relay(Event::Clear));
        assert!(board.history().is_empty());
        assert!(board.surface().visible.is_empty());
    }

    #[test]
    fn clear_mid_stroke_does_not_resurrect_wiped_segments() {
        let mut board = whiteboard();
        let wiped = (Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        board.receive(&relay(Event::MouseDown(at(0.0, 0.0))));
        board.receive(&relay(Event::MouseMove(at(100.0, 100.0))));
        board.dispatch(Event::Clear, Origin::Local);
        board.receive(&relay(Event::MouseMove(at(200.0, 200.0))));
        board.receive(&relay(Event::MouseUp(None)));

        let recorded = match board.board().items() {
            [Item::Stroke(stroke)] => stroke.points.clone(),
            other => panic!("expected one stroke, got {other:?}"),
        };
        assert_eq!(
            recorded,
            vec![Point::new(100.0, 100.0), Point::new(200.0, 200.0)]
        );

        board.dispatch(Event::Undo, Origin::Local);
        board.dispatch(Event::Redo, Origin::Local);
        let resurrected = board.surface().visible.iter().any(|mark| {
            matches!(mark, Mark::Segment { from, to, .. } if (*from, *to) == wiped)
        });
        assert!(!resurrected);
    }

    #[test]
    fn full_redraws_are_announced_to_the_surface() {
        let mut board = whiteboard();
        let image = ImagePayload {
            data: "AAAA".into(),
            position: Point::new(0.0, 0.0),
            dimensions: Dimensions {
                width: 10.0,
                height: 10.0,
            },
        };
        board.dispatch(Event::UploadImage(image), Origin::Local);
        assert!(board.surface().frames.is_empty());

        board.dispatch(Event::Undo, Origin::Local);
        assert_eq!(board.surface().frames.last(), Some(&Vec::new()));

        board.dispatch(Event::Redo, Origin::Local);
        board.dispatch(Event::Clear, Origin::Local);
        assert_eq!(board.surface().frames.len(), 3);
        assert_eq!(board.surface().frames.last(), Some(&Vec::new()));
    }

    #[test]
    fn sticky_lifecycle_is_replicated() {
        let mut board = whiteboard();
        board.receive(&relay(Event::AddSticky(sticky("s1"))));
        board.receive(&relay(Event::UpdateSticky(StickyUpdate {
            id: "s1".into(),
            text: Some("moved".into()),
            position: Some(Point::new(30.0, 40.0)),
            ..StickyUpdate::default()
        })));
        let note = board.board().sticky("s1").unwrap();
        assert_eq!(note.text, "moved");
        assert_eq!(note.position, Point::new(30.0, 40.0));

        board.receive(&relay(Event::RemoveSticky("s1".into())));
        assert!(board.board().sticky("s1").is_none());
        assert!(!board
            .surface()
            .visible
            .iter()
            .any(|mark| matches!(mark, Mark::Sticky(_))));
    }

    #[test]
    fn removing_unknown_sticky_is_a_noop() {
        let mut board = whiteboard();
        board.dispatch(Event::RemoveSticky("ghost".into()), Origin::Local);
        assert!(board.emitter().sent.is_empty());
        assert_eq!(board.history().undo_len(), 0);
    }

    #[test]
    fn uploaded_image_is_placed_and_sent() {
        let mut board = whiteboard();
        let image = ImagePayload {
            data: "data:image/png;base64,AAAA".into(),
            position: Point::new(5.0, 6.0),
            dimensions: Dimensions {
                width: 64.0,
                height: 32.0,
            },
        };
        board.dispatch(Event::UploadImage(image.clone()), Origin::Local);

        assert_eq!(board.surface().visible, vec![Mark::Image(image.clone())]);
        assert_eq!(board.emitter().sent, vec![Event::UploadImage(image)]);
    }

    #[test]
    fn unknown_and_malformed_frames_are_ignored() {
        let mut board = whiteboard();
        board.receive(r#"{"event":"onlaser","data":{"x":1}}"#);
        board.receive("not json");
        board.receive(&json!({"event": "onsize", "data": "big"}).to_string());

        assert_eq!(board.tools(), &ToolState::default());
        assert!(board.surface().visible.is_empty());
    }

    #[test]
    fn repaint_keeps_the_stroke_in_progress() {
        let mut board = whiteboard();
        draw_local(&mut board, &[(0.0, 0.0), (1.0, 1.0)]);
        board.dispatch(Event::MouseDown(at(5.0, 5.0)), Origin::Local);
        board.dispatch(Event::MouseMove(at(6.0, 6.0)), Origin::Local);

        board.receive(&relay(Event::Undo));

        assert!(board.is_drawing());
        assert_eq!(board.surface().visible.len(), 1);
    }
}
