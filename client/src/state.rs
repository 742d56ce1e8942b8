use drawboard_shared::{ImagePayload, Point, StickyNote, Stroke, StickyUpdate};

/// One pointer stream, local or remote.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawMode {
    #[default]
    Idle,
    Drawing(Stroke),
}

impl DrawMode {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawMode::Drawing(_))
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        match self {
            DrawMode::Drawing(stroke) => Some(stroke),
            DrawMode::Idle => None,
        }
    }

    /// Appends to the stroke in progress and returns the segment to render.
    pub fn extend(&mut self, point: Point) -> Option<(Point, Point)> {
        let DrawMode::Drawing(stroke) = self else {
            return None;
        };
        let from = stroke.points.last().copied().unwrap_or(point);
        stroke.points.push(point);
        Some((from, point))
    }

    /// Drops every point but the latest, so a stroke that outlives a clear
    /// keeps going without bringing back what was wiped.
    pub fn cut_to_last(&mut self) {
        if let DrawMode::Drawing(stroke) = self {
            let keep = stroke.points.len().saturating_sub(1);
            stroke.points.drain(..keep);
        }
    }

    pub fn finish(&mut self) -> Option<Stroke> {
        match std::mem::take(self) {
            DrawMode::Drawing(stroke) => Some(stroke),
            DrawMode::Idle => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Stroke(Stroke),
    Image(ImagePayload),
    Sticky(StickyNote),
}

/// Everything committed to the surface, in paint order. Kept so the surface
/// can be repainted after an undo.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    items: Vec<Item>,
}

impl Board {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Removes the most recent item equal to `item`.
    pub fn remove_last(&mut self, item: &Item) -> bool {
        match self.items.iter().rposition(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn sticky(&self, id: &str) -> Option<&StickyNote> {
        self.items.iter().find_map(|item| match item {
            Item::Sticky(note) if note.id == id => Some(note),
            _ => None,
        })
    }

    fn sticky_index(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Sticky(note) if note.id == id))
    }

    /// Topmost sticky whose `width` x `height` box contains `point`.
    pub fn sticky_at(&self, point: Point, width: f64, height: f64) -> Option<&StickyNote> {
        self.stickies()
            .filter(|note| {
                let origin = note.position;
                (origin.x..=origin.x + width).contains(&point.x)
                    && (origin.y..=origin.y + height).contains(&point.y)
            })
            .last()
    }

    pub fn stickies(&self) -> impl Iterator<Item = &StickyNote> {
        self.items.iter().filter_map(|item| match item {
            Item::Sticky(note) => Some(note),
            _ => None,
        })
    }

    /// Inserts or overwrites by id; returns the note that was replaced.
    pub fn upsert_sticky(&mut self, note: StickyNote) -> Option<StickyNote> {
        match self.sticky_index(&note.id) {
            Some(index) => match std::mem::replace(&mut self.items[index], Item::Sticky(note)) {
                Item::Sticky(previous) => Some(previous),
                _ => None,
            },
            None => {
                self.items.push(Item::Sticky(note));
                None
            }
        }
    }

    /// Applies a partial update; returns the note before and after.
    pub fn update_sticky(&mut self, update: &StickyUpdate) -> Option<(StickyNote, StickyNote)> {
        let index = self.sticky_index(&update.id)?;
        let Item::Sticky(note) = &mut self.items[index] else {
            return None;
        };
        let before = note.clone();
        note.apply(update);
        Some((before, note.clone()))
    }

    /// Returns the removed note and the paint position it had.
    pub fn remove_sticky(&mut self, id: &str) -> Option<(usize, StickyNote)> {
        let index = self.sticky_index(id)?;
        match self.items.remove(index) {
            Item::Sticky(note) => Some((index, note)),
            _ => None,
        }
    }

    pub fn insert_sticky_at(&mut self, index: usize, note: StickyNote) {
        if let Some(existing) = self.sticky_index(&note.id) {
            self.items[existing] = Item::Sticky(note);
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, Item::Sticky(note));
    }
}

/// Chrome state the router mirrors between peers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub menu_open: bool,
}

#[cfg(test)]
mod tests {
    use drawboard_shared::Tool;

    use super::*;

    fn note(id: &str, text: &str) -> StickyNote {
        StickyNote {
            id: id.into(),
            position: Point::new(0.0, 0.0),
            text: text.into(),
            color: "#ff0".into(),
        }
    }

    #[test]
    fn extend_renders_from_last_point() {
        let mut mode = DrawMode::Drawing(Stroke {
            points: vec![Point::new(1.0, 1.0)],
            color: "red".into(),
            width: 2.0,
            tool: Tool::Pencil,
        });
        assert_eq!(
            mode.extend(Point::new(2.0, 3.0)),
            Some((Point::new(1.0, 1.0), Point::new(2.0, 3.0)))
        );
        assert_eq!(mode.finish().unwrap().points.len(), 2);
        assert!(!mode.is_drawing());
        assert_eq!(DrawMode::Idle.extend(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn cut_keeps_only_the_pen_position() {
        let mut mode = DrawMode::Drawing(Stroke {
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            color: "red".into(),
            width: 2.0,
            tool: Tool::Pencil,
        });
        mode.cut_to_last();
        assert_eq!(mode.stroke().unwrap().points, vec![Point::new(5.0, 5.0)]);

        let mut idle = DrawMode::Idle;
        idle.cut_to_last();
        assert_eq!(idle, DrawMode::Idle);
    }

    #[test]
    fn colliding_sticky_ids_overwrite() {
        let mut board = Board::default();
        assert_eq!(board.upsert_sticky(note("s1", "a")), None);
        assert_eq!(board.upsert_sticky(note("s1", "b")), Some(note("s1", "a")));
        assert_eq!(board.stickies().count(), 1);
        assert_eq!(board.sticky("s1").unwrap().text, "b");
    }

    #[test]
    fn removed_sticky_returns_to_its_slot() {
        let mut board = Board::default();
        board.upsert_sticky(note("s1", "a"));
        board.upsert_sticky(note("s2", "b"));
        let (index, removed) = board.remove_sticky("s1").unwrap();
        assert_eq!(index, 0);
        board.insert_sticky_at(index, removed);
        assert_eq!(board.items()[0], Item::Sticky(note("s1", "a")));
    }

    #[test]
    fn hit_test_prefers_the_topmost_sticky() {
        let mut board = Board::default();
        board.upsert_sticky(note("low", "a"));
        let mut high = note("high", "b");
        high.position = Point::new(50.0, 50.0);
        board.upsert_sticky(high);

        let hit = board.sticky_at(Point::new(60.0, 60.0), 100.0, 100.0);
        assert_eq!(hit.map(|note| note.id.as_str()), Some("high"));
        let hit = board.sticky_at(Point::new(10.0, 10.0), 100.0, 100.0);
        assert_eq!(hit.map(|note| note.id.as_str()), Some("low"));
        assert!(board.sticky_at(Point::new(500.0, 500.0), 100.0, 100.0).is_none());
    }

    #[test]
    fn update_of_unknown_sticky_is_none() {
        let mut board = Board::default();
        let update = StickyUpdate {
            id: "ghost".into(),
            ..StickyUpdate::default()
        };
        assert!(board.update_sticky(&update).is_none());
    }
}
