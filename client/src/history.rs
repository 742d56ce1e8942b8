use drawboard_shared::{ImagePayload, StickyNote, Stroke};

use crate::state::{Board, Item};

/// A recorded board mutation that can be reverted and re-applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Stroke(Stroke),
    Image(ImagePayload),
    AddSticky {
        note: StickyNote,
        replaced: Option<StickyNote>,
    },
    RemoveSticky {
        index: usize,
        note: StickyNote,
    },
    UpdateSticky {
        before: StickyNote,
        after: StickyNote,
    },
}

impl Action {
    fn revert(&self, board: &mut Board) -> bool {
        match self {
            Action::Stroke(stroke) => board.remove_last(&Item::Stroke(stroke.clone())),
            Action::Image(image) => board.remove_last(&Item::Image(image.clone())),
            Action::AddSticky { note, replaced } => match replaced {
                Some(previous) => board.upsert_sticky(previous.clone()).is_some(),
                None => board.remove_sticky(&note.id).is_some(),
            },
            Action::RemoveSticky { index, note } => {
                board.insert_sticky_at(*index, note.clone());
                true
            }
            Action::UpdateSticky { before, .. } => board.upsert_sticky(before.clone()).is_some(),
        }
    }

    fn apply(&self, board: &mut Board) -> bool {
        match self {
            Action::Stroke(stroke) => {
                board.push(Item::Stroke(stroke.clone()));
                true
            }
            Action::Image(image) => {
                board.push(Item::Image(image.clone()));
                true
            }
            Action::AddSticky { note, .. } => {
                board.upsert_sticky(note.clone());
                true
            }
            Action::RemoveSticky { note, .. } => board.remove_sticky(&note.id).is_some(),
            Action::UpdateSticky { after, .. } => board.upsert_sticky(after.clone()).is_some(),
        }
    }
}

/// Per-client undo and redo stacks. Never shared with peers.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<Action>,
    redo: Vec<Action>,
}

impl History {
    /// Records a new action. Any redo branch is dropped.
    pub fn record(&mut self, action: Action) {
        self.undo.push(action);
        self.redo.clear();
    }

    /// Pops the latest action, reverts it on `board` and moves it onto the
    /// redo stack. Returns whether anything was undone.
    pub fn undo(&mut self, board: &mut Board) -> bool {
        let Some(action) = self.undo.pop() else {
            return false;
        };
        if !action.revert(board) {
            tracing::debug!(?action, "undo target no longer on the board");
        }
        self.redo.push(action);
        true
    }

    pub fn redo(&mut self, board: &mut Board) -> bool {
        let Some(action) = self.redo.pop() else {
            return false;
        };
        if !action.apply(board) {
            tracing::debug!(?action, "redo target no longer on the board");
        }
        self.undo.push(action);
        true
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use drawboard_shared::{Point, StickyUpdate, Tool};

    use super::*;

    fn stroke(x: f64) -> Stroke {
        Stroke {
            points: vec![Point::new(x, 0.0), Point::new(x, 10.0)],
            color: "blue".into(),
            width: 3.0,
            tool: Tool::Pencil,
        }
    }

    fn note(id: &str, text: &str) -> StickyNote {
        StickyNote {
            id: id.into(),
            position: Point::new(5.0, 5.0),
            text: text.into(),
            color: "#fff".into(),
        }
    }

    #[test]
    fn undo_moves_action_to_redo() {
        let mut board = Board::default();
        let mut history = History::default();
        board.push(Item::Stroke(stroke(1.0)));
        history.record(Action::Stroke(stroke(1.0)));

        assert!(history.undo(&mut board));
        assert!(board.is_empty());
        assert_eq!((history.undo_len(), history.redo_len()), (0, 1));

        assert!(history.redo(&mut board));
        assert_eq!(board.items(), &[Item::Stroke(stroke(1.0))]);
        assert_eq!((history.undo_len(), history.redo_len()), (1, 0));
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut board = Board::default();
        let mut history = History::default();
        assert!(!history.undo(&mut board));
        assert!(!history.redo(&mut board));
    }

    #[test]
    fn new_action_drops_redo_branch() {
        let mut board = Board::default();
        let mut history = History::default();
        board.push(Item::Stroke(stroke(1.0)));
        history.record(Action::Stroke(stroke(1.0)));
        history.undo(&mut board);

        board.push(Item::Stroke(stroke(2.0)));
        history.record(Action::Stroke(stroke(2.0)));

        assert_eq!(history.redo_len(), 0);
        assert!(!history.redo(&mut board));
    }

    #[test]
    fn sticky_update_reverts_to_previous_text() {
        let mut board = Board::default();
        let mut history = History::default();
        board.upsert_sticky(note("s1", "hi"));
        let (before, after) = board
            .update_sticky(&StickyUpdate {
                id: "s1".into(),
                text: Some("bye".into()),
                ..StickyUpdate::default()
            })
            .unwrap();
        history.record(Action::UpdateSticky { before, after });

        history.undo(&mut board);
        assert_eq!(board.sticky("s1").unwrap().text, "hi");
        history.redo(&mut board);
        assert_eq!(board.sticky("s1").unwrap().text, "bye");
    }

    #[test]
    fn overwriting_add_restores_the_overwritten_note() {
        let mut board = Board::default();
        let mut history = History::default();
        board.upsert_sticky(note("s1", "first"));
        let replaced = board.upsert_sticky(note("s1", "second"));
        history.record(Action::AddSticky {
            note: note("s1", "second"),
            replaced,
        });

        history.undo(&mut board);
        assert_eq!(board.sticky("s1").unwrap().text, "first");
    }
}
