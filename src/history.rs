use serde::{Deserialize, Serialize};

use crate::stroke::Stroke;

/// What happens to the redo stack when a new stroke is committed after an undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedoPolicy {
    /// New work invalidates everything that was undone.
    #[default]
    DiscardOnCommit,
    /// Undone strokes stay redoable and are re-applied on top of newer strokes.
    Retain,
}

/// Undo/redo over whole strokes.
///
/// Both stacks are LIFO: the last element of `committed` is the newest visible
/// stroke and the last element of `undone` is the most recently undone one.
#[derive(Debug, Default)]
pub struct StrokeLog {
    /// Strokes on the canvas, oldest first
    committed: Vec<Stroke>,
    /// Strokes that can be redone, most recently undone last
    undone: Vec<Stroke>,
    policy: RedoPolicy,
    revision: u64,
}

impl StrokeLog {
    pub fn new(policy: RedoPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> RedoPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RedoPolicy) {
        self.policy = policy;
    }

    /// Add a finished stroke on top of the canvas
    pub fn commit(&mut self, stroke: Stroke) {
        self.committed.push(stroke);
        if self.policy == RedoPolicy::DiscardOnCommit && !self.undone.is_empty() {
            log::debug!("Discarding {} redoable strokes", self.undone.len());
            self.undone.clear();
        }
        self.revision += 1;
    }

    /// Move the newest committed stroke onto the redo stack.
    /// Returns false (and changes nothing) when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.committed.pop() {
            Some(stroke) => {
                self.undone.push(stroke);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Move the most recently undone stroke back onto the canvas.
    /// Returns false (and changes nothing) when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(stroke) => {
                self.committed.push(stroke);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    pub fn undone(&self) -> &[Stroke] {
        &self.undone
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Counter bumped on every change to either stack
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        if self.committed.is_empty() && self.undone.is_empty() {
            return;
        }
        self.committed.clear();
        self.undone.clear();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn stroke(x: f32) -> Stroke {
        Stroke::new(crate::color::rgb(0, 0, 0), 2.0, vec![Pos2::new(x, x)]).unwrap()
    }

    #[test]
    fn revision_only_moves_on_change() {
        let mut log = StrokeLog::default();
        assert!(!log.undo());
        assert!(!log.redo());
        assert_eq!(log.revision(), 0);

        log.commit(stroke(1.0));
        assert_eq!(log.revision(), 1);
        assert!(log.undo());
        assert_eq!(log.revision(), 2);
        log.clear();
        assert_eq!(log.revision(), 3);
        log.clear();
        assert_eq!(log.revision(), 3);
    }
}
