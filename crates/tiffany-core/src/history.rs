//! Bounded undo/redo for the page open on the canvas.
//!
//! Both stacks hold full bitmap snapshots, newest first. A snapshot is taken
//! once per edit gesture, before the bitmap is touched. The stacks belong to
//! one editing session and are flushed whenever the canvas switches pages.

use std::collections::VecDeque;

use crate::bitmap::Bitmap;

/// Default number of snapshots kept on each stack.
pub const DEFAULT_UNDO_DEPTH: usize = 5;

/// Two bounded snapshot stacks.
#[derive(Debug, Clone)]
pub struct EditStack {
    undo: VecDeque<Bitmap>,
    redo: VecDeque<Bitmap>,
    depth: usize,
}

impl Default for EditStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl EditStack {
    /// Create an empty stack keeping at most `depth` snapshots per side.
    ///
    /// A depth of zero is treated as one.
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            undo: VecDeque::with_capacity(depth),
            redo: VecDeque::with_capacity(depth),
            depth,
        }
    }

    /// Record the state of `bitmap` before an edit.
    ///
    /// Discards the oldest snapshot on overflow and clears the redo stack.
    pub fn push_snapshot(&mut self, bitmap: &Bitmap) {
        push_bounded(&mut self.undo, bitmap.clone(), self.depth);
        self.redo.clear();
    }

    /// Restore the most recent snapshot into `bitmap`.
    ///
    /// The current contents move to the redo stack. Returns `false` and
    /// leaves `bitmap` untouched when there is nothing to undo.
    pub fn undo(&mut self, bitmap: &mut Bitmap) -> bool {
        swap_top(&mut self.undo, &mut self.redo, bitmap, self.depth)
    }

    /// Re-apply the most recently undone edit. Symmetric to [`Self::undo`].
    pub fn redo(&mut self, bitmap: &mut Bitmap) -> bool {
        swap_top(&mut self.redo, &mut self.undo, bitmap, self.depth)
    }

    /// Restore the most recent snapshot without making it redoable.
    ///
    /// Used to abandon an edit that was never completed.
    pub fn revert(&mut self, bitmap: &mut Bitmap) -> bool {
        match self.undo.pop_front() {
            Some(restored) => {
                *bitmap = restored;
                true
            }
            None => false,
        }
    }

    /// Drop all snapshots.
    pub fn flush(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// The snapshot the next undo would restore.
    pub fn peek(&self) -> Option<&Bitmap> {
        self.undo.front()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Maximum snapshots kept per stack.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

fn push_bounded(stack: &mut VecDeque<Bitmap>, bitmap: Bitmap, depth: usize) {
    stack.push_front(bitmap);
    stack.truncate(depth);
}

fn swap_top(
    from: &mut VecDeque<Bitmap>,
    to: &mut VecDeque<Bitmap>,
    bitmap: &mut Bitmap,
    depth: usize,
) -> bool {
    let Some(restored) = from.pop_front() else {
        return false;
    };
    let current = std::mem::replace(bitmap, restored);
    push_bounded(to, current, depth);
    true
}
