//! Checkpointable cursor over a token stream.
//!
//! The parser explores alternatives by saving the cursor position before an
//! attempt and either committing (keep the consumption) or restoring (throw
//! it away). Checkpoints stack, so attempts nest to any depth; every
//! [`Cursor::save`] must be paired with exactly one [`Cursor::restore`] or
//! [`Cursor::commit`].

use templex_syntax::error::{error, ErrorKind, Result};

/// Forward cursor with a checkpoint stack.
#[derive(Debug, Clone)]
pub struct Cursor<T: Clone> {
    items: Vec<T>,
    offset: usize,
    saves: Vec<usize>,
}

impl<T: Clone> Cursor<T> {
    /// Creates a cursor over a copy of the given items.
    pub fn new(items: &[T]) -> Self {
        Self::from_vec(items.to_vec())
    }

    /// Creates a cursor that takes ownership of the items.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            offset: 0,
            saves: Vec::new(),
        }
    }

    /// Returns the next item and advances past it. Reading past the end is
    /// an `OutOfRange` error, never a panic.
    pub fn next(&mut self) -> Result<T> {
        match self.items.get(self.offset) {
            Some(item) => {
                let item = item.clone();
                self.offset += 1;
                Ok(item)
            }
            None => error(
                ErrorKind::OutOfRange,
                format!("cursor read past the end (offset {})", self.offset),
            ),
        }
    }

    /// The next item without advancing.
    pub fn peek(&self) -> Option<&T> {
        self.items.get(self.offset)
    }

    /// True while items remain.
    pub fn has_next(&self) -> bool {
        self.offset < self.items.len()
    }

    /// Current position; always within `0..=len`.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a checkpoint at the current position.
    pub fn save(&mut self) {
        self.saves.push(self.offset);
    }

    /// Pops the newest checkpoint and rewinds to it.
    pub fn restore(&mut self) -> Result<()> {
        match self.saves.pop() {
            Some(offset) => {
                self.offset = offset;
                Ok(())
            }
            None => error(ErrorKind::OutOfRange, "restore with no checkpoint saved"),
        }
    }

    /// Pops the newest checkpoint without moving, accepting everything
    /// consumed since it was saved.
    pub fn commit(&mut self) -> Result<()> {
        match self.saves.pop() {
            Some(_) => Ok(()),
            None => error(ErrorKind::OutOfRange, "commit with no checkpoint saved"),
        }
    }

    /// Position of the newest checkpoint, if any.
    pub fn last_save(&self) -> Option<usize> {
        self.saves.last().copied()
    }

    /// Number of open checkpoints.
    pub fn depth(&self) -> usize {
        self.saves.len()
    }

    /// Items between two offsets, clamped to the stream bounds.
    pub fn slice(&self, from: usize, to: usize) -> &[T] {
        let to = to.min(self.items.len());
        let from = from.min(to);
        &self.items[from..to]
    }
}
