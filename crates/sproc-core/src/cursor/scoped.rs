//! Scoped ownership of one invocation's cursor

use crate::ResultCursor;
use std::ops::{Deref, DerefMut};

/// Owns a cursor for the lifetime of one invocation and releases it exactly
/// once, whichever way the invocation ends.
///
/// ```ignore
/// let mut scoped = ScopedCursor::new(cursor);
/// let rows = CursorReader::new(&mut *scoped, token).to_list::<Model>()?;
/// scoped.close(); // or let it drop, including on `?` and cancellation
/// ```
#[derive(Debug)]
pub struct ScopedCursor<C: ResultCursor> {
    cursor: C,
    released: bool,
}

impl<C: ResultCursor> ScopedCursor<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            released: false,
        }
    }

    /// Release now instead of at drop
    pub fn close(mut self) {
        self.release_once();
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.cursor.release();
            tracing::trace!("cursor released");
        }
    }
}

impl<C: ResultCursor> Deref for ScopedCursor<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.cursor
    }
}

impl<C: ResultCursor> DerefMut for ScopedCursor<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: ResultCursor> Drop for ScopedCursor<C> {
    fn drop(&mut self) {
        self.release_once();
    }
}
