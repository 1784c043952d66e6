//! Single-slot copy mark.

/// A mark over line-buffer offsets.
///
/// The marked text is `[mark, cursor)` at replay time. Edits made before the
/// mark move it so it keeps pointing at the same byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardMark {
    mark: Option<usize>,
}

impl ClipboardMark {
    /// Creates an inactive mark.
    pub const fn new() -> Self {
        Self { mark: None }
    }

    /// The marked offset, if a mark is active.
    pub fn offset(&self) -> Option<usize> {
        self.mark
    }

    /// Whether a mark is active.
    pub fn is_marked(&self) -> bool {
        self.mark.is_some()
    }

    /// Starts a mark at `cursor` unless one is already active.
    pub fn begin(&mut self, cursor: usize) -> bool {
        if self.mark.is_some() {
            return false;
        }
        self.mark = Some(cursor);
        true
    }

    /// Ends the mark, returning where it started.
    pub fn take(&mut self) -> Option<usize> {
        self.mark.take()
    }

    /// Drops the mark.
    pub fn clear(&mut self) {
        self.mark = None;
    }

    /// A byte was inserted at `cursor` (the pre-insert cursor).
    pub fn note_insert(&mut self, cursor: usize) {
        if let Some(mark) = self.mark.as_mut() {
            if *mark > cursor {
                *mark += 1;
            }
        }
    }

    /// The byte before `cursor` (the pre-delete cursor) was removed.
    pub fn note_delete(&mut self, cursor: usize) {
        if let Some(mark) = self.mark.as_mut() {
            if *mark >= cursor {
                *mark -= 1;
            }
        }
    }
}
