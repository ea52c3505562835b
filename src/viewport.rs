use std::ops::Range;

/// Cursor and scroll window over a list of `len` rows, `height` rows tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cursor: usize,
    offset: usize,
    height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_HEIGHT)
    }
}

pub const DEFAULT_HEIGHT: usize = 20;

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            height: height.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_height(&mut self, height: usize, len: usize) {
        self.height = height.max(1);
        self.clamp(len);
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.clamp(len);
            return;
        }
        let last = (len - 1) as isize;
        let next = (self.cursor as isize).saturating_add(delta).clamp(0, last);
        self.cursor = next as usize;
        self.scroll_to_cursor(len);
    }

    pub fn page_down(&mut self, len: usize) {
        self.move_by(self.page_step(), len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.move_by(-self.page_step(), len);
    }

    pub fn home(&mut self, len: usize) {
        self.cursor = 0;
        self.clamp(len);
    }

    pub fn end(&mut self, len: usize) {
        self.cursor = len.saturating_sub(1);
        self.clamp(len);
    }

    /// Scrolls so the window starts at page `page` (zero-based) and puts the
    /// cursor on its first row.
    pub fn jump_to_page(&mut self, page: usize, len: usize) {
        let max_offset = len.saturating_sub(self.height);
        self.offset = page.saturating_mul(self.height).min(max_offset);
        self.cursor = self.offset;
        self.clamp(len);
    }

    /// Puts the cursor on `position` when the previously selected row is still
    /// visible, otherwise keeps the old cursor index within bounds.
    pub fn reselect(&mut self, position: Option<usize>, len: usize) {
        if let Some(position) = position {
            self.cursor = position;
        }
        self.clamp(len);
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        if self.cursor >= len {
            self.cursor = len - 1;
        }
        self.scroll_to_cursor(len);
    }

    /// Rows to hand to the rendering surface.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        let end = start.saturating_add(self.height).min(len);
        start..end
    }

    fn page_step(&self) -> isize {
        isize::try_from(self.height).unwrap_or(isize::MAX)
    }

    fn scroll_to_cursor(&mut self, len: usize) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset.saturating_add(self.height) {
            self.offset = self.cursor + 1 - self.height;
        }
        let max_offset = len.saturating_sub(self.height);
        self.offset = self.offset.min(max_offset);
    }
}
