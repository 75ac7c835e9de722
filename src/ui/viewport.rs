//! Scroll window over a list of rows.
//!
//! Used by the editor pane (rows are buffer lines) and the mind-map pane
//! (rows are laid-out nodes).

use std::ops::Range;

/// Visible slice of `total_rows`, `height` rows tall.
///
/// ```
/// use mindmark::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_rows: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_rows: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_rows,
        }
    }

    /// First visible row.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Whether there is no room to draw anything.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Rows currently on screen, clamped to the content.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_rows);
        self.offset.min(end)..end
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    /// Scroll the least amount needed to bring `row` on screen.
    pub const fn ensure_visible(&mut self, row: usize) {
        let height = self.height as usize;
        if height == 0 || row < self.offset {
            self.offset = row;
        } else if row >= self.offset + height {
            self.offset = row + 1 - height;
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_range_short_content() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
    }

    #[test]
    fn test_scroll_down_clamps_to_last_page() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(500);
        assert_eq!(vp.offset(), 76);
        vp.page_up();
        assert_eq!(vp.offset(), 52);
        vp.scroll_up(1_000);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_ensure_visible_scrolls_minimally() {
        let mut vp = Viewport::new(80, 5, 50);
        vp.ensure_visible(7);
        assert_eq!(vp.offset(), 3);
        vp.ensure_visible(4);
        assert_eq!(vp.offset(), 3);
        vp.ensure_visible(1);
        assert_eq!(vp.offset(), 1);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.scroll_down(80);
        vp.set_total_rows(30);
        assert_eq!(vp.offset(), 20);
        vp.resize(80, 40);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_zero_sized_viewport_is_empty() {
        assert!(Viewport::new(0, 10, 5).is_empty());
        assert!(Viewport::new(10, 0, 5).is_empty());
        assert!(!Viewport::new(10, 1, 0).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn scroll_never_exceeds_bounds(
                total in 0..10_000usize,
                height in 1..100u16,
                amount in 0..10_000usize,
            ) {
                let mut vp = Viewport::new(80, height, total);
                vp.scroll_down(amount);
                prop_assert!(vp.offset() <= total.saturating_sub(height as usize));
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end && range.end <= total);
            }

            #[test]
            fn ensure_visible_puts_row_on_screen(
                total in 1..1_000usize,
                height in 1..50u16,
                row_seed in 0..1_000usize,
            ) {
                let mut vp = Viewport::new(80, height, total);
                let row = row_seed % total;
                vp.ensure_visible(row);
                prop_assert!(vp.visible_range().contains(&row));
            }
        }
    }
}
