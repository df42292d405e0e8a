//! Keeps the newest message in view as the transcript grows.

/// Scroll position of the transcript view.
///
/// Created when the widget mounts and owned by its [`ScrollController`];
/// dropped with the widget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    offset: u16,
    max: u16,
}

impl ScrollAnchor {
    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn max(&self) -> u16 {
        self.max
    }
}

#[derive(Debug)]
pub struct ScrollController {
    anchor: ScrollAnchor,
    observed_len: usize,
    pin_pending: bool,
}

impl ScrollController {
    pub fn new(anchor: ScrollAnchor) -> Self {
        Self {
            anchor,
            observed_len: 0,
            pin_pending: false,
        }
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    /// Record the transcript length. Growth schedules a jump to the bottom on
    /// the next layout pass.
    pub fn observe(&mut self, transcript_len: usize) {
        if transcript_len > self.observed_len {
            self.pin_pending = true;
        }
        self.observed_len = transcript_len;
    }

    /// Called while drawing, once the new content height is known. Returns the
    /// offset to render with.
    pub fn layout(&mut self, content_rows: u16, viewport_rows: u16) -> u16 {
        self.anchor.max = content_rows.saturating_sub(viewport_rows);
        if self.pin_pending {
            self.anchor.offset = self.anchor.max;
            self.pin_pending = false;
        } else {
            self.anchor.offset = self.anchor.offset.min(self.anchor.max);
        }
        self.anchor.offset
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.anchor.offset = self.anchor.offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.anchor.offset = self.anchor.offset.saturating_add(rows).min(self.anchor.max);
    }

    pub fn scroll_to_top(&mut self) {
        self.anchor.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.anchor.offset = self.anchor.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_pins_to_bottom_on_next_layout() {
        let mut scroll = ScrollController::new(ScrollAnchor::default());
        scroll.observe(2);
        assert_eq!(scroll.anchor().offset(), 0);

        assert_eq!(scroll.layout(30, 10), 20);
        assert_eq!(scroll.anchor().max(), 20);
    }

    #[test]
    fn test_unchanged_length_keeps_manual_position() {
        let mut scroll = ScrollController::new(ScrollAnchor::default());
        scroll.observe(2);
        scroll.layout(30, 10);

        scroll.scroll_up(5);
        scroll.observe(2);
        assert_eq!(scroll.layout(30, 10), 15);
    }

    #[test]
    fn test_new_message_overrides_manual_scroll() {
        let mut scroll = ScrollController::new(ScrollAnchor::default());
        scroll.observe(2);
        scroll.layout(30, 10);
        scroll.scroll_to_top();

        scroll.observe(3);
        assert_eq!(scroll.layout(34, 10), 24);
    }

    #[test]
    fn test_scroll_down_clamps_to_max() {
        let mut scroll = ScrollController::new(ScrollAnchor::default());
        scroll.layout(12, 10);
        scroll.scroll_down(100);
        assert_eq!(scroll.anchor().offset(), 2);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let mut scroll = ScrollController::new(ScrollAnchor::default());
        scroll.observe(1);
        assert_eq!(scroll.layout(3, 10), 0);
    }
}
