use crate::market::objects::{PricePoint, HISTORY_CAPACITY};

pub const MIN_VIEW_SIZE: usize = 5;
pub const DEFAULT_VIEW_SIZE: usize = 20;
pub const VIEW_STEP: usize = 5;

/// Per-card zoom and pan state over an instrument's history. Entirely
/// display-local: it never touches the simulation loop and is reset
/// independently of it.
///
/// `view_offset` counts points back from the live edge; zero means the
/// visible slice ends at the most recent point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    view_size: usize,
    view_offset: usize,
    capacity: usize,
}

impl ViewWindow {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ViewWindow {
            view_size: DEFAULT_VIEW_SIZE.min(capacity),
            view_offset: 0,
            capacity,
        }
    }

    pub fn view_size(&self) -> usize {
        self.view_size
    }

    pub fn view_offset(&self) -> usize {
        self.view_offset
    }

    /// Whether the window ends at the most recent point.
    pub fn is_live(&self) -> bool {
        self.view_offset == 0
    }

    pub fn zoom_in(&mut self) {
        self.view_size = self.view_size.saturating_sub(VIEW_STEP).max(MIN_VIEW_SIZE);
        self.clamp_offset();
    }

    pub fn zoom_out(&mut self) {
        self.view_size = (self.view_size + VIEW_STEP).min(self.capacity);
        self.clamp_offset();
    }

    /// Look further back in the history.
    pub fn pan_left(&mut self) {
        self.view_offset = (self.view_offset + VIEW_STEP).min(self.max_offset());
    }

    /// Move back toward the live edge.
    pub fn pan_right(&mut self) {
        self.view_offset = self.view_offset.saturating_sub(VIEW_STEP);
    }

    pub fn reset(&mut self) {
        self.view_size = DEFAULT_VIEW_SIZE.min(self.capacity);
        self.view_offset = 0;
    }

    pub fn slice<'a>(&self, history: &'a [PricePoint]) -> &'a [PricePoint] {
        visible_slice(history, self.view_size, self.view_offset)
    }

    fn max_offset(&self) -> usize {
        self.capacity.saturating_sub(self.view_size)
    }

    fn clamp_offset(&mut self) {
        self.view_offset = self.view_offset.min(self.max_offset());
    }
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut the visible sub-range out of a history slice. Clamps both ends, so
/// no combination of inputs can produce an inverted or out-of-bounds
/// range even if the caller's window state predates a capacity change.
pub fn visible_slice(history: &[PricePoint], view_size: usize, view_offset: usize) -> &[PricePoint] {
    let end = history.len().saturating_sub(view_offset);
    let start = end.saturating_sub(view_size);
    &history[start..end]
}
