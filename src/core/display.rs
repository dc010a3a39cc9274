//! Display sink for status text and course drawing
//!
//! Loops write best-effort status to a small text/graphics display. The
//! output is never read back, so sinks must not fail.

use crate::constants::DISPLAY_LINE_WIDTH;
use parking_lot::Mutex;
use std::sync::Arc;

/// Text and graphics output device
pub trait DisplaySink: Send {
    /// Replace text row `row`; text beyond the row width is cut off
    fn print_line(&mut self, text: &str, row: u8);

    fn clear(&mut self);

    fn draw_pixel(&mut self, x: i32, y: i32);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
}

/// Clip text to the display row width
pub fn clip_line(text: &str) -> &str {
    match text.char_indices().nth(DISPLAY_LINE_WIDTH) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn print_line(&mut self, _text: &str, _row: u8) {}
    fn clear(&mut self) {}
    fn draw_pixel(&mut self, _x: i32, _y: i32) {}
    fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32) {}
}

/// Forwards text rows to the log; graphics are traced
#[derive(Debug, Clone)]
pub struct LogDisplay {
    source: &'static str,
}

impl LogDisplay {
    pub fn new(source: &'static str) -> Self {
        Self { source }
    }
}

impl DisplaySink for LogDisplay {
    fn print_line(&mut self, text: &str, row: u8) {
        log::debug!("[{}] row {}: {}", self.source, row, clip_line(text));
    }

    fn clear(&mut self) {
        log::trace!("[{}] clear", self.source);
    }

    fn draw_pixel(&mut self, x: i32, y: i32) {
        log::trace!("[{}] pixel ({}, {})", self.source, x, y);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        log::trace!(
            "[{}] line ({}, {}) -> ({}, {})",
            self.source,
            x0,
            y0,
            x1,
            y1
        );
    }
}

/// Display operation captured by [`RecordingDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Text { row: u8, text: String },
    Clear,
    Pixel { x: i32, y: i32 },
    Line { x0: i32, y0: i32, x1: i32, y1: i32 },
}

/// Records operations for inspection; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    ops: Arc<Mutex<Vec<DisplayOp>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<DisplayOp> {
        self.ops.lock().clone()
    }

    /// Text written to `row`, oldest first
    pub fn lines(&self, row: u8) -> Vec<String> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Text { row: r, text } if *r == row => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent text on `row`
    pub fn last_line(&self, row: u8) -> Option<String> {
        self.lines(row).pop()
    }

    pub fn pixel_count(&self) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| matches!(op, DisplayOp::Pixel { .. }))
            .count()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }
}

impl DisplaySink for RecordingDisplay {
    fn print_line(&mut self, text: &str, row: u8) {
        self.ops.lock().push(DisplayOp::Text {
            row,
            text: clip_line(text).to_string(),
        });
    }

    fn clear(&mut self) {
        self.ops.lock().push(DisplayOp::Clear);
    }

    fn draw_pixel(&mut self, x: i32, y: i32) {
        self.ops.lock().push(DisplayOp::Pixel { x, y });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.ops.lock().push(DisplayOp::Line { x0, y0, x1, y1 });
    }
}
