use crate::model::{Domain, Entry, Frame};

/// A surface that draws ranked bars.
///
/// Called once per new frame. Implementations that animate should key bars by
/// `Entry::name` so an entity keeps its identity from one frame to the next.
pub trait RenderAdapter {
    fn render(&mut self, entries: &[Entry], domain: Domain);

    fn render_frame(&mut self, frame: &Frame) {
        self.render(&frame.entries, frame.domain);
    }
}
