use tracing::trace;

/// Pending text typed into the command field
///
/// Never bounded; the renderer truncates for display only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        trace!(text, entry = %self.text, "entry appended");
    }

    /// Remove the final character; does nothing on an empty buffer
    pub fn delete_last(&mut self) {
        let removed = self.text.pop();
        trace!(?removed, entry = %self.text, "entry shortened");
    }

    pub fn clear(&mut self) {
        self.text.clear();
        trace!("entry cleared");
    }

    /// Take the accumulated text, leaving the buffer empty
    pub fn flush(&mut self) -> String {
        let entry = std::mem::take(&mut self.text);
        trace!(entry = %entry, "entry flushed");
        entry
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}
