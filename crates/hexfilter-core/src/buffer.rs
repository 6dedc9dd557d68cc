use std::collections::VecDeque;

/// Bounded FIFO of the most recent non-record lines
///
/// Lines are stored raw, terminators included, so a drained block can be
/// written back out verbatim.
#[derive(Clone, Debug, Default)]
pub struct ContextBuffer {
    /// Oldest line at the front
    lines: VecDeque<String>,

    /// Maximum number of lines kept (0 disables buffering)
    capacity: usize,
}

impl ContextBuffer {
    /// Create a new context buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    /// Push a line, evicting the oldest if at capacity
    pub fn push(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    /// Take all buffered lines in the order they were seen
    ///
    /// Returns `None` when nothing is buffered.
    pub fn drain(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        Some(self.lines.drain(..).collect())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
