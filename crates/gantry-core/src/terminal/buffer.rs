use std::collections::VecDeque;

/// Line-bounded ring buffer for terminal scrollback (replay on attach).
///
/// Chunks are appended verbatim, including control sequences; only line
/// boundaries (`\n`) are interpreted, to bound memory by retained line
/// count. Once the cap is reached the oldest lines are dropped first —
/// the only form of data loss in the terminal path.
pub struct LineBuffer {
    /// Retained lines; the last element is the open (unterminated) line.
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LineBuffer {
    pub fn new(max_lines: usize) -> Self {
        assert!(max_lines > 0, "LineBuffer capacity must be non-zero");
        Self {
            lines: VecDeque::new(),
            max_lines,
        }
    }

    /// Append a chunk, splitting on newlines, then trim to the line cap.
    pub fn push_chunk(&mut self, chunk: &str) {
        if self.lines.is_empty() {
            self.lines.push_back(String::new());
        }
        for (i, part) in chunk.split('\n').enumerate() {
            if i > 0 {
                self.lines.push_back(String::new());
            }
            if !part.is_empty() {
                // Open line always exists after the push above.
                if let Some(last) = self.lines.back_mut() {
                    last.push_str(part);
                }
            }
        }
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// Current buffer contents as one string (snapshot, not a live view).
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }

    /// Number of retained lines, counting the open line.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
