// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Bounded, append-only in-memory log ring for the running job. The HTTP
//! progress stream (C8) reads from here rather than awaiting the worker
//! task directly (spec §5, suspension points).

use parking_lot::Mutex;
use std::collections::VecDeque;

pub struct LogBuffer {
    lines: Mutex<VecDeque<String>>,
    max_lines: usize,
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self { lines: Mutex::new(VecDeque::with_capacity(max_lines.min(1024))), max_lines }
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock();
        if lines.len() >= self.max_lines {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    /// Lines at index `from_offset` onward, plus the offset to resume from
    /// on the next call — lets the SSE stream emit each line exactly once.
    pub fn since(&self, from_offset: usize) -> (Vec<String>, usize) {
        let lines = self.lines.lock();
        let total_seen = lines.len();
        let new: Vec<String> = lines.iter().skip(from_offset).cloned().collect();
        (new, total_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let buf = LogBuffer::new(2);
        buf.push("a");
        buf.push("b");
        buf.push("c");
        let (lines, _) = buf.since(0);
        assert_eq!(lines, vec!["b", "c"]);
    }

    #[test]
    fn since_returns_only_new_lines() {
        let buf = LogBuffer::new(10);
        buf.push("a");
        let (first, offset) = buf.since(0);
        assert_eq!(first, vec!["a"]);
        buf.push("b");
        let (second, _) = buf.since(offset);
        assert_eq!(second, vec!["b"]);
    }
}
