//! Narration log - the bounded inbox of player-facing text.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of lines kept.
pub const NARRATION_CAPACITY: usize = 3;

/// A FIFO of the most recent narration lines, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NarrationLog {
    lines: VecDeque<String>,
}

impl NarrationLog {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::with_capacity(NARRATION_CAPACITY + 1),
        }
    }

    /// Append a line, evicting the oldest once over capacity.
    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push_back(text.into());
        while self.lines.len() > NARRATION_CAPACITY {
            self.lines.pop_front();
        }
    }

    /// Current lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Most recent line.
    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
