use std::collections::VecDeque;

/// Default number of entries kept before the oldest ones are evicted.
pub const MAX_HISTORY_SIZE: usize = 1000;

/// Bounded list of raw command lines, oldest first.
///
/// Empty lines and a line equal to the immediately preceding entry are never
/// stored. When the capacity is exceeded the oldest entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Record `line`. Returns whether it was stored.
    pub fn push(&mut self, line: &str) -> bool {
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return false;
        }
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at 1-based `index`, as shown by the `history` builtin.
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The last `n` entries paired with their 1-based position.
    /// `None` means every entry.
    pub fn numbered_tail(&self, n: Option<usize>) -> impl Iterator<Item = (usize, &str)> {
        let count = self.entries.len();
        let start = n.map_or(0, |n| count.saturating_sub(n));
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, line)| (i + 1, line.as_str()))
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY_SIZE)
    }
}
