use serde::{Deserialize, Serialize};

use crate::result::GenerationResult;

pub const HISTORY_LIMIT: usize = 5;

/// Completed results, most recent first, never longer than [`HISTORY_LIMIT`].
///
/// The list is never edited in place: inserting builds a replacement list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<GenerationResult>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn entries(&self) -> &[GenerationResult] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&GenerationResult> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the replacement list with `result` at index 0, plus whatever fell off the end.
    pub fn prepended(&self, result: GenerationResult) -> (History, Vec<GenerationResult>) {
        let mut entries = Vec::with_capacity(HISTORY_LIMIT + 1);
        entries.push(result);
        entries.extend(self.entries.iter().cloned());
        let evicted = if entries.len() > HISTORY_LIMIT {
            entries.split_off(HISTORY_LIMIT)
        } else {
            Vec::new()
        };
        (History { entries }, evicted)
    }
}
