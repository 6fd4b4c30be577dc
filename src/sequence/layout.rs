//! Cached structure of a sequence
//!
//! Everything here is indexed by position (holes excluded) and is only
//! valid until the next structural edit.

use super::labels::LabelIndex;

#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// position -> slot
    positions: Vec<usize>,
    indents: Vec<usize>,
    closes: Vec<bool>,
    labels: LabelIndex,
}

impl Layout {
    pub(crate) fn reset_positions(&mut self) {
        self.positions.clear();
        self.labels.clear();
    }

    pub(crate) fn push_position(&mut self, slot: usize, label: Option<&str>) {
        let position = self.positions.len();
        self.positions.push(slot);
        if let Some(key) = label {
            self.labels.push(key, position);
        }
    }

    pub(crate) fn reset_indents(&mut self) {
        self.indents.clear();
        self.closes.clear();
    }

    pub(crate) fn push_indent(&mut self, indent: usize, closes: bool) {
        self.indents.push(indent);
        self.closes.push(closes);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn slot_of(&self, position: usize) -> Option<usize> {
        self.positions.get(position).copied()
    }

    pub fn indent_of(&self, position: usize) -> Option<usize> {
        self.indents.get(position).copied()
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    /// Close command matching the block opened at `position`.
    ///
    /// Everything inside the block is indented deeper than the opener, so
    /// the first later command at the opener's depth or shallower ends it.
    /// That command only counts if it is a close.
    pub fn block_end(&self, position: usize) -> Option<usize> {
        let depth = self.indent_of(position)?;
        let end = (position + 1..self.indents.len()).find(|&p| self.indents[p] <= depth)?;
        self.closes[end].then_some(end)
    }
}
