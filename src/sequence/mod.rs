//! # Command Sequence
//!
//! Ordered, hole-tolerant list of commands owned by one engine. Holes are
//! removed entries that the host has not purged yet; they consume no
//! position index and are skipped everywhere.
//!
//! Position indices and indent levels are cached per entry and in a
//! `Layout`. Both are recomputed by `refresh()` and are only valid until
//! the next structural edit.

pub mod labels;
pub mod layout;

pub use labels::LabelIndex;
pub use layout::Layout;

use crate::command::{Command, CommandKind};
use crate::types::EngineId;

/* ===================== Entries ===================== */

/// Per-entry metadata maintained by the sequence and the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    pub(crate) enabled: bool,
    pub(crate) position_index: usize,
    pub(crate) indent_level: usize,
    pub(crate) is_executing: bool,
    pub(crate) owner: Option<EngineId>,
}

impl CommandMeta {
    fn new() -> Self {
        CommandMeta {
            enabled: true,
            position_index: 0,
            indent_level: 0,
            is_executing: false,
            owner: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn position_index(&self) -> usize {
        self.position_index
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    pub fn owner(&self) -> Option<EngineId> {
        self.owner
    }
}

pub(crate) struct Slot {
    pub(crate) command: Box<dyn Command>,
    pub(crate) meta: CommandMeta,
}

impl Slot {
    /// Disabled entries and inert kinds are never executed
    fn is_skipped(&self) -> bool {
        !self.meta.enabled || self.command.kind().is_inert()
    }
}

/* ===================== Sequence ===================== */

#[derive(Default)]
pub struct CommandSequence {
    slots: Vec<Option<Slot>>,
    layout: Layout,
    owner: Option<EngineId>,
    indices_stale: bool,
    indentation_stale: bool,
}

impl CommandSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence from commands, already indexed and indented
    pub fn from_commands(commands: Vec<Box<dyn Command>>) -> Self {
        let mut sequence = Self::new();
        for command in commands {
            sequence.push(command);
        }
        sequence.refresh();
        sequence
    }

    /* ----- structural edits ----- */

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.slots.push(Some(Slot {
            command,
            meta: CommandMeta::new(),
        }));
        self.mark_stale();
    }

    /// Append an empty entry, as left behind by a removal
    pub fn push_hole(&mut self) {
        self.slots.push(None);
        self.mark_stale();
    }

    /// Insert a command at raw slot `slot` (holes included)
    pub fn insert(&mut self, slot: usize, command: Box<dyn Command>) {
        let slot = slot.min(self.slots.len());
        self.slots.insert(
            slot,
            Some(Slot {
                command,
                meta: CommandMeta::new(),
            }),
        );
        self.mark_stale();
    }

    /// Remove the command at `position`, leaving a hole in its slot
    pub fn remove(&mut self, position: usize) -> Option<Box<dyn Command>> {
        let slot = self.slot_of(position)?;
        let removed = self.slots[slot].take().map(|slot| slot.command);
        self.mark_stale();
        removed
    }

    /// Drop every hole; returns how many were removed
    pub fn purge_holes(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(Option::is_some);
        let purged = before - self.slots.len();
        if purged > 0 {
            self.mark_stale();
        }
        purged
    }

    fn mark_stale(&mut self) {
        self.indices_stale = true;
        self.indentation_stale = true;
    }

    pub(crate) fn adopt(&mut self, owner: EngineId) {
        self.owner = Some(owner);
        self.indices_stale = true;
    }

    /* ----- index and indentation maintenance ----- */

    pub fn needs_refresh(&self) -> bool {
        self.indices_stale || self.indentation_stale
    }

    pub fn refresh(&mut self) {
        self.refresh_indices();
        self.refresh_indentation();
    }

    /// Assign consecutive position indices to non-null entries and stamp
    /// the owning engine. Rebuilds the label index.
    pub fn refresh_indices(&mut self) {
        self.layout.reset_positions();
        for (slot_index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            slot.meta.position_index = self.layout.len();
            slot.meta.owner = self.owner;
            let label = match slot.command.kind() {
                CommandKind::Label(key) => Some(key),
                _ => None,
            };
            self.layout.push_position(slot_index, label);
        }
        self.indices_stale = false;
    }

    /// Assign nesting depth. A close decrements before its own depth is
    /// assigned (never below zero); an open increments after.
    pub fn refresh_indentation(&mut self) {
        self.layout.reset_indents();
        let mut depth: usize = 0;
        for slot in self.slots.iter_mut().flatten() {
            let closes = slot.command.is_close_block();
            if closes {
                depth = depth.saturating_sub(1);
            }
            slot.meta.indent_level = depth;
            self.layout.push_indent(depth, closes);
            if slot.command.is_open_block() {
                depth += 1;
            }
        }
        self.indentation_stale = false;
    }

    /* ----- lookup ----- */

    /// Number of commands, holes excluded
    pub fn len(&self) -> usize {
        if self.indices_stale {
            self.slots.iter().flatten().count()
        } else {
            self.layout.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of raw slots, holes included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot_of(&self, position: usize) -> Option<usize> {
        if self.indices_stale {
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some())
                .nth(position)
                .map(|(slot_index, _)| slot_index)
        } else {
            self.layout.slot_of(position)
        }
    }

    fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots.get(self.slot_of(position)?)?.as_ref()
    }

    pub(crate) fn slot_mut(&mut self, position: usize) -> Option<&mut Slot> {
        let slot_index = self.slot_of(position)?;
        self.slots.get_mut(slot_index)?.as_mut()
    }

    pub fn get(&self, position: usize) -> Option<&dyn Command> {
        self.slot(position).map(|slot| slot.command.as_ref())
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut (dyn Command + 'static)> {
        self.slot_mut(position).map(|slot| slot.command.as_mut())
    }

    pub fn meta(&self, position: usize) -> Option<&CommandMeta> {
        self.slot(position).map(|slot| &slot.meta)
    }

    /// Iterate non-null entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&dyn Command, &CommandMeta)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.command.as_ref(), &slot.meta))
    }

    /// Position of the first label matching `key` (case-insensitive)
    pub fn find_label(&self, key: &str) -> Option<usize> {
        if !self.indices_stale {
            return self.layout.labels().find(key);
        }
        self.slots
            .iter()
            .flatten()
            .enumerate()
            .find_map(|(position, slot)| match slot.command.kind() {
                CommandKind::Label(candidate) if labels::keys_match(candidate, key) => {
                    Some(position)
                }
                _ => None,
            })
    }

    /// Close command matching the block opened at `position`
    pub fn find_block_end(&self, position: usize) -> Option<usize> {
        self.layout.block_end(position)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /* ----- run-time flags ----- */

    pub fn set_enabled(&mut self, position: usize, enabled: bool) -> bool {
        match self.slot_mut(position) {
            Some(slot) => {
                slot.meta.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_executing(&mut self, position: usize, executing: bool) {
        if let Some(slot) = self.slot_mut(position) {
            slot.meta.is_executing = executing;
        }
    }

    /// Whether the run loop steps over the entry at `position`
    pub(crate) fn is_skipped(&self, position: usize) -> bool {
        self.slot(position).map_or(true, Slot::is_skipped)
    }

    /// Split borrow used while a command hook runs: the command mutably,
    /// the cached layout shared
    pub(crate) fn split_for_hook(&mut self, position: usize) -> Option<(&mut Slot, &Layout)> {
        let slot_index = self.layout.slot_of(position)?;
        let slot = self.slots.get_mut(slot_index)?.as_mut()?;
        Some((slot, &self.layout))
    }
}

impl CommandSequence {
    /// Builder-style push
    pub fn then(mut self, command: impl Command + 'static) -> Self {
        self.push(Box::new(command));
        self
    }
}

impl FromIterator<Box<dyn Command>> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = Box<dyn Command>>>(iter: I) -> Self {
        Self::from_commands(iter.into_iter().collect())
    }
}

impl std::fmt::Debug for CommandSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<Option<&str>> = self
            .slots
            .iter()
            .map(|slot| slot.as_ref().map(|slot| slot.command.name()))
            .collect();
        f.debug_struct("CommandSequence")
            .field("slots", &names)
            .field("stale", &self.needs_refresh())
            .finish()
    }
}
