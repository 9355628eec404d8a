//! Cross-file record store.
//!
//! Append-only. Indexed by anchor for duplicate detection and by phase for
//! graph construction. Records keep their insertion order, which the pipeline
//! makes file-then-line order.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use super::{
    record::{Anchor, AnchorKey},
    validate::ValidatedRecord,
};

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ValidatedRecord>,
    by_anchor: HashMap<AnchorKey, usize>,
    by_phase: BTreeMap<String, Vec<usize>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Returns whether its anchor was already present; the
    /// anchor index keeps pointing at the first occurrence.
    pub fn insert(&mut self, record: ValidatedRecord) -> bool {
        let index = self.records.len();
        let inner = record.record();

        let duplicate = match self.by_anchor.entry(inner.anchor.key()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(index);
                false
            }
        };

        if let Some(phase) = inner.phase_name() {
            self.by_phase
                .entry(phase.to_string())
                .or_default()
                .push(index);
        }

        self.records.push(record);
        duplicate
    }

    /// The first record that claimed `anchor`'s file and line.
    pub fn get_by_anchor(&self, anchor: &Anchor) -> Option<&ValidatedRecord> {
        self.by_anchor
            .get(&anchor.key())
            .map(|&index| &self.records[index])
    }

    pub fn get(&self, index: usize) -> Option<&ValidatedRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatedRecord> {
        self.records.iter()
    }

    /// Phases in name order, each with its records' store indices.
    pub fn phases(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.by_phase
            .iter()
            .map(|(phase, indices)| (phase.as_str(), indices.as_slice()))
    }

    pub fn phase_records(&self, phase: &str) -> impl Iterator<Item = &ValidatedRecord> {
        self.by_phase
            .get(phase)
            .into_iter()
            .flatten()
            .map(|&index| &self.records[index])
    }

    pub fn has_phase(&self, phase: &str) -> bool {
        self.by_phase.contains_key(phase)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
