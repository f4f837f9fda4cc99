use crate::types::SourceRecord;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Foreign id -> bulk record lookup table.
///
/// Built once per batch over a provider's full player database so each
/// per-player lookup is a hash probe instead of a scan.
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceIndex<'a> {
    /// Field of the bulk records the index was built over (e.g. "yahoo_id")
    field: String,

    /// Trimmed foreign id value -> first record carrying it
    entries: HashMap<&'a str, &'a SourceRecord>,

    /// Records whose id was already taken by an earlier record
    duplicates: usize,
}

impl<'a> CrossReferenceIndex<'a> {
    /// Index `records` by the foreign id stored under `field`.
    ///
    /// Records without a usable value are skipped. On duplicate values the
    /// first record in input order keeps the slot.
    pub fn build(records: &'a [SourceRecord], field: &str) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for record in records {
            let Some(value) = record.foreign_id(field) else {
                continue;
            };
            match entries.entry(value) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(existing) => {
                    duplicates += 1;
                    debug!(
                        "Duplicate {} '{}' on '{}', keeping '{}'",
                        field,
                        value,
                        record.display_name,
                        existing.get().display_name
                    );
                }
            }
        }

        if duplicates > 0 {
            warn!("Index over '{}' skipped {} duplicate ids", field, duplicates);
        }

        Self { field: field.to_string(), entries, duplicates }
    }

    /// Record carrying `value` (compared after trimming)
    pub fn lookup(&self, value: &str) -> Option<&'a SourceRecord> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        self.entries.get(value).copied()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
