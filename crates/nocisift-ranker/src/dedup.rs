//! Collapse repeated measurements of the same compound.

use std::collections::HashMap;

use nocisift_common::BioactivityRecord;

/// Outcome of [`dedup_by_compound`].
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// One record per compound, in order of first appearance.
    pub records: Vec<BioactivityRecord>,
    /// Records discarded as weaker duplicates.
    pub collapsed: usize,
}

/// Keep the most potent (lowest nM) record per compound identifier.
/// Ties keep the earlier record, and each compound stays in the position
/// where it first appeared, so the result is deterministic for a given
/// input order.
pub fn dedup_by_compound(records: Vec<BioactivityRecord>) -> Deduplicated {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out = Deduplicated { records: Vec::with_capacity(records.len()), collapsed: 0 };

    for record in records {
        match index.get(&record.compound_id) {
            Some(&slot) => {
                out.collapsed += 1;
                if is_stronger(&record, &out.records[slot]) {
                    out.records[slot] = record;
                }
            }
            None => {
                index.insert(record.compound_id.clone(), out.records.len());
                out.records.push(record);
            }
        }
    }
    out
}

/// Strictly lower potency wins; NaN never wins.
fn is_stronger(candidate: &BioactivityRecord, incumbent: &BioactivityRecord) -> bool {
    candidate.potency_nm < incumbent.potency_nm || (incumbent.potency_nm.is_nan() && !candidate.potency_nm.is_nan())
}
