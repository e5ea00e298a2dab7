//! Infers which of the two fingerprint slots each member has registered.
//!
//! Records rarely say which physical finger was scanned, so slots are
//! assigned in two explicit steps:
//!
//! 1. keep the eligible records that carry a slot hint (a device `local_id`
//!    in the template, or an explicit finger number 1 or 2), and sort each
//!    member's records oldest first by enrollment date, then creation time,
//!    then record id;
//! 2. walk the sorted records: an explicit 1/2 wins, otherwise the position
//!    (0 → slot 1, 1 → slot 2) is used. Records at position 2 or later
//!    without an explicit 1/2 get no slot.
//!
//! Slots are collected in a set, so re-enrolling a slot never counts twice.

use crate::models::BiometricRecord;
use std::collections::{BTreeSet, HashMap};

pub type SlotSet = BTreeSet<u8>;

fn explicit_slot(record: &BiometricRecord) -> Option<u8> {
    match record.finger_number {
        Some(1) => Some(1),
        Some(2) => Some(2),
        _ => None,
    }
}

fn carries_slot_hint(record: &BiometricRecord) -> bool {
    record.has_local_id || explicit_slot(record).is_some()
}

/// Step 2 over one member's records, which must already be sorted.
pub fn assign_slots(sorted: &[&BiometricRecord]) -> SlotSet {
    sorted
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            explicit_slot(record).or(match idx {
                0 => Some(1),
                1 => Some(2),
                _ => None,
            })
        })
        .collect()
}

/// Member id → registered slots. Members with no slot are absent.
pub fn resolve_slots(records: &[BiometricRecord]) -> HashMap<i64, SlotSet> {
    let mut per_member: HashMap<i64, Vec<&BiometricRecord>> = HashMap::new();
    for record in records {
        let Some(member_id) = record.member_id else {
            continue;
        };
        if record.is_eligible() && carries_slot_hint(record) {
            per_member.entry(member_id).or_default().push(record);
        }
    }

    per_member
        .into_iter()
        .filter_map(|(member_id, mut rows)| {
            // ties (including missing dates) fall back to id order
            rows.sort_by_key(|r| (r.sort_key(), r.id));
            let slots = assign_slots(&rows);
            (!slots.is_empty()).then_some((member_id, slots))
        })
        .collect()
}
