//! Positional edits over the breakout (group-by) list.
//!
//! These never reorder or deduplicate; reconciling the list with the rest of
//! the query is the normalizer's job.

use super::field_ref::FieldReference;

/// Replace the breakout at `index`, appending when `index` is past the end.
/// A missing list is treated as empty.
pub fn set_breakout(
    breakout: Option<&[FieldReference]>,
    index: usize,
    value: FieldReference,
) -> Vec<FieldReference> {
    let mut list = breakout.map(<[FieldReference]>::to_vec).unwrap_or_default();
    if index < list.len() {
        list[index] = value;
    } else {
        list.push(value);
    }
    list
}

/// Remove the breakout at `index`. Out-of-range indexes leave the list as is.
pub fn remove_breakout(breakout: Option<&[FieldReference]>, index: usize) -> Vec<FieldReference> {
    let mut list = breakout.map(<[FieldReference]>::to_vec).unwrap_or_default();
    if index < list.len() {
        list.remove(index);
    }
    list
}

/// The well-formed breakouts, in order.
pub fn get_breakouts(breakout: &[FieldReference]) -> Vec<FieldReference> {
    breakout.iter().filter(|b| b.is_valid()).cloned().collect()
}
