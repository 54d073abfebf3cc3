//! Attribute-level diffing between a derivative and a set of proposed updates.

use super::derivatives_model::{ChangeRecord, Derivative, DerivativeUpdates};

/// Applies `updates` to `derivative` and returns the changes actually made.
///
/// Updates are visited in the order supplied. An update whose value equals the
/// derivative's current value is skipped: it produces no change record and no
/// mutation. Attributes not named in `updates` are never touched.
pub fn compute_diff(derivative: &mut Derivative, updates: &DerivativeUpdates) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for update in updates {
        let attribute = update.attribute();
        let old_value = derivative.value_of(attribute);
        let new_value = update.value();

        if old_value == new_value {
            continue;
        }

        update.apply_to(derivative);
        changes.push(ChangeRecord {
            attribute,
            old_value,
            new_value,
        });
    }

    changes
}
