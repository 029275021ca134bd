//! Merged map tracking across the visions of our ants

use antroid_core::{AntStatus, PartialMap};
use tracing::trace;

/// Fold this turn's visions into the map known so far
///
/// Every cell seen by at least one ant this turn comes out visible, with
/// the content reported by the last ant (in turn order) that saw it. Cells
/// nobody saw keep their last known content and are marked not visible.
pub fn merge_visions(previous: &PartialMap, ants: &[AntStatus]) -> PartialMap {
    let mut merged = previous.clone();
    merged.reset_visibility();

    for ant in ants {
        let mut vision = ant.vision.clone();
        vision.set_visibility(true);
        merged.combine([&vision]);
        trace!(ant = ant.id, cells = vision.len(), "merged vision");
    }

    merged
}
