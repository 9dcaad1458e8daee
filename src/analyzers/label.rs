/// Smallest unit cost that gets a value label inside its stacked segment.
pub const LABEL_THRESHOLD: f64 = 300.0;

/// Segment label for a unit cost, or `None` below [`LABEL_THRESHOLD`].
///
/// | Unit cost | Label  |
/// |-----------|--------|
/// | >= 300    | `"{:.0}"` |
/// | < 300     | none   |
pub fn segment_label(unit_cost: f64) -> Option<String> {
    if unit_cost >= LABEL_THRESHOLD {
        Some(format!("{unit_cost:.0}"))
    } else {
        None
    }
}

pub fn total_label(total: f64) -> String {
    format!("Total: {total:.0}")
}
