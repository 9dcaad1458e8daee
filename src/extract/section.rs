use serde::Serialize;

use crate::grid::CellGrid;

/// Row of the first column-1 cell containing `start_marker`.
pub fn find_section_start(grid: &CellGrid, start_marker: &str) -> Option<u32> {
    grid.column(1)
        .find(|cell| cell.value.contains(start_marker))
        .map(|cell| cell.row)
}

/// Row span of a numbered report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionBounds {
    pub start: Option<u32>,
    pub end: u32,
}

/// Guesses the rows covered by `section_name`, e.g. `"5. MATERIALS COST"`.
///
/// The section ends at the first later column-1 label starting with the
/// section's leading digit plus one (`"5."` ends at a label starting `"6"`).
/// A later cell that again contains `section_name` moves the start. Without
/// a following section, or when the name has no leading digit, the section
/// runs to `max_row`.
pub fn find_section_bounds(grid: &CellGrid, section_name: &str) -> SectionBounds {
    let next_label = section_name
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| (d + 1).to_string());

    let mut start = None;
    let mut end = None;

    for cell in grid.column(1) {
        if cell.value.contains(section_name) {
            start = Some(cell.row);
        } else if start.is_some() {
            if let Some(label) = &next_label {
                if cell.value.starts_with(label.as_str()) {
                    end = Some(cell.row);
                    break;
                }
            }
        }
    }

    SectionBounds {
        start,
        end: end.unwrap_or(grid.max_row),
    }
}
