//! Recovery of report structure from a flattened sheet.
//!
//! Metadata lives at fixed cell positions, cost breakdowns live in sections
//! located by marker substrings in column 1. Nothing in here fails: absent
//! cells and sections degrade to defaults or empty maps.

pub mod costs;
pub mod metadata;
pub mod naming;
pub mod section;

pub use costs::{CostMap, CostSection, extract_costs, parse_cost};
pub use metadata::{Metadata, detect_metadata};
pub use naming::normalize_name;
pub use section::{SectionBounds, find_section_bounds, find_section_start};
