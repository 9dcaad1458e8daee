/// Raw report labels and the display names they are reported under.
///
/// No display name appears as a raw label, so normalizing twice is the same as
/// normalizing once.
static NAME_MAPPING: &[(&str, &str)] = &[
    ("Prot-A Reg Buff", "Strip Buffer"),
    ("Prot-A Wash Buf", "Wash Buffer"),
    ("Protein A eluti", "Eluti. Buffer"),
    ("Protein A Equil", "Equil. Buffer"),
    ("Trisodium citra", "Trisodium citrate"),
    ("Dft DEF Cartridge", "DEF Cartridge"),
    ("Dft PBA Chrom Resin", "Chrom. Resin"),
    ("Waste Treatment/Disposal", "Wastewater treatment (OPEX)"),
    ("Labor-Dependent", "Labor (OPEX)"),
    ("Utilities", "Utilities (OPEX)"),
    ("Consumables", "Consumables (OPEX)"),
    ("Raw Materials", "Raw materials (OPEX)"),
    ("Laboratory/QC/QA", "Laboratory/QC/QA (OPEX)"),
    ("Facility-Dependent", "Facility-dependent (CAPEX)"),
];

/// Maps a trimmed report label to its display name. Unknown labels pass through.
pub fn normalize_name<'a>(name: &'a str) -> &'a str {
    match NAME_MAPPING.iter().find(|(raw, _)| *raw == name) {
        Some(&(_, display)) => display,
        None => name,
    }
}
