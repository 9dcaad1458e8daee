use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sums values per key across several maps. Keys come out sorted.
pub fn totals_by_key<'a, I>(maps: I) -> BTreeMap<&'a str, f64>
where
    I: IntoIterator<Item = &'a BTreeMap<String, f64>>,
{
    let mut totals = BTreeMap::new();
    for map in maps {
        for (key, value) in map {
            *totals.entry(key.as_str()).or_insert(0.0) += value;
        }
    }
    totals
}

/// Orders by descending total, then by name so ties are stable.
pub fn by_total_desc(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
