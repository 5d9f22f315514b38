//! Case-insensitive city name matching over a dataset snapshot.
//!
//! Everything here is a pure function of the records passed in.

use crate::types::MergedCityWeather;

/// Maximum number of suggestions shown under the search box
pub const SUGGESTION_LIMIT: usize = 5;

/// Find the city whose name equals `name`, ignoring case.
///
/// The query is trimmed first; a blank query matches nothing.
pub fn find_exact<'a>(
    records: &'a [MergedCityWeather],
    name: &str,
) -> Option<&'a MergedCityWeather> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    records.iter().find(|r| r.name.to_lowercase() == needle)
}

/// Cities whose name contains `query`, ignoring case, in dataset order.
///
/// At most `limit` records are returned. A blank query returns nothing.
pub fn find_matching<'a>(
    records: &'a [MergedCityWeather],
    query: &str,
    limit: usize,
) -> Vec<&'a MergedCityWeather> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

/// Suggestions for the search box, capped at [`SUGGESTION_LIMIT`].
pub fn suggest<'a>(records: &'a [MergedCityWeather], query: &str) -> Vec<&'a MergedCityWeather> {
    find_matching(records, query, SUGGESTION_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_dataset;
    use crate::types::{City, CityId, Climate};

    fn city(id: &str, name: &str) -> MergedCityWeather {
        MergedCityWeather::new(
            CityId::new(id),
            City {
                name: name.to_string(),
                country: "KE".to_string(),
                coordinates: None,
                climate: Climate::default(),
            },
            None,
        )
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let records = fallback_dataset().merge();
        for query in ["mombasa", "MOMBASA", "Mombasa", "  mOmBaSa "] {
            let found = find_exact(&records, query).unwrap();
            assert_eq!(found.name, "Mombasa");
        }
    }

    #[test]
    fn test_exact_requires_full_name() {
        let records = fallback_dataset().merge();
        assert!(find_exact(&records, "mom").is_none());
        assert!(find_exact(&records, "Atlantis").is_none());
        assert!(find_exact(&records, "   ").is_none());
    }

    #[test]
    fn test_suggest_nai_on_fallback() {
        let records = fallback_dataset().merge();
        let labels: Vec<String> = suggest(&records, "nai").iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Nairobi, KE"]);
    }

    #[test]
    fn test_suggest_blank_query_is_empty() {
        let records = fallback_dataset().merge();
        assert!(suggest(&records, "").is_empty());
        assert!(suggest(&records, " \t ").is_empty());
    }

    #[test]
    fn test_suggest_caps_and_keeps_order() {
        let records: Vec<_> = (0..8)
            .map(|i| city(&i.to_string(), &format!("Town {}", i)))
            .collect();
        let found = suggest(&records, "TOWN");
        assert_eq!(found.len(), SUGGESTION_LIMIT);
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_matches_are_substrings() {
        let records = vec![city("1", "Eldoret"), city("2", "Nakuru"), city("3", "Kericho")];
        let found = find_matching(&records, "er", 10);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.name.to_lowercase().contains("er")));
    }
}
