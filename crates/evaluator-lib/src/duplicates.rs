//! Duplicate key detection for form rows
//!
//! Environment variable names, configuration data keys and persisted
//! folder paths must each be unique within a form. Keys are compared
//! exactly; empty keys belong to rows the user has not filled in yet and
//! are never reported.

use std::collections::{BTreeMap, HashMap};

/// Keys that occur more than once, with their occurrence count
pub fn find_duplicates<I, S>(keys: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        let key: &str = key.as_ref();
        if key.is_empty() {
            continue;
        }
        *counts.entry(key.to_string()).or_default() += 1;
    }

    counts.retain(|_, count| *count > 1);
    counts
}

pub fn has_duplicates<I, S>(keys: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    !find_duplicates(keys).is_empty()
}

/// Row index → key for every row whose key collides with another row
pub fn duplicate_positions<S: AsRef<str>>(keys: &[S]) -> BTreeMap<usize, String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key.as_ref()).or_default() += 1;
    }

    keys.iter()
        .enumerate()
        .filter(|(_, key)| {
            let key: &str = (*key).as_ref();
            !key.is_empty() && counts.get(key).copied().unwrap_or(0) > 1
        })
        .map(|(index, key)| (index, key.as_ref().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_duplicate() {
        let duplicates = find_duplicates(["A", "B", "A"]);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates.get("A"), Some(&2));
    }

    #[test]
    fn test_empty_input() {
        let keys: Vec<String> = Vec::new();
        assert!(find_duplicates(&keys).is_empty());
        assert!(!has_duplicates(&keys));
    }

    #[test]
    fn test_counts_every_occurrence() {
        let duplicates = find_duplicates(["PORT", "HOST", "PORT", "PORT", "HOST", "USER"]);
        assert_eq!(duplicates.get("PORT"), Some(&3));
        assert_eq!(duplicates.get("HOST"), Some(&2));
        assert!(!duplicates.contains_key("USER"));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        assert!(!has_duplicates(["path", "PATH", "Path"]));
        assert!(!has_duplicates(["/data", "/data "]));
    }

    #[test]
    fn test_blank_rows_are_not_duplicates() {
        assert!(!has_duplicates(["", "", "A"]));
    }

    #[test]
    fn test_works_with_owned_strings() {
        let keys = vec!["/var/lib".to_string(), "/var/lib".to_string()];
        assert!(has_duplicates(&keys));
    }

    #[test]
    fn test_duplicate_positions() {
        let keys = ["A", "B", "A", "", ""];
        let positions = duplicate_positions(&keys);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions.get(&0).map(String::as_str), Some("A"));
        assert_eq!(positions.get(&2).map(String::as_str), Some("A"));
    }
}
