/// Linear-scan duplicate check against an existing collection.
///
/// Per-turn collections stay small (typically well under fifty entries),
/// so an O(n) scan beats carrying a side index.
pub fn is_duplicate<T, K, F>(existing: &[T], candidate: &T, key: F) -> bool
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let candidate_key = key(candidate);
    existing.iter().any(|entry| key(entry) == candidate_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_key_only() {
        let existing = vec![("a", 1), ("b", 2)];
        assert!(is_duplicate(&existing, &("a", 99), |e| e.0));
        assert!(!is_duplicate(&existing, &("c", 1), |e| e.0));
    }

    #[test]
    fn empty_collection_has_no_duplicates() {
        let existing: Vec<(&str, i32)> = Vec::new();
        assert!(!is_duplicate(&existing, &("a", 1), |e| e.0));
    }
}
