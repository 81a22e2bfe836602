//! Cartesian product over labeled value lists.

/// Compute every combination of one value per key.
///
/// Earlier keys vary slower (outer loop), later keys vary faster (inner loop).
/// Zero keys yield exactly one empty combination. Every list must be non-empty:
/// an empty list collapses the whole product to nothing, so callers omit such keys.
///
/// ```ignore
/// let lists = [("format", vec!["webp", "jpeg"]), ("width", vec!["100", "200"])];
/// let combos = cartesian_product(&lists);
/// // [(format, webp), (width, 100)], [(format, webp), (width, 200)], ...
/// ```
pub fn cartesian_product<K: Clone, V: Clone>(lists: &[(K, Vec<V>)]) -> Vec<Vec<(K, V)>> {
    let capacity: usize = lists.iter().map(|(_, values)| values.len()).product();
    let mut combos: Vec<Vec<(K, V)>> = Vec::with_capacity(capacity);
    combos.push(Vec::with_capacity(lists.len()));

    for (key, values) in lists {
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for value in values {
                let mut extended = combo.clone();
                extended.push((key.clone(), value.clone()));
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_keys_yields_single_empty_combination() {
        let lists: [(&str, Vec<u32>); 0] = [];
        let combos = cartesian_product(&lists);
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn test_outer_key_varies_slowest() {
        let lists = [("a", vec![1, 2]), ("b", vec![10, 20, 30])];
        let combos = cartesian_product(&lists);

        let flat: Vec<(i32, i32)> = combos.iter().map(|c| (c[0].1, c[1].1)).collect();
        assert_eq!(
            flat,
            vec![(1, 10), (1, 20), (1, 30), (2, 10), (2, 20), (2, 30)]
        );
    }

    #[test]
    fn test_size_is_product_of_lengths() {
        let lists = [("a", vec![1, 2]), ("b", vec![1, 2, 3]), ("c", vec![1, 2, 3, 4])];
        assert_eq!(cartesian_product(&lists).len(), 24);
    }

    #[test]
    fn test_keys_keep_declared_order() {
        let lists = [("z", vec!['x']), ("a", vec!['y'])];
        let combos = cartesian_product(&lists);
        let keys: Vec<_> = combos[0].iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_inputs_are_untouched() {
        let lists = vec![("a", vec![1, 2])];
        let before = lists.clone();
        let _ = cartesian_product(&lists);
        assert_eq!(lists, before);
    }
}
